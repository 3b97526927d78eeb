use serde::Serialize;
use tracing::debug;

use crate::client::AsanaClient;
use crate::error::Result;
use crate::options::Options;
use crate::pagination::Page;
use crate::transport::Transport;
use crate::types::{AccessLevel, CreateMembership, ProjectMembership};

#[derive(Serialize)]
struct CreateMembershipBody<'a> {
    member: &'a str,
    parent: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_level: Option<AccessLevel>,
}

fn membership_options(project: &str, options: &Options) -> Options {
    Options::new().param("parent", project).merge(options)
}

impl<T: Transport> AsanaClient<T> {
    /// One page of the memberships of a project.
    pub fn project_memberships(
        &self,
        project: &str,
        options: &Options,
    ) -> Result<Page<ProjectMembership>> {
        debug!(project, "listing memberships");
        self.get_page("/memberships", &membership_options(project, options))
    }

    pub fn all_project_memberships(
        &self,
        project: &str,
        options: &Options,
    ) -> Result<Vec<ProjectMembership>> {
        debug!(project, "listing all memberships");
        self.get_all("/memberships", &membership_options(project, options))
    }

    /// Give a user or team access to a project.
    pub fn create_membership(
        &self,
        project: &str,
        request: &CreateMembership,
    ) -> Result<ProjectMembership> {
        debug!(member = %request.member, project, "creating membership");
        let body = CreateMembershipBody {
            member: &request.member,
            parent: project,
            access_level: request.access_level,
        };
        self.post("/memberships", &body)
    }
}
