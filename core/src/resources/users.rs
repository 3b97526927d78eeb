use tracing::debug;

use crate::client::AsanaClient;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::pagination::Page;
use crate::transport::Transport;
use crate::types::{Favorite, FavoritesQuery, User};

impl<T: Transport> AsanaClient<T> {
    /// The user the client is authenticated as.
    pub fn current_user(&self) -> Result<User> {
        self.get("/users/me", &Options::new())
    }

    /// Full record for one user. `gid` may be `me`.
    pub fn user(&self, gid: &str, options: &Options) -> Result<User> {
        debug!(user = gid, "loading user");
        self.get(&format!("/users/{gid}"), options)
    }

    /// One page of the users in a workspace visible to the caller.
    pub fn workspace_users(&self, workspace: &str, options: &Options) -> Result<Page<User>> {
        debug!(workspace, "listing users");
        self.get_page("/users", &Options::new().workspace(workspace).merge(options))
    }

    /// Every user in a workspace.
    pub fn all_workspace_users(&self, workspace: &str, options: &Options) -> Result<Vec<User>> {
        debug!(workspace, "listing all users");
        self.get_all("/users", &Options::new().workspace(workspace).merge(options))
    }

    /// One page of a user's favorites of one resource type, in sidebar order.
    ///
    /// The API only answers this for the authenticated user. An empty
    /// `resource_type` or `workspace` is refused without sending anything.
    pub fn user_favorites(
        &self,
        gid: &str,
        query: &FavoritesQuery,
        options: &Options,
    ) -> Result<Page<Favorite>> {
        if query.resource_type.is_empty() || query.workspace.is_empty() {
            return Err(Error::InvalidInput(
                "resource_type and workspace must be provided".to_string(),
            ));
        }
        debug!(user = gid, resource_type = %query.resource_type, "listing favorites");
        let options = Options::new()
            .param("resource_type", query.resource_type.as_str())
            .workspace(query.workspace.as_str())
            .merge(options);
        self.get_page(&format!("/users/{gid}/favorites"), &options)
    }
}
