//! In-memory records served by the mock API, and the seed data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The authenticated user, returned for `/users/me`.
pub const ME: &str = "1";
pub const WORKSPACE: &str = "1000";
pub const PROJECT: &str = "2000";
pub const TEAM: &str = "3000";

/// Users seeded into `WORKSPACE`, including `ME`.
pub const SEEDED_USERS: usize = 120;

/// A `{gid, resource_type, name}` reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compact {
    pub gid: String,
    pub resource_type: String,
    pub name: String,
}

impl Compact {
    fn new(gid: &str, resource_type: &str, name: &str) -> Self {
        Self {
            gid: gid.to_string(),
            resource_type: resource_type.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub gid: String,
    pub name: String,
    pub email: String,
    pub workspaces: Vec<Compact>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Membership {
    pub gid: String,
    pub resource_type: String,
    pub parent: Compact,
    pub member: Compact,
    pub access_level: String,
    pub resource_subtype: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Portfolio {
    pub gid: String,
    pub name: String,
    #[serde(skip)]
    pub workspace: String,
    #[serde(skip)]
    pub owner: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnumOption {
    pub gid: String,
    pub name: String,
    pub color: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomField {
    pub gid: String,
    pub name: String,
    pub resource_subtype: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_options: Vec<EnumOption>,
    pub is_global_to_workspace: bool,
    /// `None` for project-local fields.
    #[serde(skip)]
    pub workspace: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomFieldSetting {
    pub gid: String,
    pub custom_field: CustomField,
    pub project: Compact,
    pub is_important: bool,
}

/// Everything the mock API knows about.
#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<User>,
    pub teams: Vec<Compact>,
    pub projects: Vec<Compact>,
    pub memberships: Vec<Membership>,
    pub portfolios: Vec<Portfolio>,
    pub custom_fields: Vec<CustomField>,
    /// Settings per project gid, in display order.
    pub settings: HashMap<String, Vec<CustomFieldSetting>>,
    /// Sidebar favorites of `ME`, all in `WORKSPACE`, in sidebar order.
    pub favorites: Vec<Compact>,
    next_gid: u64,
}

impl Store {
    /// A workspace with `SEEDED_USERS` users, one project with a team
    /// member, two portfolios and two custom fields.
    pub fn seeded() -> Self {
        let workspace = Compact::new(WORKSPACE, "workspace", "Acme");
        let users = (1..=SEEDED_USERS)
            .map(|n| {
                let name = if n == 1 {
                    "Ann".to_string()
                } else {
                    format!("User {n}")
                };
                User {
                    gid: n.to_string(),
                    name,
                    email: format!("user{n}@example.com"),
                    workspaces: vec![workspace.clone()],
                }
            })
            .collect();

        let project = Compact::new(PROJECT, "project", "Launch");
        let team = Compact::new(TEAM, "team", "Design");
        let memberships = vec![Membership {
            gid: "4000".to_string(),
            resource_type: "membership".to_string(),
            parent: project.clone(),
            member: team.clone(),
            access_level: "admin".to_string(),
            resource_subtype: "project_membership".to_string(),
        }];

        let portfolios = vec![
            Portfolio {
                gid: "5000".to_string(),
                name: "Roadmap".to_string(),
                workspace: WORKSPACE.to_string(),
                owner: ME.to_string(),
            },
            Portfolio {
                gid: "5001".to_string(),
                name: "Someone else's".to_string(),
                workspace: WORKSPACE.to_string(),
                owner: "2".to_string(),
            },
        ];

        let custom_fields = vec![
            CustomField {
                gid: "6000".to_string(),
                name: "Priority".to_string(),
                resource_subtype: "enum".to_string(),
                description: String::new(),
                precision: None,
                enum_options: vec![EnumOption {
                    gid: "6100".to_string(),
                    name: "High".to_string(),
                    color: "red".to_string(),
                    enabled: true,
                }],
                is_global_to_workspace: true,
                workspace: Some(WORKSPACE.to_string()),
            },
            CustomField {
                gid: "6001".to_string(),
                name: "Estimate".to_string(),
                resource_subtype: "number".to_string(),
                description: "Hours".to_string(),
                precision: Some(1),
                enum_options: Vec::new(),
                is_global_to_workspace: true,
                workspace: Some(WORKSPACE.to_string()),
            },
        ];

        Self {
            users,
            teams: vec![team],
            projects: vec![project.clone()],
            memberships,
            portfolios,
            custom_fields,
            settings: HashMap::new(),
            favorites: vec![
                Compact::new("5000", "portfolio", "Roadmap"),
                project,
                Compact::new("5001", "portfolio", "Someone else's"),
            ],
            next_gid: 9000,
        }
    }

    /// Hand out a gid no seeded record uses.
    pub fn next_gid(&mut self) -> String {
        self.next_gid += 1;
        self.next_gid.to_string()
    }

    pub fn user(&self, gid: &str) -> Option<&User> {
        let gid = if gid == "me" { ME } else { gid };
        self.users.iter().find(|u| u.gid == gid)
    }

    pub fn project(&self, gid: &str) -> Option<&Compact> {
        self.projects.iter().find(|p| p.gid == gid)
    }

    /// A user or team that can be added to a project.
    pub fn member(&self, gid: &str) -> Option<Compact> {
        if let Some(team) = self.teams.iter().find(|t| t.gid == gid) {
            return Some(team.clone());
        }
        self.user(gid)
            .map(|u| Compact::new(&u.gid, "user", &u.name))
    }

    pub fn custom_field(&self, gid: &str) -> Option<&CustomField> {
        self.custom_fields.iter().find(|f| f.gid == gid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_me_and_workspace_users() {
        let store = Store::seeded();
        assert_eq!(store.users.len(), SEEDED_USERS);
        assert_eq!(store.user("me").unwrap().name, "Ann");
        assert!(store.users.iter().all(|u| u.workspaces[0].gid == WORKSPACE));
    }

    #[test]
    fn members_resolve_to_teams_or_users() {
        let store = Store::seeded();
        assert_eq!(store.member(TEAM).unwrap().resource_type, "team");
        assert_eq!(store.member("7").unwrap().resource_type, "user");
        assert!(store.member("nope").is_none());
    }

    #[test]
    fn next_gid_is_unique() {
        let mut store = Store::seeded();
        let a = store.next_gid();
        let b = store.next_gid();
        assert_ne!(a, b);
        assert!(store.custom_field(&a).is_none());
    }

    #[test]
    fn owner_and_workspace_are_not_serialized() {
        let store = Store::seeded();
        let json = serde_json::to_value(&store.portfolios[0]).unwrap();
        assert_eq!(json, serde_json::json!({"gid": "5000", "name": "Roadmap"}));
    }
}
