//! Query parameters accepted by list and fetch endpoints.

use crate::pagination::PageRequest;

/// Query options for a single request.
///
/// Options compose with [`Options::merge`]: scalar values from the overlay
/// win, list values are appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub limit: Option<u32>,
    pub offset: Option<String>,
    /// Sent comma-joined as `opt_fields`.
    pub fields: Vec<String>,
    pub pretty: bool,
    pub workspace: Option<String>,
    pub owner: Option<String>,
    /// Endpoint-specific parameters such as `parent`.
    pub params: Vec<(String, String)>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: impl Into<String>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    #[must_use]
    pub fn workspace(mut self, gid: impl Into<String>) -> Self {
        self.workspace = Some(gid.into());
        self
    }

    #[must_use]
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Overlay `other` on top of `self`.
    #[must_use]
    pub fn merge(mut self, other: &Options) -> Self {
        if other.limit.is_some() {
            self.limit = other.limit;
        }
        if other.offset.is_some() {
            self.offset.clone_from(&other.offset);
        }
        self.fields.extend(other.fields.iter().cloned());
        self.pretty |= other.pretty;
        if other.workspace.is_some() {
            self.workspace.clone_from(&other.workspace);
        }
        if other.owner.is_some() {
            self.owner.clone_from(&other.owner);
        }
        self.params.extend(other.params.iter().cloned());
        self
    }

    /// Apply a pager's limit and offset.
    #[must_use]
    pub fn page(mut self, page: &PageRequest) -> Self {
        self.limit = Some(page.limit);
        self.offset.clone_from(&page.offset);
        self
    }

    /// Query pairs in a stable order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = &self.offset {
            pairs.push(("offset".to_string(), offset.clone()));
        }
        if !self.fields.is_empty() {
            pairs.push(("opt_fields".to_string(), self.fields.join(",")));
        }
        if self.pretty {
            pairs.push(("opt_pretty".to_string(), "true".to_string()));
        }
        if let Some(workspace) = &self.workspace {
            pairs.push(("workspace".to_string(), workspace.clone()));
        }
        if let Some(owner) = &self.owner {
            pairs.push(("owner".to_string(), owner.clone()));
        }
        pairs.extend(self.params.iter().cloned());
        pairs
    }
}
