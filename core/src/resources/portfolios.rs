use tracing::debug;

use crate::client::AsanaClient;
use crate::error::Result;
use crate::options::Options;
use crate::pagination::Page;
use crate::transport::Transport;
use crate::types::Portfolio;

fn portfolio_options(workspace: &str, options: &Options) -> Options {
    options
        .clone()
        .merge(&Options::new().workspace(workspace).owner("me"))
}

impl<T: Transport> AsanaClient<T> {
    /// One page of the caller's portfolios in a workspace.
    pub fn workspace_portfolios(&self, workspace: &str, options: &Options) -> Result<Page<Portfolio>> {
        debug!(workspace, "listing portfolios");
        self.get_page("/portfolios", &portfolio_options(workspace, options))
    }

    pub fn all_workspace_portfolios(&self, workspace: &str, options: &Options) -> Result<Vec<Portfolio>> {
        debug!(workspace, "listing all portfolios");
        self.get_all("/portfolios", &portfolio_options(workspace, options))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::ClientConfig;
    use crate::mock::MockTransport;
    use crate::options::Options;
    use crate::AsanaClient;

    #[test]
    fn portfolios_are_scoped_to_workspace_and_owner() {
        let mock = MockTransport::new(200, json!([{"gid": "p1", "name": "Roadmap"}]));
        let c = AsanaClient::with_transport(mock, ClientConfig::default());
        let page = c
            .workspace_portfolios("w1", &Options::new().owner("someone-else"))
            .unwrap();
        assert_eq!(page.items[0].name, "Roadmap");
        assert!(page.next_page.is_none());

        let req = c.transport().last_request().unwrap();
        assert_eq!(req.path(), "/api/1.0/portfolios");
        assert_eq!(req.query_param("workspace").as_deref(), Some("w1"));
        assert_eq!(req.query_param("owner").as_deref(), Some("me"));
    }
}
