use std::sync::Arc;

use crate::client::RestClient;
use crate::models::GraphRecord;

use super::{Collection, UrlResolver};

/// Resource path of the netmap graph endpoint.
pub const GRAPH_URL: &str = "api/graph";

/// Graph records synchronized with [`GRAPH_URL`].
pub type GraphCollection = Collection<GraphRecord>;

impl Collection<GraphRecord> {
    /// The graph collection bound to `api/graph`.
    pub fn graph(client: RestClient) -> Self {
        Self::from_parts(client, GRAPH_URL.to_string(), None)
    }

    /// The graph collection with the URL derived from `api/graph` by
    /// `resolver`.
    pub fn graph_with_resolver(
        client: RestClient,
        resolver: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        let resolver: UrlResolver = Arc::new(resolver);
        Self::from_parts(client, GRAPH_URL.to_string(), Some(resolver))
    }
}
