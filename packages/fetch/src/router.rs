use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::executor::{Fetcher, ReqwestFetcher};
use crate::types::{FetchRequest, Fetched};
use crate::{FetchConfig, FetchError};

/// Dispatches each request to the fetcher registered for its URL scheme.
///
/// Only `http` and `https` come built in. Other transports (ftp, ftps, sftp,
/// s3) are plugged in by the caller through [`SchemeRouter::register`].
#[derive(Clone, Default)]
pub struct SchemeRouter {
    routes: BTreeMap<String, Arc<dyn Fetcher>>,
}

impl SchemeRouter {
    /// A router with no routes; every request fails with `UnsupportedScheme`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A router serving `http` and `https` through one shared reqwest client.
    pub fn with_defaults(config: &FetchConfig) -> Result<Self, FetchError> {
        let http: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config)?);
        Ok(Self::new()
            .with_route("http", http.clone())
            .with_route("https", http))
    }

    /// Route `scheme` to `fetcher`, replacing any previous route.
    pub fn register(&mut self, scheme: &str, fetcher: Arc<dyn Fetcher>) {
        self.routes.insert(scheme.to_ascii_lowercase(), fetcher);
    }

    pub fn with_route(mut self, scheme: &str, fetcher: Arc<dyn Fetcher>) -> Self {
        self.register(scheme, fetcher);
        self
    }

    pub fn supports(&self, scheme: &str) -> bool {
        self.routes.contains_key(&scheme.to_ascii_lowercase())
    }

    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for SchemeRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeRouter")
            .field("schemes", &self.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Fetcher for SchemeRouter {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Fetched, FetchError> {
        let scheme = request.url.scheme();
        match self.routes.get(scheme) {
            Some(fetcher) => fetcher.fetch(request),
            None => {
                debug!(scheme, "no route for scheme");
                Err(FetchError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                })
            }
        }
    }
}
