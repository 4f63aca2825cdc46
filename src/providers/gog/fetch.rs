use std::future::Future;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),
}

/// The network seam of the catalog provider.
pub trait Fetch: Send + Sync + 'static {
    /// GET `url` and return the body of a successful response.
    fn get(&self, url: String) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;

    /// Whether the network is usable at all; asked once per run.
    fn is_online(&self) -> impl Future<Output = bool> + Send;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    online_host: String,
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

impl HttpFetcher {
    /// `online_host` is a `host:port` pair resolved by [`Fetch::is_online`].
    pub fn new(online_host: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            online_host: online_host.into(),
        })
    }
}

impl Fetch for HttpFetcher {
    async fn get(&self, url: String) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn is_online(&self) -> bool {
        match tokio::net::lookup_host(self.online_host.as_str()).await {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(_) => false,
        }
    }
}
