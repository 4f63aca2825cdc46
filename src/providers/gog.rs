//! Catalog enrichment for the games of one tag collection.
//!
//! Every game of the collection with a catalog id is looked up at two
//! endpoints. Cached responses are used first; the rest is downloaded
//! concurrently and stored. A batch ends when all requests are done or none
//! finished for `idle_timeout_ms`.

mod cache;
mod fetch;
mod json;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinSet;

use crate::config::GogSettings;
use crate::search::SearchContext;

use super::{Provider, external_ids};
pub use cache::{Endpoint, JsonCache};
pub use fetch::{Fetch, FetchError, HttpFetcher};
pub use json::SchemaError;

/// What one `enhance` call did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnhanceStats {
    /// Responses taken from the cache.
    pub cached: usize,
    /// Responses downloaded and merged.
    pub downloaded: usize,
    /// Requests that failed or returned an unusable body.
    pub failed: usize,
    /// Requests still running when the idle timeout fired.
    pub aborted: usize,
}

/// One request to make.
#[derive(Debug, Clone)]
struct Job {
    idx: usize,
    id: String,
    title: String,
    endpoint: Endpoint,
    url: String,
}

pub struct GogProvider<F: Fetch = HttpFetcher> {
    settings: GogSettings,
    cache: Option<JsonCache>,
    fetcher: Arc<F>,
}

impl GogProvider<HttpFetcher> {
    pub fn new(settings: GogSettings, cache_root: Option<PathBuf>) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(settings.connectivity_host.clone())?;
        Ok(Self::with_fetcher(settings, cache_root, fetcher))
    }
}

/// Ids end up in file names.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Search URL for `title`, or `None` when `base` is not a URL.
pub(super) fn embed_url(base: &str, title: &str) -> Option<String> {
    let mut url = reqwest::Url::parse(base).ok()?;
    url.query_pairs_mut().append_pair("search", title);
    Some(url.into())
}

impl<F: Fetch> GogProvider<F> {
    pub fn with_fetcher(settings: GogSettings, cache_root: Option<PathBuf>, fetcher: F) -> Self {
        if cache_root.is_none() {
            warn!("GOG: no cache directory available, responses will not be cached");
        }
        Self {
            settings,
            cache: cache_root.map(|root| JsonCache::new(&root)),
            fetcher: Arc::new(fetcher),
        }
    }

    fn url_for(&self, endpoint: Endpoint, id: &str, title: &str) -> Option<String> {
        match endpoint {
            Endpoint::Api => Some(self.settings.api_url.replace("{id}", id)),
            Endpoint::Embed => embed_url(&self.settings.embed_url, title),
        }
    }

    /// Fill in the games of the tag collection from the catalog.
    ///
    /// `ids` maps game indices to catalog ids. Games are only ever updated,
    /// never created.
    pub fn enhance(&self, ctx: &mut SearchContext, ids: &HashMap<usize, String>) -> EnhanceStats {
        let mut stats = EnhanceStats::default();
        let tag = self.settings.collection.as_str();
        if !ctx.has_children(tag) {
            return stats;
        }

        let mut jobs = Vec::new();
        for idx in ctx.collection_children(tag).to_vec() {
            let Some(id) = ids.get(&idx) else {
                continue;
            };
            let Some(title) = ctx.game(idx).map(|g| g.title.clone()) else {
                continue;
            };
            if !is_valid_id(id) {
                warn!("GOG: invalid catalog id `{id}` for game `{title}`, ignored");
                continue;
            }

            for endpoint in Endpoint::ALL {
                if self.fill_from_cache(ctx, idx, id, endpoint) {
                    stats.cached += 1;
                    continue;
                }
                match self.url_for(endpoint, id, &title) {
                    Some(url) => jobs.push(Job {
                        idx,
                        id: id.clone(),
                        title: title.clone(),
                        endpoint,
                        url,
                    }),
                    None => warn!("GOG: invalid search URL `{}`", self.settings.embed_url),
                }
            }
        }

        if jobs.is_empty() {
            return stats;
        }

        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                warn!("GOG: failed to start the download runtime: {e}");
                return stats;
            }
        };

        let idle = Duration::from_millis(self.settings.idle_timeout_ms.max(1));
        let outcome = rt.block_on(async {
            if !self.fetcher.is_online().await {
                warn!("GOG: no internet connection - most game data may be missing");
                return None;
            }
            debug!("GOG: downloading {} responses", jobs.len());
            let (mut merged, mut failed) = (0, 0);
            let aborted = download(Arc::clone(&self.fetcher), jobs, idle, |job, result| {
                if self.on_done(ctx, job, result) {
                    merged += 1;
                } else {
                    failed += 1;
                }
            })
            .await;
            Some((merged, failed, aborted))
        });
        let Some((merged, failed, aborted)) = outcome else {
            return stats;
        };
        stats.downloaded = merged;
        stats.failed = failed;
        stats.aborted = aborted;

        if stats.aborted > 0 {
            warn!(
                "GOG: {} requests did not finish within {}ms of the last response, aborted",
                stats.aborted,
                idle.as_millis()
            );
        }
        stats
    }

    /// Apply a cached response. Unusable entries are deleted so the
    /// endpoint is fetched again.
    fn fill_from_cache(
        &self,
        ctx: &mut SearchContext,
        idx: usize,
        id: &str,
        endpoint: Endpoint,
    ) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        let Some(body) = cache.read(id, endpoint) else {
            return false;
        };
        match json::parse(endpoint, &body) {
            Ok(payload) => {
                if let Some(game) = ctx.game_mut(idx) {
                    payload.apply(id, game);
                }
                true
            }
            Err(e) => {
                warn!(
                    "GOG: cached response `{}` is unusable ({e}), removed",
                    cache.path_for(id, endpoint).display()
                );
                cache.delete(id, endpoint);
                false
            }
        }
    }

    /// Handle one finished request. Returns whether its data was merged.
    fn on_done(
        &self,
        ctx: &mut SearchContext,
        job: Job,
        result: Result<Vec<u8>, FetchError>,
    ) -> bool {
        let body = match result {
            Ok(body) => body,
            Err(e) => {
                let which = match job.endpoint {
                    Endpoint::Api => "metadata",
                    Endpoint::Embed => "secondary metadata",
                };
                warn!("GOG: downloading {which} for `{}` failed ({e})", job.title);
                return false;
            }
        };

        let payload = match json::parse(job.endpoint, &body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    "GOG: failed to parse the response of the server for game `{}` - \
                     perhaps the GOG API changed? ({e})",
                    job.title
                );
                return false;
            }
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&job.id, job.endpoint, &body) {
                warn!(
                    "GOG: failed to write `{}`: {e}",
                    cache.path_for(&job.id, job.endpoint).display()
                );
            }
        }
        if let Some(game) = ctx.game_mut(job.idx) {
            payload.apply(&job.id, game);
        }
        true
    }
}

/// Run every job concurrently and hand each result to `on_done` as it
/// arrives. Gives up once `idle` passes without a completion; returns how
/// many requests were aborted.
async fn download<F: Fetch>(
    fetcher: Arc<F>,
    jobs: Vec<Job>,
    idle: Duration,
    mut on_done: impl FnMut(Job, Result<Vec<u8>, FetchError>),
) -> usize {
    let mut set = JoinSet::new();
    for job in jobs {
        let fetcher = Arc::clone(&fetcher);
        set.spawn(async move {
            let result = fetcher.get(job.url.clone()).await;
            (job, result)
        });
    }

    loop {
        match tokio::time::timeout(idle, set.join_next()).await {
            Ok(Some(Ok((job, result)))) => on_done(job, result),
            Ok(Some(Err(e))) => warn!("GOG: download task failed: {e}"),
            Ok(None) => return 0,
            Err(_) => {
                let left = set.len();
                set.abort_all();
                return left;
            }
        }
    }
}

impl<F: Fetch> Provider for GogProvider<F> {
    fn name(&self) -> &'static str {
        "GOG"
    }

    fn find_static_data(&mut self, ctx: &mut SearchContext) {
        let ids = external_ids(ctx, &self.settings.id_key);
        if ids.is_empty() {
            return;
        }
        let stats = self.enhance(ctx, &ids);
        info!(
            "GOG: {} responses from cache, {} downloaded, {} failed, {} aborted",
            stats.cached, stats.downloaded, stats.failed, stats.aborted
        );
    }
}
