//! Metadata sources and the run that drives them.
//!
//! A run is two phases over one [`SearchContext`]: every provider's
//! `find_lists` in order, then every provider's `find_static_data`. Providers
//! never run concurrently, so the context needs no locking.

mod gog;
mod local;

use std::collections::HashMap;
use std::time::Instant;

use log::{info, warn};

use crate::config::Settings;
use crate::search::SearchContext;

pub use gog::{
    EnhanceStats, Endpoint, Fetch, FetchError, GogProvider, HttpFetcher, JsonCache, SchemaError,
};
pub use local::LocalProvider;

pub trait Provider {
    /// Prefix used in log messages.
    fn name(&self) -> &'static str;

    /// Create games and collections.
    fn find_lists(&mut self, _ctx: &mut SearchContext) {}

    /// Fill in data for games that already exist.
    fn find_static_data(&mut self, _ctx: &mut SearchContext) {}
}

/// Providers enabled by `settings`, in the order they run.
pub fn build(settings: &Settings) -> Vec<Box<dyn Provider>> {
    let mut providers: Vec<Box<dyn Provider>> = vec![Box::new(LocalProvider::new(
        settings.library.directories.clone(),
        settings.library.clone(),
    ))];

    if settings.gog.enabled {
        match GogProvider::new(settings.gog.clone(), settings.cache_dir()) {
            Ok(gog) => providers.push(Box::new(gog)),
            Err(e) => warn!("GOG: cannot create the HTTP client, provider disabled: {e}"),
        }
    }
    providers
}

pub fn run_providers(providers: &mut [Box<dyn Provider>], ctx: &mut SearchContext) {
    for provider in providers.iter_mut() {
        let started = Instant::now();
        provider.find_lists(ctx);
        info!(
            "{}: game list ready in {}ms, {} games so far",
            provider.name(),
            started.elapsed().as_millis(),
            ctx.games().len()
        );
    }
    for provider in providers.iter_mut() {
        let started = Instant::now();
        provider.find_static_data(ctx);
        info!(
            "{}: static data ready in {}ms",
            provider.name(),
            started.elapsed().as_millis()
        );
    }
}

/// Run every enabled provider over `ctx`.
pub fn run(settings: &Settings, ctx: &mut SearchContext) {
    let mut providers = build(settings);
    run_providers(&mut providers, ctx);
}

/// Convenience wrapper returning a fresh context.
pub fn search(settings: &Settings) -> SearchContext {
    let mut ctx = SearchContext::new();
    run(settings, &mut ctx);
    ctx
}

/// Map of game index to the value of its `key` extra field, for games that
/// have a non-empty one.
pub fn external_ids(ctx: &SearchContext, key: &str) -> HashMap<usize, String> {
    ctx.games()
        .iter()
        .enumerate()
        .filter_map(|(idx, game)| {
            let id = game.extra.get(key)?.trim();
            (!id.is_empty()).then(|| (idx, id.to_string()))
        })
        .collect()
}
