//! Catalog response bodies and how they fold into a [`Game`].
//!
//! Local metadata always wins: scalar fields and single asset slots are only
//! filled when still empty.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::cache::Endpoint;
use crate::model::{AssetKind, Game, extend_unique};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a non-empty JSON object")]
    NotAnObject,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ApiProduct {
    description: Option<ApiDescription>,
    release_date: Option<String>,
    images: Option<ApiImages>,
    screenshots: Option<Vec<ApiScreenshot>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiDescription {
    lead: Option<String>,
    full: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiImages {
    logo2x: Option<String>,
    background: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiScreenshot {
    formatter_template_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct EmbedSearch {
    products: Vec<EmbedProduct>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmbedProduct {
    id: u64,
    developer: Option<String>,
    publisher: Option<String>,
    genres: Vec<String>,
}

#[derive(Debug)]
pub(super) enum Payload {
    Api(ApiProduct),
    Embed(EmbedSearch),
}

/// Screenshot size requested from the image CDN.
const SCREENSHOT_FORMAT: &str = "ggvgm_2x";

pub(super) fn parse(endpoint: Endpoint, body: &[u8]) -> Result<Payload, SchemaError> {
    let root: Value = serde_json::from_slice(body)?;
    match &root {
        Value::Object(map) if !map.is_empty() => {}
        _ => return Err(SchemaError::NotAnObject),
    }
    Ok(match endpoint {
        Endpoint::Api => Payload::Api(serde_json::from_value(root)?),
        Endpoint::Embed => Payload::Embed(serde_json::from_value(root)?),
    })
}

impl Payload {
    pub(super) fn apply(self, id: &str, game: &mut Game) {
        match self {
            Payload::Api(product) => product.apply(game),
            Payload::Embed(search) => search.apply(id, game),
        }
    }
}

fn fill_text(dst: &mut String, src: Option<String>) {
    if !dst.is_empty() {
        return;
    }
    if let Some(text) = src.filter(|t| !t.trim().is_empty()) {
        *dst = text.replace('\n', " ").trim().to_string();
    }
}

/// Protocol-relative image links get an explicit scheme.
fn absolute_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

impl ApiProduct {
    fn apply(self, game: &mut Game) {
        if let Some(desc) = self.description {
            fill_text(&mut game.summary, desc.lead);
            fill_text(&mut game.description, desc.full);
        }

        if game.release_date.is_none() {
            game.release_date = self
                .release_date
                .as_deref()
                .and_then(|raw| raw.get(..10))
                .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok());
        }

        if let Some(images) = self.images {
            for (kind, url) in [
                (AssetKind::BoxFront, images.logo2x),
                (AssetKind::Background, images.background),
                (AssetKind::Logo, images.icon),
            ] {
                if let Some(url) = url.filter(|u| !u.is_empty()) {
                    game.assets.add_url_maybe(kind, absolute_url(&url));
                }
            }
        }

        for shot in self.screenshots.unwrap_or_default() {
            if let Some(template) = shot.formatter_template_url.filter(|u| !u.is_empty()) {
                let url = template.replace("{formatter}", SCREENSHOT_FORMAT);
                game.assets.append_multi(AssetKind::Screenshots, absolute_url(&url));
            }
        }
    }
}

impl EmbedSearch {
    /// Search results may list several products; only the one with our id counts.
    fn apply(self, id: &str, game: &mut Game) {
        for product in self.products {
            if product.id == 0 || product.id.to_string() != id {
                continue;
            }
            extend_unique(&mut game.developers, product.developer);
            extend_unique(&mut game.publishers, product.publisher);
            extend_unique(&mut game.genres, product.genres);
        }
    }
}
