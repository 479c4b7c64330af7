//! Feed reader: fetches brand feeds and normalizes entries into products
//!
//! A single source failing (network error, malformed document) never stops
//! the others; `fetch_all` logs and moves on.

use chrono::Utc;
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use std::time::Duration;
use thiserror::Error;

use crate::models::Product;
use crate::utils::text;

const FETCH_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("fitradar/", env!("CARGO_PKG_VERSION"));

/// Max description length kept on a normalized product.
const MAX_DESCRIPTION_CHARS: usize = 500;

/// Brand inferred when neither the source URL nor the title matches the
/// keyword table.
pub const UNKNOWN_BRAND: &str = "Unknown Brand";

/// Keywords matched against the feed URL.
const FEED_URL_BRANDS: &[(&str, &str)] = &[
    ("adidas", "Adidas"),
    ("hypebeast", "HYPEBEAST"),
    ("luxury", "Luxury Brands"),
];

/// Keywords matched against the entry title.
const TITLE_BRANDS: &[(&str, &str)] = &[("adidas", "Adidas"), ("nike", "Nike"), ("zara", "Zara")];

/// Feed reader errors
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed returned HTTP {0}")]
    Status(u16),

    #[error("Malformed feed: {0}")]
    Parse(String),
}

/// Fetches and normalizes configured syndication feeds.
pub struct FeedReader {
    http: reqwest::Client,
}

impl FeedReader {
    pub fn new() -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http })
    }

    /// Fetch and normalize one feed.
    pub async fn fetch_feed(&self, feed_url: &str) -> Result<Vec<Product>, FeedError> {
        let response = self.http.get(feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let feed = parser::parse(&body[..]).map_err(|e| FeedError::Parse(e.to_string()))?;

        Ok(products_from_feed(feed_url, &feed))
    }

    /// Fetch every configured feed. Per-source failures are logged and
    /// skipped so the remaining sources still contribute.
    pub async fn fetch_all(&self, feed_urls: &[String]) -> Vec<Product> {
        let mut all = Vec::new();

        for feed_url in feed_urls {
            match self.fetch_feed(feed_url).await {
                Ok(mut products) => {
                    tracing::debug!(feed = %feed_url, count = products.len(), "Fetched feed");
                    all.append(&mut products);
                }
                Err(e) => {
                    tracing::warn!(feed = %feed_url, error = %e, "Skipping feed");
                }
            }
        }

        all
    }
}

/// Normalize parsed entries into products, preserving feed order.
pub fn products_from_feed(feed_url: &str, feed: &Feed) -> Vec<Product> {
    feed.entries
        .iter()
        .map(|entry| product_from_entry(feed_url, entry))
        .collect()
}

fn product_from_entry(feed_url: &str, entry: &Entry) -> Product {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_default();
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();

    // Canonical locator: link, falling back to title
    let locator = if link.is_empty() { &title } else { &link };
    let id = Product::derive_id(locator);

    let raw_summary = entry
        .summary
        .as_ref()
        .map(|t| t.content.clone())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .unwrap_or_default();

    Product {
        id,
        name: title.clone(),
        description: text::clean_feed_text(&raw_summary, MAX_DESCRIPTION_CHARS),
        brand: infer_brand(feed_url, &title),
        image_url: extract_image(entry, &raw_summary),
        product_url: link,
        published_at: Some(entry.published.or(entry.updated).unwrap_or_else(Utc::now)),
        source_feed: Some(feed_url.to_string()),
    }
}

/// Infer the brand from the source URL first, then the entry title.
fn infer_brand(feed_url: &str, title: &str) -> String {
    let url_lower = feed_url.to_lowercase();
    for (keyword, brand) in FEED_URL_BRANDS {
        if url_lower.contains(keyword) {
            return brand.to_string();
        }
    }

    let title_lower = title.to_lowercase();
    for (keyword, brand) in TITLE_BRANDS {
        if title_lower.contains(keyword) {
            return brand.to_string();
        }
    }

    UNKNOWN_BRAND.to_string()
}

/// Extract an image reference in priority order: media content, media
/// thumbnail, enclosure link, first image tag in the raw body.
fn extract_image(entry: &Entry, raw_summary: &str) -> String {
    for media in &entry.media {
        for content in &media.content {
            let is_image = content
                .content_type
                .as_ref()
                .map(|m| m.ty() == "image")
                .unwrap_or(false);
            if is_image {
                if let Some(url) = &content.url {
                    return url.to_string();
                }
            }
        }
    }

    for media in &entry.media {
        if let Some(thumbnail) = media.thumbnails.first() {
            return thumbnail.image.uri.clone();
        }
    }

    for link in &entry.links {
        let is_enclosure = link.rel.as_deref() == Some("enclosure");
        let is_image = link
            .media_type
            .as_deref()
            .map(|m| m.starts_with("image"))
            .unwrap_or(false);
        if is_enclosure && is_image {
            return link.href.clone();
        }
    }

    text::first_img_src(raw_summary).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>New Releases</title>
    <item>
      <title>Air Max 2024</title>
      <link>https://x.com/a</link>
      <description><![CDATA[<p>Bold &amp; breathable.</p><img src="https://cdn.x.com/a.jpg">]]></description>
      <pubDate>Mon, 06 May 2024 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Sneaker without a link</title>
      <description>Plain text entry</description>
    </item>
    <item>
      <title>Track Jacket</title>
      <link>https://x.com/c</link>
      <media:content url="https://cdn.x.com/c.jpg" type="image/jpeg" />
    </item>
  </channel>
</rss>"#;

    fn parse_sample() -> Feed {
        parser::parse(SAMPLE_RSS.as_bytes()).unwrap()
    }

    #[test]
    fn same_entry_always_derives_same_id() {
        let first = products_from_feed("https://feeds.example.com/news", &parse_sample());
        let second = products_from_feed("https://feeds.example.com/news", &parse_sample());
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[0].id, Product::derive_id("https://x.com/a"));
    }

    #[test]
    fn brand_from_feed_url_wins_over_title() {
        let products = products_from_feed("https://www.adidas-group.com/en/rss/news/", &parse_sample());
        assert_eq!(products[0].brand, "Adidas");
    }

    #[test]
    fn brand_falls_back_to_title_then_sentinel() {
        assert_eq!(infer_brand("https://feeds.example.com", "New Nike drop"), "Nike");
        assert_eq!(infer_brand("https://feeds.example.com", "Mystery drop"), UNKNOWN_BRAND);
    }

    #[test]
    fn description_is_cleaned_and_image_extracted_from_body() {
        let products = products_from_feed("https://feeds.example.com/news", &parse_sample());
        assert_eq!(products[0].description, "Bold & breathable.");
        assert_eq!(products[0].image_url, "https://cdn.x.com/a.jpg");
        assert_eq!(products[0].product_url, "https://x.com/a");
        assert!(products[0].published_at.is_some());
    }

    #[test]
    fn media_content_image_takes_priority() {
        let products = products_from_feed("https://feeds.example.com/news", &parse_sample());
        assert_eq!(products[2].image_url, "https://cdn.x.com/c.jpg");
    }

    #[test]
    fn entry_without_link_hashes_title() {
        let products = products_from_feed("https://feeds.example.com/news", &parse_sample());
        assert_eq!(products[1].id, Product::derive_id("Sneaker without a link"));
        assert_eq!(products[1].image_url, "");
    }
}
