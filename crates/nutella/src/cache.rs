//! Hourly-bucketed on-disk cache for admin API responses
//!
//! Each (host, resource, UTC hour) triple maps to one JSON file. A file is
//! fresh for 3600 seconds; after that the bucket stamp has rolled over and
//! the next read refetches. When a live fetch fails, the most recent stale
//! file for the same host and resource is served instead, whatever its age.
//! Old buckets are never deleted.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{NutellaError, Result};

/// Maximum age of a current-bucket file before it counts as stale
const FRESH_TTL: Duration = Duration::from_secs(3600);

/// On-disk cache keyed by host, resource kind, and UTC calendar hour.
///
/// The cache directory is an explicit constructor argument; nothing in here
/// consults the process environment.
#[derive(Debug, Clone)]
pub struct HourlyCache {
    dir: PathBuf,
}

impl HourlyCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Run `fetch` through the cache for the given host and resource.
    ///
    /// Serves the current hour bucket when fresh, persists successful fetch
    /// results, and falls back to the most recent stale file when the fetch
    /// fails. If the cache directory cannot be created the cache is bypassed
    /// entirely and the fetch result (or error) passes through unchanged.
    /// Cache write failures are swallowed; malformed cached JSON is a parse
    /// error, not a miss.
    pub async fn fetch_through<F, Fut>(&self, host: &str, resource: &str, fetch: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!("Cache directory unavailable, bypassing cache: {e}");
            return fetch().await;
        }

        let key = sanitize_host(host);
        let path = self.dir.join(file_name(&key, resource, &hour_bucket()));

        if let Some(cached) = self.read_fresh(&path).await? {
            debug!("Cache hit for {key}/{resource}");
            return Ok(cached);
        }

        match fetch().await {
            Ok(body) => {
                self.write(&path, &body).await;
                Ok(body)
            }
            Err(fetch_err) => {
                debug!("Fetch failed for {key}/{resource}, scanning for stale cache: {fetch_err}");
                match self.latest_stale(&key, resource).await? {
                    Some(stale) => {
                        warn!("Serving stale cache for {key}/{resource}");
                        Ok(stale)
                    }
                    None => Err(fetch_err),
                }
            }
        }
    }

    /// Read the current-bucket file if it exists and is under the TTL
    async fn read_fresh(&self, path: &Path) -> Result<Option<Value>> {
        let Ok(meta) = tokio::fs::metadata(path).await else {
            return Ok(None);
        };
        let age = meta
            .modified()
            .ok()
            .and_then(|m| m.elapsed().ok())
            .unwrap_or(FRESH_TTL);
        if age >= FRESH_TTL {
            return Ok(None);
        }

        let Ok(content) = tokio::fs::read_to_string(path).await else {
            return Ok(None);
        };
        let parsed = serde_json::from_str(&content).map_err(|e| {
            NutellaError::Parse(format!("Malformed cache file {}: {e}", path.display()))
        })?;
        Ok(Some(parsed))
    }

    /// Persist a fetched payload as pretty-printed JSON.
    ///
    /// Failures are logged and swallowed; a cache write must never fail the
    /// request that produced the payload.
    async fn write(&self, path: &Path, body: &Value) {
        let pretty = match serde_json::to_string_pretty(body) {
            Ok(pretty) => pretty,
            Err(e) => {
                warn!("Failed to serialize cache payload: {e}");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(path, pretty).await {
            warn!("Failed to write cache file {}: {e}", path.display());
        } else {
            debug!("Cached response at {}", path.display());
        }
    }

    /// Most recent previously cached payload for a host/resource, any age.
    ///
    /// File names sort chronologically because the stamp is zero-padded
    /// year-first, so the lexicographically last match is the newest.
    async fn latest_stale(&self, key: &str, resource: &str) -> Result<Option<Value>> {
        let prefix = format!("{key}_{resource}_");

        let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await else {
            return Ok(None);
        };
        let mut matches: Vec<String> = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) && name.ends_with(".json") {
                matches.push(name);
            }
        }
        matches.sort();

        let Some(newest) = matches.last() else {
            return Ok(None);
        };
        let path = self.dir.join(newest);
        let Ok(content) = tokio::fs::read_to_string(&path).await else {
            return Ok(None);
        };
        let parsed = serde_json::from_str(&content).map_err(|e| {
            NutellaError::Parse(format!("Malformed cache file {}: {e}", path.display()))
        })?;
        Ok(Some(parsed))
    }
}

/// Extract the hostname from an API base URL and sanitize it for use in a
/// file name (path separators and colons become underscores).
pub fn sanitize_host(api_host: &str) -> String {
    let host = Url::parse(api_host)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| api_host.to_string());
    host.replace(['/', '\\', ':'], "_")
}

/// Current UTC hour bucket stamp, e.g. `20260806T14Z`
pub fn hour_bucket() -> String {
    Utc::now().format("%Y%m%dT%HZ").to_string()
}

/// Cache file name for a sanitized host, resource kind, and bucket stamp
pub fn file_name(key: &str, resource: &str, stamp: &str) -> String {
    format!("{key}_{resource}_{stamp}.json")
}
