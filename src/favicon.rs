//! Favicon retrieval and Shodan-compatible hashing.
//!
//! Shodan indexes a favicon under `http.favicon.hash`, the signed 32-bit
//! MurmurHash3 (seed 0) of the favicon's base64 encoding laid out as MIME
//! lines: a newline after every 76 characters and after the last line.

use crate::config::HttpConfig;
use base64::{engine::general_purpose, Engine as _};
use murmurhash3::murmurhash3_x86_32;
use reqwest::{Client, StatusCode};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIME_LINE_LENGTH: usize = 76;

/// Base64-encode and wrap into MIME lines
pub fn mime_base64(bytes: &[u8]) -> String {
    let encoded = general_purpose::STANDARD.encode(bytes);
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / MIME_LINE_LENGTH + 1);

    for (i, ch) in encoded.chars().enumerate() {
        wrapped.push(ch);
        if (i + 1) % MIME_LINE_LENGTH == 0 {
            wrapped.push('\n');
        }
    }
    if encoded.len() % MIME_LINE_LENGTH != 0 {
        wrapped.push('\n');
    }

    wrapped
}

pub fn compute_favicon_hash(bytes: &[u8]) -> i32 {
    murmurhash3_x86_32(mime_base64(bytes).as_bytes(), 0) as i32
}

pub struct FaviconFetcher {
    client: Client,
    favicon_path: PathBuf,
}

impl FaviconFetcher {
    pub fn new(config: &HttpConfig, favicon_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            favicon_path: favicon_path.into(),
        })
    }

    pub fn favicon_path(&self) -> &Path {
        &self.favicon_path
    }

    /// True only when the URL answers with 200 OK within the timeout
    pub async fn is_reachable(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => {
                log::debug!("Reachability check for {} returned {}", url, response.status());
                response.status() == StatusCode::OK
            }
            Err(e) => {
                log::debug!("Reachability check for {url} failed: {e}");
                println!("Address could not be reached");
                false
            }
        }
    }

    /// Download the favicon, keep a copy on disk and hash the stored bytes.
    ///
    /// Network failures and non-200 answers yield `Ok(None)`; only local
    /// file errors are returned as `Err`.
    pub async fn fetch_and_hash(&self, url: &str) -> anyhow::Result<Option<i32>> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                println!("Could not reach favicon: {e}");
                return Ok(None);
            }
        };

        if response.status() != StatusCode::OK {
            log::debug!("Favicon download from {} returned {}", url, response.status());
            println!("Failed to download favicon");
            return Ok(None);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                println!("Could not reach favicon: {e}");
                return Ok(None);
            }
        };

        fs::write(&self.favicon_path, &body)?;
        let stored = fs::read(&self.favicon_path)?;
        log::debug!(
            "Saved {} favicon bytes to {}",
            stored.len(),
            self.favicon_path.display()
        );

        Ok(Some(compute_favicon_hash(&stored)))
    }
}
