//! Locating a reachable Ollama server.
//!
//! A configured base URL is used as-is. Otherwise the host's default gateway
//! and a list of well-known container/WSL addresses are tried concurrently and
//! the first reachable one, in priority order, is cached until a request fails.

use std::net::Ipv4Addr;
use std::time::Duration;

use futures_util::future::join_all;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::LlmConfig;
use crate::errors::{LlmError, LlmResult};

pub struct EndpointResolver {
    fixed: Option<String>,
    candidates: Vec<String>,
    client: Client,
    resolved: RwLock<Option<String>>,
}

impl EndpointResolver {
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        let client = discovery_client(config.discovery_timeout())?;

        if let Some(base_url) = &config.base_url {
            let fixed = normalize_base_url(base_url)?;
            info!("Using configured LLM endpoint {}", fixed);
            return Ok(Self {
                fixed: Some(fixed),
                candidates: Vec::new(),
                client,
                resolved: RwLock::new(None),
            });
        }

        let mut hosts: Vec<String> = Vec::new();
        if let Some(gateway) = default_gateway() {
            hosts.push(gateway.to_string());
        }
        hosts.extend(config.fallback_hosts.iter().cloned());

        let mut candidates: Vec<String> = Vec::new();
        for host in hosts {
            let candidate = format!("http://{}:{}", host, config.port);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }

        Ok(Self::with_candidates(candidates, client))
    }

    pub fn with_candidates(candidates: Vec<String>, client: Client) -> Self {
        Self {
            fixed: None,
            candidates,
            client,
            resolved: RwLock::new(None),
        }
    }

    pub fn fixed(base_url: &str, discovery_timeout: Duration) -> LlmResult<Self> {
        Ok(Self {
            fixed: Some(normalize_base_url(base_url)?),
            candidates: Vec::new(),
            client: discovery_client(discovery_timeout)?,
            resolved: RwLock::new(None),
        })
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub async fn base_url(&self) -> LlmResult<String> {
        if let Some(fixed) = &self.fixed {
            return Ok(fixed.clone());
        }
        if let Some(resolved) = self.resolved.read().await.clone() {
            return Ok(resolved);
        }

        let found = self.discover().await?;
        *self.resolved.write().await = Some(found.clone());
        Ok(found)
    }

    /// Forgets the cached endpoint so the next call searches again.
    pub async fn invalidate(&self) {
        if self.fixed.is_none() {
            *self.resolved.write().await = None;
        }
    }

    async fn discover(&self) -> LlmResult<String> {
        if self.candidates.is_empty() {
            return Err(LlmError::Unreachable("no candidate endpoints".to_string()));
        }

        let attempts = self.candidates.iter().map(|candidate| async move {
            let url = format!("{}/api/tags", candidate);
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => true,
                Ok(response) => {
                    debug!("{} answered {}", candidate, response.status());
                    false
                }
                Err(err) => {
                    debug!("{} unreachable: {}", candidate, err);
                    false
                }
            }
        });
        let results = join_all(attempts).await;

        match self
            .candidates
            .iter()
            .zip(results)
            .find(|(_, reachable)| *reachable)
        {
            Some((candidate, _)) => {
                info!("Resolved LLM endpoint {}", candidate);
                Ok(candidate.clone())
            }
            None => {
                warn!("No LLM endpoint reachable among {} candidates", self.candidates.len());
                Err(LlmError::Unreachable(self.candidates.join(", ")))
            }
        }
    }
}

fn discovery_client(timeout: Duration) -> LlmResult<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Validates an http(s) URL and drops any trailing slash.
pub fn normalize_base_url(raw: &str) -> LlmResult<String> {
    let url = Url::parse(raw.trim()).map_err(|_| LlmError::InvalidBaseUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(LlmError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn default_gateway() -> Option<Ipv4Addr> {
    let content = std::fs::read_to_string("/proc/net/route").ok()?;
    parse_default_gateway(&content)
}

/// Reads the gateway of the `00000000` destination from `/proc/net/route`.
pub fn parse_default_gateway(route_table: &str) -> Option<Ipv4Addr> {
    route_table.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.get(1) != Some(&"00000000") {
            return None;
        }
        let raw = u32::from_str_radix(fields.get(2)?, 16).ok()?;
        let gateway = Ipv4Addr::from(raw.to_le_bytes());
        (!gateway.is_unspecified()).then_some(gateway)
    })
}
