//! Adapters for the external providers.
//!
//! Each provider module pairs a pure `normalize_*` function (raw payload text to canonical
//! records, testable without a network) with a reqwest-backed client implementing one of the
//! traits below. Provider quirks stay inside their module.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::fixtures::FixtureWindow;
use crate::error::FeedError;
use crate::models::fixture::{Match, SportType};

pub mod cricapi;
pub mod gemini;
pub mod sportmonks;
pub mod sportsdb;

#[async_trait]
pub trait FixtureSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn sport(&self) -> SportType;
    /// Upcoming fixtures inside `window`, at most `window.max_matches`, in provider order.
    async fn fetch_fixtures(&self, window: &FixtureWindow) -> Result<Vec<Match>, FeedError>;
}

#[async_trait]
pub trait LineupSource: Send + Sync {
    /// `Ok(None)` when the provider has no usable lineup for the fixture yet.
    async fn fetch_lineup(
        &self,
        match_id: &str,
        sport: SportType,
    ) -> Result<Option<Lineup>, FeedError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, FeedError>;
}

/// A lineup as announced by a provider, already mapped off the provider's shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lineup {
    pub entries: Vec<LineupEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineupEntry {
    pub raw_id: String,
    pub name: String,
    /// 0 for the home/local side, 1 for the visitors, `None` when the provider's team id matched
    /// neither.
    pub side: Option<usize>,
    pub position: String,
    pub nationality: String,
    pub birth_date: String,
}

/// Provider objects that arrive either bare or wrapped as `{"data": {...}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Nested<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Nested<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Nested::Wrapped { data } => data,
            Nested::Bare(inner) => inner,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Named {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

pub(crate) fn nested_named(value: Option<Nested<Named>>) -> Named {
    value.map(Nested::into_inner).unwrap_or_default()
}

/// Provider ids come as strings or numbers.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Deserialize each record on its own so a malformed one does not sink its siblings.
pub(crate) fn decode_each<T: for<'de> Deserialize<'de>>(items: Vec<Value>, what: &str) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!("skipping malformed {}: {}", what, e);
                None
            }
        })
        .collect()
}

/// Shared HTTP client for every provider. Every request it sends is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent("fantasyiq-engine/0.1")
        .build()
}

pub(crate) async fn get_text(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String, FeedError> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| FeedError::Transport {
            url: url.to_string(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(|source| FeedError::Transport {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_accepts_bare_wrapped_and_null() {
        let bare: Option<Nested<Named>> =
            serde_json::from_str(r#"{"id": 5, "name": "Eden Gardens"}"#).unwrap();
        assert_eq!(nested_named(bare).name.as_deref(), Some("Eden Gardens"));

        let wrapped: Option<Nested<Named>> =
            serde_json::from_str(r#"{"data": {"id": "9", "name": "Wankhede"}}"#).unwrap();
        assert_eq!(nested_named(wrapped).name.as_deref(), Some("Wankhede"));

        let null: Option<Nested<Named>> = serde_json::from_str("null").unwrap();
        assert!(nested_named(null).name.is_none());
    }

    #[test]
    fn ids_from_strings_and_numbers() {
        assert_eq!(id_string(&serde_json::json!(55)), Some("55".to_string()));
        assert_eq!(id_string(&serde_json::json!(" a1 ")), Some("a1".to_string()));
        assert_eq!(id_string(&serde_json::json!(null)), None);
        assert_eq!(id_string(&serde_json::json!("")), None);
    }

    #[tokio::test]
    async fn requests_give_up_after_the_client_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let silent = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = build_client(Duration::from_millis(200)).expect("client builds");
        let url = format!("http://{}/fixtures", addr);
        match get_text(&client, &url, &[]).await {
            Err(FeedError::Transport { source, .. }) => assert!(source.is_timeout()),
            other => panic!("expected a timeout, got {:?}", other.map(|_| ())),
        }
        silent.abort();
    }
}
