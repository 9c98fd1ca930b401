use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::error::StratzError;
use crate::models::record::AggregatedPlayerRecord;

/// URL fragments of the Steam profile pages the overlay runs on.
const PROFILE_PAGE_PATTERNS: [&str; 2] = ["steamcommunity.com/id/", "steamcommunity.com/profiles/"];

/// Messages the content script understands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", content = "data")]
pub enum TabMessage {
    #[serde(rename = "updateDotaStats")]
    UpdateDotaStats(AggregatedPlayerRecord),
    #[serde(rename = "logData")]
    LogData(serde_json::Value),
}

/// Where finished records go.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Whether the content script is there to receive anything.
    async fn ping(&self) -> bool;

    async fn deliver(&self, record: &AggregatedPlayerRecord) -> Result<(), StratzError>;

    /// Best effort: raw API responses for the page's debug console.
    async fn forward_diagnostic(&self, raw: &serde_json::Value);
}

pub fn is_profile_page(url: &str) -> bool {
    PROFILE_PAGE_PATTERNS.iter().any(|p| url.contains(p))
}

/// The active tab, as seen through its open event streams.
#[derive(Clone)]
pub struct TabChannel {
    sender: broadcast::Sender<TabMessage>,
    active_url: Arc<RwLock<Option<String>>>,
}

impl TabChannel {
    pub fn new() -> (Self, broadcast::Receiver<TabMessage>) {
        let (tx, rx) = broadcast::channel(64);
        (
            Self {
                sender: tx,
                active_url: Arc::new(RwLock::new(None)),
            },
            rx,
        )
    }

    /// Attaches a content script. The latest attach sets the tab location.
    pub async fn attach(&self, url: Option<String>) -> broadcast::Receiver<TabMessage> {
        if let Some(url) = url {
            info!(url = %url, "content script attached");
            *self.active_url.write().await = Some(url);
        }
        self.sender.subscribe()
    }

    pub async fn active_url(&self) -> Option<String> {
        self.active_url.read().await.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

#[async_trait]
impl DeliveryChannel for TabChannel {
    async fn ping(&self) -> bool {
        self.is_attached()
    }

    async fn deliver(&self, record: &AggregatedPlayerRecord) -> Result<(), StratzError> {
        let receivers = self
            .sender
            .send(TabMessage::UpdateDotaStats(record.clone()))
            .map_err(|_| StratzError::DeliveryUnreachable)?;
        debug!(receivers, "record delivered");
        Ok(())
    }

    async fn forward_diagnostic(&self, raw: &serde_json::Value) {
        let on_profile_page = self
            .active_url
            .read()
            .await
            .as_deref()
            .map_or(false, is_profile_page);
        if on_profile_page {
            let _ = self.sender.send(TabMessage::LogData(raw.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::PlayerProfileRaw;
    use serde_json::json;

    fn record() -> AggregatedPlayerRecord {
        AggregatedPlayerRecord::from_profile(&PlayerProfileRaw::default())
    }

    #[test]
    fn test_profile_page_patterns() {
        assert!(is_profile_page("https://steamcommunity.com/id/someone/"));
        assert!(is_profile_page("https://steamcommunity.com/profiles/76561197960287930"));
        assert!(!is_profile_page("https://steamcommunity.com/market/"));
    }

    #[test]
    fn test_message_wire_format() {
        let value = serde_json::to_value(TabMessage::LogData(json!({ "a": 1 }))).unwrap();
        assert_eq!(value, json!({ "action": "logData", "data": { "a": 1 } }));

        let value = serde_json::to_value(TabMessage::UpdateDotaStats(record())).unwrap();
        assert_eq!(value["action"], "updateDotaStats");
        assert_eq!(value["data"]["playerName"], "");
    }

    #[tokio::test]
    async fn test_unreachable_without_subscriber() {
        let (tab, rx) = TabChannel::new();
        drop(rx);
        assert!(!tab.ping().await);
        assert!(matches!(tab.deliver(&record()).await, Err(StratzError::DeliveryUnreachable)));
    }

    #[tokio::test]
    async fn test_deliver_to_attached_script() {
        let (tab, rx) = TabChannel::new();
        drop(rx);
        let mut stream = tab.attach(Some("https://steamcommunity.com/id/x".into())).await;
        assert!(tab.ping().await);

        tab.deliver(&record()).await.unwrap();
        assert!(matches!(stream.recv().await.unwrap(), TabMessage::UpdateDotaStats(_)));
    }

    #[tokio::test]
    async fn test_diagnostics_only_on_profile_pages() {
        let (tab, rx) = TabChannel::new();
        drop(rx);
        let mut stream = tab.attach(Some("https://example.com/".into())).await;
        tab.forward_diagnostic(&json!({ "n": 1 })).await;

        let _second = tab.attach(Some("https://steamcommunity.com/profiles/1".into())).await;
        tab.forward_diagnostic(&json!({ "n": 2 })).await;

        match stream.recv().await.unwrap() {
            TabMessage::LogData(value) => assert_eq!(value["n"], 2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
