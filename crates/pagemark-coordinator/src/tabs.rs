//! Active-tab resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Platform identifier for a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a tab at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Resolves the currently active tab. Queried fresh on every request; the
/// active tab can change between actions, so the result is never cached.
#[async_trait]
pub trait TabQuery: Send + Sync {
    async fn active_tab(&self) -> Option<TabInfo>;
}

/// Schemes the coordinator refuses to address: the browser's own pages and
/// the extension's privileged origin.
const PRIVILEGED_SCHEMES: [&str; 4] = ["chrome://", "chrome-extension://", "edge://", "about:"];

pub fn is_privileged(url: &str) -> bool {
    PRIVILEGED_SCHEMES
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

/// In-process tab host for the demo driver and tests.
#[derive(Default)]
pub struct InMemoryTabs {
    active: RwLock<Option<TabInfo>>,
}

impl InMemoryTabs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active(tab: TabInfo) -> Self {
        Self {
            active: RwLock::new(Some(tab)),
        }
    }

    pub async fn set_active(&self, tab: Option<TabInfo>) {
        *self.active.write().await = tab;
    }
}

#[async_trait]
impl TabQuery for InMemoryTabs {
    async fn active_tab(&self) -> Option<TabInfo> {
        self.active.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_schemes_rejected() {
        assert!(is_privileged("chrome://extensions"));
        assert!(is_privileged("chrome-extension://abcdef/popup.html"));
        assert!(is_privileged("edge://settings"));
        assert!(is_privileged("about:blank"));
        assert!(!is_privileged("https://example.com"));
        assert!(!is_privileged("http://localhost:8080"));
    }

    #[tokio::test]
    async fn test_in_memory_tabs() {
        let tabs = InMemoryTabs::new();
        assert!(tabs.active_tab().await.is_none());

        let tab = TabInfo {
            id: TabId(1),
            url: "https://example.com".into(),
            title: Some("Example".into()),
        };
        tabs.set_active(Some(tab.clone())).await;
        assert_eq!(tabs.active_tab().await, Some(tab));
    }
}
