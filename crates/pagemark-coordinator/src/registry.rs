//! Registry of injected page agents, keyed by tab.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use pagemark_agent::AgentHandle;

use crate::tabs::TabId;

/// Per-tab agent handles. Absence of an entry (or a closed mailbox) is the
/// "no listener registered" condition that triggers injection recovery.
#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<HashMap<TabId, AgentHandle>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, tab: TabId, handle: AgentHandle) {
        debug!(%tab, "Page agent registered");
        self.agents.write().await.insert(tab, handle);
    }

    pub async fn unregister(&self, tab: TabId) {
        if self.agents.write().await.remove(&tab).is_some() {
            debug!(%tab, "Page agent unregistered");
        }
    }

    /// Handle for a tab's agent, if one is registered and still connected.
    /// Stale handles whose mailbox has closed are dropped on access.
    pub async fn get(&self, tab: TabId) -> Option<AgentHandle> {
        {
            let agents = self.agents.read().await;
            match agents.get(&tab) {
                Some(handle) if handle.is_connected() => return Some(handle.clone()),
                None => return None,
                Some(_) => {}
            }
        }
        // Listener went away since registration
        self.unregister(tab).await;
        None
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }
}
