//! Page agent injection.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use pagemark_agent::{ClipboardSink, PageAgent, SignalSender};

use crate::registry::AgentRegistry;
use crate::tabs::TabInfo;

/// Injects a fresh page agent into a tab. Injection is a privileged
/// one-shot operation with no rollback; if it fails, the route fails.
#[async_trait]
pub trait AgentInjector: Send + Sync {
    async fn inject(&self, tab: &TabInfo) -> anyhow::Result<()>;
}

/// Injector that spawns an in-process [`PageAgent`] task and registers its
/// handle, standing in for the platform's script-injection primitive.
pub struct SpawnInjector {
    registry: Arc<AgentRegistry>,
    clipboard: Arc<dyn ClipboardSink>,
    signals: SignalSender,
}

impl SpawnInjector {
    pub fn new(
        registry: Arc<AgentRegistry>,
        clipboard: Arc<dyn ClipboardSink>,
        signals: SignalSender,
    ) -> Self {
        Self {
            registry,
            clipboard,
            signals,
        }
    }
}

#[async_trait]
impl AgentInjector for SpawnInjector {
    async fn inject(&self, tab: &TabInfo) -> anyhow::Result<()> {
        info!(tab = %tab.id, url = %tab.url, "Injecting page agent");
        let handle = PageAgent::spawn(Some(tab.id.0), self.clipboard.clone(), self.signals.clone());
        self.registry.register(tab.id, handle).await;
        Ok(())
    }
}
