//! Request routing: toolbar request in, terminal response out.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use pagemark_core::error::PageMarkError;
use pagemark_core::protocol::{AgentCommand, AgentSignal, ToolRequest, ToolResponse};

use crate::commands::activation_command;
use crate::injector::AgentInjector;
use crate::registry::AgentRegistry;
use crate::tabs::{is_privileged, TabId, TabQuery};

/// The coordinator routes each toolbar request to the active page's agent.
///
/// Per-request lifecycle: resolve the active tab, build the activation
/// command, forward it. When no agent listener is registered the
/// coordinator injects one, waits `inject_delay` for it to register, and
/// retries exactly once. Injection is serialized per tab so rapid repeated
/// requests cannot double-inject.
pub struct Coordinator {
    tabs: Arc<dyn TabQuery>,
    injector: Arc<dyn AgentInjector>,
    agents: Arc<AgentRegistry>,
    inject_delay: Duration,
    injection_locks: StdMutex<HashMap<TabId, Arc<Mutex<()>>>>,
}

impl Coordinator {
    pub fn new(
        tabs: Arc<dyn TabQuery>,
        injector: Arc<dyn AgentInjector>,
        agents: Arc<AgentRegistry>,
        inject_delay: Duration,
    ) -> Self {
        Self {
            tabs,
            injector,
            agents,
            inject_delay,
            injection_locks: StdMutex::new(HashMap::new()),
        }
    }

    pub fn agents(&self) -> &Arc<AgentRegistry> {
        &self.agents
    }

    /// Route a toolbar request. Always produces a terminal response;
    /// internal faults are converted at this boundary, never thrown across
    /// the message channel.
    pub async fn route(&self, request: ToolRequest) -> ToolResponse {
        match self.route_inner(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(request = request.name(), %e, "Route failed");
                ToolResponse::err(e.to_string())
            }
        }
    }

    async fn route_inner(&self, request: ToolRequest) -> pagemark_core::Result<ToolResponse> {
        // Resolved fresh every time; the active tab changes between actions.
        let tab = self
            .tabs
            .active_tab()
            .await
            .ok_or(PageMarkError::NoActivePage)?;

        if is_privileged(&tab.url) {
            return Err(PageMarkError::UnsupportedOrigin(tab.url));
        }

        let command = activation_command(request);
        debug!(tab = %tab.id, command = command.kind(), "Forwarding to page agent");

        let first_failure = match self.forward(tab.id, command.clone()).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };

        // Recovery: inject a fresh agent and retry exactly once. The per-tab
        // lock keeps concurrent requests from double-injecting; a request
        // that loses the race finds the agent already registered.
        info!(tab = %tab.id, %first_failure, "No agent listener, injecting and retrying");
        let lock = self.injection_lock(tab.id);
        let _guard = lock.lock().await;

        if self.agents.get(tab.id).await.is_none() {
            self.injector.inject(&tab).await.map_err(|e| {
                PageMarkError::AgentUnreachable(format!("injection failed: {e}"))
            })?;
            tokio::time::sleep(self.inject_delay).await;
        }

        self.forward(tab.id, command).await.map_err(|retry_failure| {
            PageMarkError::AgentUnreachable(format!("{first_failure}; retry: {retry_failure}"))
        })
    }

    /// Forward a command to the tab's registered agent. Fails when no
    /// listener is registered or the agent tore down mid-flight.
    async fn forward(
        &self,
        tab: TabId,
        command: AgentCommand,
    ) -> pagemark_core::Result<ToolResponse> {
        let handle = self.agents.get(tab).await.ok_or_else(|| {
            PageMarkError::AgentUnreachable(format!("no listener registered for tab {tab}"))
        })?;

        match handle.send(command).await {
            Ok(response) => Ok(response),
            Err(e) => {
                // The mailbox closed under us; drop the stale registration.
                self.agents.unregister(tab).await;
                Err(e)
            }
        }
    }

    fn injection_lock(&self, tab: TabId) -> Arc<Mutex<()>> {
        let mut locks = self
            .injection_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(tab).or_default().clone()
    }
}

/// Consume lifecycle signals from page agents. `CONTENT_SCRIPT_LOADED`
/// requires no reply; it is logged for diagnostics.
pub fn start_signal_listener(
    mut rx: mpsc::UnboundedReceiver<AgentSignal>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(signal) = rx.recv().await {
            match signal {
                AgentSignal::ContentScriptLoaded { tab_id } => {
                    info!(tab_id = ?tab_id, "Content script loaded");
                }
            }
        }
        debug!("Signal listener stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use pagemark_agent::{NullClipboard, PageAgent};

    use crate::injector::SpawnInjector;
    use crate::tabs::{InMemoryTabs, TabInfo};

    fn page_tab() -> TabInfo {
        TabInfo {
            id: TabId(1),
            url: "https://example.com".into(),
            title: None,
        }
    }

    fn short_delay() -> Duration {
        Duration::from_millis(5)
    }

    /// Injector that counts calls and optionally registers a real agent.
    struct CountingInjector {
        registry: Option<Arc<AgentRegistry>>,
        calls: AtomicUsize,
    }

    impl CountingInjector {
        fn registering(registry: Arc<AgentRegistry>) -> Arc<Self> {
            Arc::new(Self {
                registry: Some(registry),
                calls: AtomicUsize::new(0),
            })
        }

        fn broken() -> Arc<Self> {
            Arc::new(Self {
                registry: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AgentInjector for CountingInjector {
        async fn inject(&self, tab: &TabInfo) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(registry) = &self.registry {
                let (signal_tx, _signal_rx) = mpsc::unbounded_channel();
                let handle =
                    PageAgent::spawn(Some(tab.id.0), Arc::new(NullClipboard), signal_tx);
                registry.register(tab.id, handle).await;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_no_active_page() {
        let agents = Arc::new(AgentRegistry::new());
        let coordinator = Coordinator::new(
            Arc::new(InMemoryTabs::new()),
            CountingInjector::broken(),
            agents,
            short_delay(),
        );

        let response = coordinator.route(ToolRequest::Rectangle).await;
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("no active page"));
    }

    #[tokio::test]
    async fn test_privileged_origin_rejected_without_injection() {
        let agents = Arc::new(AgentRegistry::new());
        let injector = CountingInjector::broken();
        let tabs = InMemoryTabs::with_active(TabInfo {
            id: TabId(9),
            url: "chrome://extensions".into(),
            title: None,
        });
        let coordinator =
            Coordinator::new(Arc::new(tabs), injector.clone(), agents, short_delay());

        let response = coordinator.route(ToolRequest::Pen).await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("unsupported origin"));
        assert_eq!(injector.calls(), 0);
    }

    #[tokio::test]
    async fn test_registered_agent_response_returned_unchanged() {
        let agents = Arc::new(AgentRegistry::new());
        let (signal_tx, _signal_rx) = mpsc::unbounded_channel();
        let handle = PageAgent::spawn(Some(1), Arc::new(NullClipboard), signal_tx);
        agents.register(TabId(1), handle).await;

        let injector = CountingInjector::broken();
        let coordinator = Coordinator::new(
            Arc::new(InMemoryTabs::with_active(page_tab())),
            injector.clone(),
            agents,
            short_delay(),
        );

        let response = coordinator.route(ToolRequest::Rectangle).await;
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("rectangle enabled"));
        assert_eq!(injector.calls(), 0, "no recovery needed");
    }

    #[tokio::test]
    async fn test_missing_agent_injected_once_and_retried() {
        let agents = Arc::new(AgentRegistry::new());
        let injector = CountingInjector::registering(agents.clone());
        let coordinator = Coordinator::new(
            Arc::new(InMemoryTabs::with_active(page_tab())),
            injector.clone(),
            agents.clone(),
            short_delay(),
        );

        let response = coordinator.route(ToolRequest::Circle).await;
        assert!(response.success, "retry after injection should succeed");
        assert_eq!(injector.calls(), 1);
        assert_eq!(agents.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_retry_surfaces_agent_unreachable() {
        let agents = Arc::new(AgentRegistry::new());
        let injector = CountingInjector::broken();
        let coordinator = Coordinator::new(
            Arc::new(InMemoryTabs::with_active(page_tab())),
            injector.clone(),
            agents,
            short_delay(),
        );

        let response = coordinator.route(ToolRequest::Arrow).await;
        assert!(!response.success);
        let error = response.error.unwrap();
        assert!(error.contains("unreachable"), "got: {error}");
        assert_eq!(injector.calls(), 1, "exactly one re-injection, no more");
    }

    #[tokio::test]
    async fn test_concurrent_recovery_injects_once() {
        let agents = Arc::new(AgentRegistry::new());
        let injector = CountingInjector::registering(agents.clone());
        let coordinator = Arc::new(Coordinator::new(
            Arc::new(InMemoryTabs::with_active(page_tab())),
            injector.clone(),
            agents,
            Duration::from_millis(20),
        ));

        let mut tasks = Vec::new();
        for request in [ToolRequest::Rectangle, ToolRequest::Pen, ToolRequest::Text] {
            let coordinator = coordinator.clone();
            tasks.push(tokio::spawn(
                async move { coordinator.route(request).await },
            ));
        }

        for task in tasks {
            let response = task.await.unwrap();
            assert!(response.success, "got: {response:?}");
        }
        assert_eq!(injector.calls(), 1, "injection must be serialized per tab");
    }

    #[tokio::test]
    async fn test_spawn_injector_end_to_end() {
        let agents = Arc::new(AgentRegistry::new());
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let _listener = start_signal_listener(signal_rx);

        let injector = Arc::new(SpawnInjector::new(
            agents.clone(),
            Arc::new(NullClipboard),
            signal_tx,
        ));
        let coordinator = Coordinator::new(
            Arc::new(InMemoryTabs::with_active(page_tab())),
            injector,
            agents,
            short_delay(),
        );

        let response = coordinator.route(ToolRequest::Mosaic).await;
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("mosaic enabled"));

        // The injected agent stays registered for the next request.
        let response = coordinator.route(ToolRequest::Exit).await;
        assert!(response.success);
    }
}
