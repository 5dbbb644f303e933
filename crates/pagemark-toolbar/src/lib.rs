//! Toolbar UI — the fixed list of annotation tools.
//!
//! Item activation maps a tool name to its request through a fixed lookup,
//! dispatches it to the coordinator, and surfaces the terminal response.
//! Unknown names are rejected locally and never dispatched. A per-item
//! loading token blocks duplicate dispatch while a request is in flight,
//! and is cleared on every exit path.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use pagemark_coordinator::Coordinator;
use pagemark_core::protocol::{ToolRequest, ToolResponse};
use pagemark_core::types::{icon_size, ToolDescriptor, TOOLBAR};

/// Outcome of a toolbar item activation.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// The request completed; surface this response to the user.
    Completed(ToolResponse),
    /// A request for this item is still in flight; nothing was dispatched.
    AlreadyPending,
    /// The name matches no toolbar item; nothing was dispatched.
    UnknownTool,
}

/// Clears the loading token when dropped, so no code path can leave an
/// item stuck in a loading state.
struct PendingGuard {
    pending: Arc<Mutex<HashSet<u32>>>,
    id: u32,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.id);
    }
}

pub struct Toolbar {
    coordinator: Arc<Coordinator>,
    pending: Arc<Mutex<HashSet<u32>>>,
}

impl Toolbar {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self {
            coordinator,
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// The toolbar's items, in display order.
    pub fn items(&self) -> &'static [ToolDescriptor] {
        &TOOLBAR
    }

    /// Icon display size for an item.
    pub fn item_icon_size(&self, id: u32) -> (u32, u32) {
        icon_size(id)
    }

    /// Activate a toolbar item by name.
    pub async fn activate(&self, name: &str) -> Activation {
        let Some(item) = TOOLBAR.iter().find(|d| d.name == name) else {
            warn!(name, "Unknown toolbar item, not dispatching");
            return Activation::UnknownTool;
        };
        let Some(request) = ToolRequest::from_name(item.name) else {
            warn!(name, "Toolbar item has no request mapping, not dispatching");
            return Activation::UnknownTool;
        };

        let Some(_guard) = self.begin(item.id) else {
            debug!(name, "Request already in flight, not dispatching");
            return Activation::AlreadyPending;
        };

        let response = self.coordinator.route(request).await;
        match &response.error {
            None => info!(name, message = ?response.message, "Tool activated"),
            Some(error) => warn!(name, error, "Tool activation failed"),
        }

        Activation::Completed(response)
    }

    /// Claim the loading token for an item. `None` while a prior request
    /// for the same item is still pending.
    fn begin(&self, id: u32) -> Option<PendingGuard> {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !pending.insert(id) {
            return None;
        }
        Some(PendingGuard {
            pending: self.pending.clone(),
            id,
        })
    }
}
