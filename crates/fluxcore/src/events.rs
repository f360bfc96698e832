use std::time::Duration;

use crate::client::{ClientId, ClientRequest};
use crate::policy::AbandonReason;
use crate::resources::{ResourceCounts, ResourceKind, ResourceSet};
use crate::task::ClientState;

/// Receives lifecycle notifications from client tasks.
///
/// Methods are called from many tasks concurrently, in the order in which each
/// task performs the corresponding step. All methods default to no-ops.
pub trait SimulationObserver: Send + Sync {
    fn on_client_arrived(&self, _request: &ClientRequest) {}

    fn on_state_changed(&self, _client_id: ClientId, _state: ClientState) {}

    fn on_resource_acquired(&self, _client_id: ClientId, _resource: ResourceKind) {}

    fn on_resource_released(&self, _client_id: ClientId, _resource: ResourceKind) {}

    /// An all-or-nothing pass failed and the resources taken in it were returned.
    fn on_rollback(&self, _client_id: ClientId, _attempt: u32, _released: ResourceSet) {}

    fn on_near_deadlock(&self, _client_id: ClientId, _available: &ResourceCounts) {}

    /// The client holds everything it needs and starts using it.
    fn on_client_served(&self, _request: &ClientRequest, _wait: Duration, _resources: ResourceSet) {
    }

    fn on_client_abandoned(&self, _request: &ClientRequest, _reason: AbandonReason) {}

    /// The client released its resources and left.
    fn on_client_left(&self, _request: &ClientRequest) {}
}

#[derive(Default)]
pub struct NoopObserver;

impl SimulationObserver for NoopObserver {}
