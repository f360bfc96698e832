use std::time::Duration;

use fluxcore::client::{ClientId, ClientRequest};
use fluxcore::events::SimulationObserver;
use fluxcore::policy::AbandonReason;
use fluxcore::resources::{ResourceCounts, ResourceKind, ResourceSet};
use fluxcore::task::ClientState;

use crate::common::timeutils::format_millis;
use crate::config::Verbosity;

/// Tells the story of the run through the log.
pub struct NarrationObserver {
    verbosity: Verbosity,
}

impl NarrationObserver {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    #[inline]
    fn narrate(&self) -> bool {
        self.verbosity == Verbosity::Narrate
    }
}

impl SimulationObserver for NarrationObserver {
    fn on_client_arrived(&self, request: &ClientRequest) {
        if self.narrate() {
            log::info!("Client {} ({}) arrived", request.id, request.kind);
        }
    }

    fn on_state_changed(&self, client_id: ClientId, state: ClientState) {
        log::trace!("Client {client_id} is now {state:?}");
    }

    fn on_resource_acquired(&self, client_id: ClientId, resource: ResourceKind) {
        log::debug!("Client {client_id} took a {resource}");
    }

    fn on_resource_released(&self, client_id: ClientId, resource: ResourceKind) {
        log::debug!("Client {client_id} returned a {resource}");
    }

    fn on_rollback(&self, client_id: ClientId, attempt: u32, released: ResourceSet) {
        log::debug!("Client {client_id} backs off after attempt {attempt}, returned {released}");
    }

    fn on_near_deadlock(&self, client_id: ClientId, available: &ResourceCounts) {
        log::warn!(
            "Near deadlock when client {client_id} arrived: only {} compute slot(s), {} seat(s) and {} headset(s) are free",
            available.compute_slot,
            available.seat,
            available.headset
        );
    }

    fn on_client_served(&self, request: &ClientRequest, wait: Duration, resources: ResourceSet) {
        if self.narrate() {
            log::info!(
                "Client {} ({}) got {resources} after waiting {} ms",
                request.id,
                request.kind,
                format_millis(wait)
            );
        }
    }

    fn on_client_abandoned(&self, request: &ClientRequest, reason: AbandonReason) {
        if self.narrate() {
            log::info!(
                "Client {} ({}) gave up: {reason}",
                request.id,
                request.kind
            );
        }
    }

    fn on_client_left(&self, request: &ClientRequest) {
        if self.narrate() {
            log::info!("Client {} released its resources and left", request.id);
        }
    }
}
