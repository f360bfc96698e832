use std::sync::Arc;
use std::time::Duration;

use crate::client::ClientRequest;
use crate::config::NEAR_EXHAUSTION_THRESHOLD;
use crate::policy::{self, AllocationOutcome};
use crate::simulation::SimulationContext;

/// Lifecycle of a client task.
///
/// ```text
/// Arrived -> AcquiringGate -> HoldingGate -> AcquiringRest -> HoldingAll
///                 |                              |               |
///                 v                              v               v
///             Abandoned                      Abandoned       InService -> Releasing -> Done
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClientState {
    Arrived,
    AcquiringGate,
    HoldingGate,
    AcquiringRest,
    HoldingAll,
    InService,
    Releasing,
    Done,
    Abandoned,
}

impl ClientState {
    pub fn can_advance_to(self, next: ClientState) -> bool {
        use ClientState::*;
        matches!(
            (self, next),
            (Arrived, AcquiringGate)
                | (AcquiringGate, HoldingGate)
                | (AcquiringGate, Abandoned)
                | (HoldingGate, AcquiringRest)
                | (AcquiringRest, HoldingAll)
                | (AcquiringRest, Abandoned)
                | (HoldingAll, InService)
                | (InService, Releasing)
                | (Releasing, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ClientState::Done | ClientState::Abandoned)
    }
}

/// One client of the café, from arrival until it leaves or gives up.
pub struct ClientTask {
    request: ClientRequest,
    service_time: Duration,
    state: ClientState,
    context: Arc<SimulationContext>,
}

impl ClientTask {
    pub fn new(
        request: ClientRequest,
        service_time: Duration,
        context: Arc<SimulationContext>,
    ) -> Self {
        ClientTask {
            request,
            service_time,
            state: ClientState::Arrived,
            context,
        }
    }

    #[inline]
    pub fn request(&self) -> &ClientRequest {
        &self.request
    }

    #[inline]
    pub(crate) fn context(&self) -> &Arc<SimulationContext> {
        &self.context
    }

    pub(crate) fn set_state(&mut self, state: ClientState) {
        debug_assert!(
            self.state.can_advance_to(state),
            "Invalid transition of client {}: {:?} -> {:?}",
            self.request.id,
            self.state,
            state
        );
        self.state = state;
        self.context
            .observer
            .on_state_changed(self.request.id, state);
    }

    pub async fn run(mut self) -> AllocationOutcome {
        let context = self.context.clone();
        let request = self.request;
        context.observer.on_client_arrived(&request);

        if context.config.near_deadlock_alerts
            && context.pools.is_near_exhaustion(NEAR_EXHAUSTION_THRESHOLD)
        {
            context
                .observer
                .on_near_deadlock(request.id, &context.pools.availability());
        }

        let held = match policy::acquire(context.config.mode, &mut self).await {
            Ok(held) => held,
            Err(reason) => {
                self.set_state(ClientState::Abandoned);
                context.stats.record_abandoned(request.kind);
                context.observer.on_client_abandoned(&request, reason);
                return AllocationOutcome::Abandoned { reason };
            }
        };

        let wait = request.waited();
        let resources = held.kinds();
        self.set_state(ClientState::InService);
        context
            .observer
            .on_client_served(&request, wait, resources);
        tokio::time::sleep(self.service_time).await;

        self.set_state(ClientState::Releasing);
        held.release();
        context.stats.record_served(wait, resources, request.kind);
        self.set_state(ClientState::Done);
        context.observer.on_client_left(&request);
        AllocationOutcome::Served { wait }
    }
}
