use smallvec::SmallVec;
use tokio::time::Instant;

use crate::policy::{AbandonReason, AllocationMode, HeldResources};
use crate::resources::{GATE_RESOURCE, ResourceKind};
use crate::task::{ClientState, ClientTask};

/// Collects the gate, then the rest of the mandatory set in one non-blocking pass.
///
/// A pass that misses any resource returns everything it took before the next
/// attempt, so a client never keeps a strict subset of the non-gate resources
/// while it is not running. Passes are retried after a backoff until the
/// deadline measured from arrival; then the gate is returned as well.
pub(super) async fn acquire(task: &mut ClientTask) -> Result<HeldResources, AbandonReason> {
    let context = task.context().clone();
    let request = *task.request();
    let config = &context.config;
    let mut held = HeldResources::new(request.id, context.observer.clone());

    task.set_state(ClientState::AcquiringGate);
    let deadline = request.deadline(config.gate_timeout);
    let Some(gate) = context.pools.get(GATE_RESOURCE).acquire_until(deadline).await else {
        log::debug!("Client {} did not get a {GATE_RESOURCE} in time", request.id);
        return Err(AbandonReason::Timeout);
    };
    held.push(gate);
    task.set_state(ClientState::HoldingGate);

    task.set_state(ClientState::AcquiringRest);
    let rest: SmallVec<[ResourceKind; 2]> = request
        .kind
        .requirements(AllocationMode::AllOrNothing)
        .map(|(resource, _)| resource)
        .filter(|resource| *resource != GATE_RESOURCE)
        .collect();

    let committed = held.len();
    let mut attempt = 0;
    while !rest.is_empty() {
        attempt += 1;
        let complete = rest
            .iter()
            .all(|resource| match context.pools.get(*resource).try_acquire() {
                Some(guard) => {
                    held.push(guard);
                    true
                }
                None => false,
            });
        if complete {
            break;
        }

        let released = held.rollback_to(committed);
        context
            .observer
            .on_rollback(request.id, attempt, released);
        if Instant::now() >= deadline {
            log::debug!(
                "Client {} gives up after {attempt} all-or-nothing attempt(s)",
                request.id
            );
            held.release();
            return Err(AbandonReason::Timeout);
        }
        tokio::time::sleep(config.backoff).await;
    }
    task.set_state(ClientState::HoldingAll);
    Ok(held)
}
