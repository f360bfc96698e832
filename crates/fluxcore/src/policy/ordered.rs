use crate::client::Need;
use crate::policy::{AbandonReason, AllocationMode, HeldResources};
use crate::resources::GATE_RESOURCE;
use crate::task::{ClientState, ClientTask};

/// Collects resources in the global acquisition order.
///
/// Only the gate is awaited with a deadline. Once the gate is held, mandatory
/// resources are awaited without a limit and optional ones are taken only if
/// they are free right now. Waiting always happens in the global order, so two
/// clients can never wait on each other in a cycle.
pub(super) async fn acquire(task: &mut ClientTask) -> Result<HeldResources, AbandonReason> {
    let context = task.context().clone();
    let request = *task.request();
    let mut held = HeldResources::new(request.id, context.observer.clone());

    task.set_state(ClientState::AcquiringGate);
    let deadline = request.deadline(context.config.gate_timeout);
    let Some(gate) = context.pools.get(GATE_RESOURCE).acquire_until(deadline).await else {
        log::debug!("Client {} did not get a {GATE_RESOURCE} in time", request.id);
        return Err(AbandonReason::Timeout);
    };
    held.push(gate);
    task.set_state(ClientState::HoldingGate);

    task.set_state(ClientState::AcquiringRest);
    for (resource, need) in request
        .kind
        .requirements(AllocationMode::Ordered)
        .filter(|(resource, _)| *resource != GATE_RESOURCE)
    {
        let pool = context.pools.get(resource);
        match need {
            Need::Mandatory => held.push(pool.acquire().await),
            Need::Optional => match pool.try_acquire() {
                Some(guard) => held.push(guard),
                None => log::debug!(
                    "Client {} goes without an optional {resource}",
                    request.id
                ),
            },
        }
    }
    task.set_state(ClientState::HoldingAll);
    Ok(held)
}
