use derive_builder::Builder;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::client::{ClientId, ClientKind, ClientRequest};
use crate::config::{PoolCapacities, SimulationConfig};
use crate::events::SimulationObserver;
use crate::policy::{AbandonReason, AllocationMode};
use crate::resources::{ResourceCounts, ResourceKind, ResourceSet};
use crate::simulation::{Simulation, SimulationSummary};
use crate::task::ClientState;

pub use TestConfigBuilder as ConfigBuilder;

#[derive(Builder, Clone)]
#[builder(pattern = "owned", derive(Clone))]
pub struct TestConfig {
    #[builder(default)]
    mode: AllocationMode,
    #[builder(default = "PoolCapacities::uniform(1)")]
    capacities: PoolCapacities,
    #[builder(default = "Duration::from_millis(1500)")]
    gate_timeout: Duration,
    #[builder(default = "Duration::from_millis(50)")]
    backoff: Duration,
    #[builder(default)]
    near_deadlock_alerts: bool,
}

impl TestConfigBuilder {
    pub fn ordered() -> Self {
        Self::default().mode(AllocationMode::Ordered)
    }

    pub fn all_or_nothing() -> Self {
        Self::default().mode(AllocationMode::AllOrNothing)
    }

    pub fn finish(self) -> SimulationConfig {
        let TestConfig {
            mode,
            capacities,
            gate_timeout,
            backoff,
            near_deadlock_alerts,
        } = self.build().unwrap();
        SimulationConfig {
            mode,
            capacities,
            gate_timeout,
            backoff,
            near_deadlock_alerts,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Arrived(ClientId),
    State(ClientId, ClientState),
    Acquired(ClientId, ResourceKind),
    Released(ClientId, ResourceKind),
    Rollback(ClientId, u32, ResourceSet),
    NearDeadlock(ClientId, ResourceCounts),
    Served(ClientId, Duration, ResourceSet),
    Abandoned(ClientId, AbandonReason),
    Left(ClientId),
}

impl Event {
    pub fn client_id(&self) -> ClientId {
        match self {
            Event::Arrived(id)
            | Event::State(id, _)
            | Event::Acquired(id, _)
            | Event::Released(id, _)
            | Event::Rollback(id, _, _)
            | Event::NearDeadlock(id, _)
            | Event::Served(id, _, _)
            | Event::Abandoned(id, _)
            | Event::Left(id) => *id,
        }
    }
}

/// Observer that keeps every notification together with the time it was made.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<(Instant, Event)>>,
}

impl RecordingObserver {
    fn push(&self, event: Event) {
        self.events.lock().unwrap().push((Instant::now(), event));
    }

    pub fn events(&self) -> Vec<(Instant, Event)> {
        self.events.lock().unwrap().clone()
    }

    pub fn client_events(&self, client_id: ClientId) -> Vec<(Instant, Event)> {
        self.events()
            .into_iter()
            .filter(|(_, e)| e.client_id() == client_id)
            .collect()
    }

    pub fn acquired(&self, client_id: ClientId) -> Vec<ResourceKind> {
        self.client_events(client_id)
            .into_iter()
            .filter_map(|(_, e)| match e {
                Event::Acquired(_, kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    pub fn released(&self, client_id: ClientId) -> Vec<ResourceKind> {
        self.client_events(client_id)
            .into_iter()
            .filter_map(|(_, e)| match e {
                Event::Released(_, kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    pub fn states(&self, client_id: ClientId) -> Vec<ClientState> {
        self.client_events(client_id)
            .into_iter()
            .filter_map(|(_, e)| match e {
                Event::State(_, state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn served(&self, client_id: ClientId) -> Option<(Duration, ResourceSet)> {
        self.client_events(client_id)
            .into_iter()
            .find_map(|(_, e)| match e {
                Event::Served(_, wait, resources) => Some((wait, resources)),
                _ => None,
            })
    }

    pub fn time_of(&self, client_id: ClientId, predicate: impl Fn(&Event) -> bool) -> Option<Instant> {
        self.client_events(client_id)
            .into_iter()
            .find(|(_, e)| predicate(e))
            .map(|(t, _)| t)
    }

    pub fn rollbacks(&self, client_id: ClientId) -> Vec<ResourceSet> {
        self.client_events(client_id)
            .into_iter()
            .filter_map(|(_, e)| match e {
                Event::Rollback(_, _, released) => Some(released),
                _ => None,
            })
            .collect()
    }

    pub fn near_deadlock_alerts(&self) -> usize {
        self.events()
            .iter()
            .filter(|(_, e)| matches!(e, Event::NearDeadlock(..)))
            .count()
    }

    /// Every client released exactly what it acquired.
    pub fn check_balanced(&self, created: u64) {
        for id in 1..=created as u32 {
            let id = ClientId::new(id);
            let mut acquired = self.acquired(id);
            let mut released = self.released(id);
            acquired.sort();
            released.sort();
            assert_eq!(acquired, released, "Unbalanced resources of client {id}");
        }
    }

    /// Replays acquisitions and releases and checks that no pool ever hands out
    /// more units than it has.
    pub fn check_capacities(&self, capacities: &PoolCapacities) {
        let mut held = [0u32; 3];
        for (_, event) in self.events() {
            match event {
                Event::Acquired(id, kind) => {
                    held[kind.index()] += 1;
                    assert!(
                        held[kind.index()] <= capacities.get(kind),
                        "Pool {kind} overcommitted by client {id}"
                    );
                }
                Event::Released(_, kind) => {
                    assert!(held[kind.index()] > 0, "Pool {kind} released too often");
                    held[kind.index()] -= 1;
                }
                _ => {}
            }
        }
        assert_eq!(held, [0, 0, 0]);
    }
}

impl SimulationObserver for RecordingObserver {
    fn on_client_arrived(&self, request: &ClientRequest) {
        self.push(Event::Arrived(request.id));
    }

    fn on_state_changed(&self, client_id: ClientId, state: ClientState) {
        self.push(Event::State(client_id, state));
    }

    fn on_resource_acquired(&self, client_id: ClientId, resource: ResourceKind) {
        self.push(Event::Acquired(client_id, resource));
    }

    fn on_resource_released(&self, client_id: ClientId, resource: ResourceKind) {
        self.push(Event::Released(client_id, resource));
    }

    fn on_rollback(&self, client_id: ClientId, attempt: u32, released: ResourceSet) {
        self.push(Event::Rollback(client_id, attempt, released));
    }

    fn on_near_deadlock(&self, client_id: ClientId, available: &ResourceCounts) {
        self.push(Event::NearDeadlock(client_id, *available));
    }

    fn on_client_served(&self, request: &ClientRequest, wait: Duration, resources: ResourceSet) {
        self.push(Event::Served(request.id, wait, resources));
    }

    fn on_client_abandoned(&self, request: &ClientRequest, reason: AbandonReason) {
        self.push(Event::Abandoned(request.id, reason));
    }

    fn on_client_left(&self, request: &ClientRequest) {
        self.push(Event::Left(request.id));
    }
}

pub fn create_simulation(config: SimulationConfig) -> (Simulation, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let simulation = Simulation::new(config, observer.clone()).unwrap();
    (simulation, observer)
}

/// Waits for all clients, failing the test instead of hanging on a deadlock.
pub async fn finish(simulation: Simulation) -> SimulationSummary {
    tokio::time::timeout(Duration::from_secs(600), simulation.finish())
        .await
        .expect("Simulation did not finish, clients are deadlocked")
}

/// Spawns all clients at once and waits until they leave.
pub async fn run_clients(
    config: SimulationConfig,
    clients: &[(ClientKind, Duration)],
) -> (SimulationSummary, Arc<RecordingObserver>) {
    let (mut simulation, observer) = create_simulation(config);
    for (kind, service_time) in clients {
        simulation.spawn_client(*kind, *service_time);
    }
    (finish(simulation).await, observer)
}

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

pub fn set(kinds: &[ResourceKind]) -> ResourceSet {
    kinds.iter().copied().collect()
}
