use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tokio::time::Instant;

use crate::policy::AllocationMode;
use crate::resources::ResourceKind;

/// Identifier of a client, unique within one run.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ClientId(u32);

impl ClientId {
    #[inline]
    pub fn new(value: u32) -> Self {
        Self(value)
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientKind {
    Gamer,
    Freelancer,
    Student,
}

/// How strongly a client kind needs a resource.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Need {
    Mandatory,
    /// Attempted once without waiting; the client is served without it.
    Optional,
}

impl ClientKind {
    pub const ALL: [ClientKind; 3] = [ClientKind::Gamer, ClientKind::Freelancer, ClientKind::Student];

    /// What this client kind needs of `resource` under the given allocation mode,
    /// `None` when it does not use the resource at all.
    ///
    /// The two modes do not share requirements. Under [`AllocationMode::Ordered`]
    /// a gamer's seat and a freelancer's headset are optional, while under
    /// [`AllocationMode::AllOrNothing`] they are part of the mandatory set.
    /// Both modes model the same client kinds, not the same demands.
    pub fn need(self, resource: ResourceKind, mode: AllocationMode) -> Option<Need> {
        let extra = match mode {
            AllocationMode::Ordered => Need::Optional,
            AllocationMode::AllOrNothing => Need::Mandatory,
        };
        match (self, resource) {
            (_, ResourceKind::ComputeSlot) => Some(Need::Mandatory),
            (ClientKind::Gamer, ResourceKind::Headset) => Some(Need::Mandatory),
            (ClientKind::Gamer, ResourceKind::Seat) => Some(extra),
            (ClientKind::Freelancer, ResourceKind::Seat) => Some(Need::Mandatory),
            (ClientKind::Freelancer, ResourceKind::Headset) => Some(extra),
            (ClientKind::Student, _) => None,
        }
    }

    /// Requirements in the global acquisition order.
    pub fn requirements(self, mode: AllocationMode) -> impl Iterator<Item = (ResourceKind, Need)> {
        ResourceKind::ACQUISITION_ORDER
            .into_iter()
            .filter_map(move |resource| self.need(resource, mode).map(|need| (resource, need)))
    }

    pub fn name(self) -> &'static str {
        match self {
            ClientKind::Gamer => "gamer",
            ClientKind::Freelancer => "freelancer",
            ClientKind::Student => "student",
        }
    }
}

impl Display for ClientKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Distribution<ClientKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ClientKind {
        ClientKind::ALL[rng.random_range(0..ClientKind::ALL.len())]
    }
}

/// Roughly 30 years, the same horizon tokio uses for timers that never fire.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// A single arrival at the café.
#[derive(Copy, Clone, Debug)]
pub struct ClientRequest {
    pub id: ClientId,
    pub kind: ClientKind,
    pub arrival: Instant,
}

impl ClientRequest {
    pub fn new(id: ClientId, kind: ClientKind, arrival: Instant) -> Self {
        ClientRequest { id, kind, arrival }
    }

    /// Moment after which the client gives up.
    ///
    /// A patience too long to be represented means the client never gives up.
    #[inline]
    pub fn deadline(&self, patience: Duration) -> Instant {
        self.arrival
            .checked_add(patience)
            .unwrap_or_else(|| self.arrival + FAR_FUTURE)
    }

    /// Time elapsed since arrival.
    #[inline]
    pub fn waited(&self) -> Duration {
        Instant::now().saturating_duration_since(self.arrival)
    }
}
