
pub(crate) mod error;
pub mod id_counter;

pub use id_counter::IdCounter;
