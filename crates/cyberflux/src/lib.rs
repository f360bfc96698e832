pub mod arrival;
pub mod common;
pub mod config;
pub mod narration;
pub mod output;

pub type Error = crate::common::error::CyberfluxError;
pub type Result<T> = std::result::Result<T, Error>;

// Reexports
pub use fluxcore;

pub const CYBERFLUX_VERSION: &str = env!("CARGO_PKG_VERSION");
