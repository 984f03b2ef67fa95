//! Outbound adapters implementing the [`crate::domain::ports::UbiAgent`] port.
//!
//! - **ubiregi**: reqwest-backed agent talking to the live Ubiregi API.
//! - **in_memory**: agent serving a fixed checkout list, for tests and demos.
//!
//! Adapters translate between wire and domain types and map transport
//! failures into `UbiAgentError` variants. Pagination and retry policy live
//! in the domain.

pub mod in_memory;
pub mod ubiregi;

pub use in_memory::{IN_MEMORY_CONTINUATION, InMemoryUbiAgent};
pub use ubiregi::{
    AUTH_TOKEN_HEADER, DEFAULT_BASE_URL, UbiAgentConfig, UbiHttpAgent, UbiHttpAgentBuildError,
};
