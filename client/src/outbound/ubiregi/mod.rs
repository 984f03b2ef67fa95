//! Ubiregi outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `UbiAgent` port.

mod dto;
mod http_agent;

pub use http_agent::{
    AUTH_TOKEN_HEADER, DEFAULT_BASE_URL, UbiAgentConfig, UbiHttpAgent, UbiHttpAgentBuildError,
};
