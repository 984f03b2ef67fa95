//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod checkout_command;
mod checkout_query;
mod ubi_agent;

#[cfg(test)]
pub use checkout_command::MockCheckoutCommand;
pub use checkout_command::CheckoutCommand;
#[cfg(test)]
pub use checkout_query::MockCheckoutQuery;
pub use checkout_query::CheckoutQuery;
#[cfg(test)]
pub use ubi_agent::MockUbiAgent;
pub use ubi_agent::{
    CHECKOUTS_PATH, CURRENT_ACCOUNT_PATH, SearchTarget, UbiAgent, UbiAgentError, checkout_path,
};
