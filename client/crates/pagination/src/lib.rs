//! Pagination primitives shared by collection clients.
//!
//! Collection endpoints hand back a continuation URL while more pages remain
//! and omit it at end-of-stream. This crate owns the two pieces every caller
//! following such a stream needs:
//!
//! - [`ContinuationUrl`]: a validated, opaque pointer to the next page that is
//!   followed verbatim rather than rebuilt from filter state, and only ever
//!   resolved onto the base URL's own origin.
//! - [`PageBudget`] and [`PageTracker`]: an upper bound on how many pages (and
//!   how much wall-clock time) one pagination loop may consume, so a server
//!   that never stops returning continuation URLs cannot spin the loop forever.

mod budget;
mod continuation;

pub use budget::{PageBudget, PageBudgetExceeded, PageTracker};
pub use continuation::{ContinuationUrl, ContinuationUrlError};
