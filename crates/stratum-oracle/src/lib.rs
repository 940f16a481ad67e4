//! Stratum Oracle Layer
//!
//! Implementations of the `DecisionOracle` seam from `stratum-domain`.
//!
//! # Oracles and providers
//!
//! - [`LlmOracle`]: wraps any [`LlmProvider`](stratum_domain::traits::LlmProvider)
//!   with the curator instructions and the decision output contract
//! - [`MockProvider`]: deterministic provider with canned responses, error
//!   injection, artificial latency and call counting

#![warn(missing_docs)]

mod error;
pub mod instructions;
mod llm;
mod mock;

pub use error::OracleError;
pub use llm::LlmOracle;
pub use mock::{MockError, MockProvider};
