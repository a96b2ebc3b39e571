//! Provider calls bounded by timeouts, completed into engine inputs.

pub mod fundamentals;

pub use fundamentals::{FundamentalsError, FundamentalsService};
