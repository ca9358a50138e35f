//! Validation checks.
//!
//! Three rule classes, applied in this order by the orchestrator:
//!
//! - [`ordering`]: registry keys must be lexicographically sorted (fatal)
//! - [`blocklist`]: keys must not match reserved-name expressions (fatal)
//! - [`reachability`]: target hosts must answer over HTTP(S) (warnings)

pub mod blocklist;
pub mod ordering;
pub mod reachability;
