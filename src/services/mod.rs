pub mod pacing;
pub use pacing::{FixedDelay, NoDelay, Pacer};

pub mod reconcile;
pub use reconcile::{Reconciliation, ReconciliationEngine};

pub mod search;
pub use search::{SearchError, SearchOutcome, SearchService};

#[cfg(test)]
mod testing;
