pub mod account;

pub use account::{Candidate, ReconciledAccount, SourceAccount, TargetProfile};
