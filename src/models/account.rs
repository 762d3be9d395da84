use serde::{Deserialize, Serialize};

/// A followed account as reported by the source network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAccount {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// The first target-network account matching a handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub note: String,
}

/// A followed account that advertises a target-network handle, not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub account: SourceAccount,
    pub handle: String,
}

/// A followed account whose target-network handle was confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledAccount {
    pub source_username: String,
    pub source_name: String,
    pub source_description: String,
    pub target_handle: String,
    pub target_name: String,
    pub target_description: String,
}

impl ReconciledAccount {
    #[must_use]
    pub fn new(candidate: Candidate, target: TargetProfile) -> Self {
        let Candidate { account, handle } = candidate;
        Self {
            source_username: account.username,
            source_name: account.name,
            source_description: account.description,
            target_handle: handle,
            target_name: target.display_name,
            target_description: target.note,
        }
    }
}
