//! Matching a source user's follow graph against the target network.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::{ApiOutcome, SourceNetwork, TargetNetwork};
use crate::models::{Candidate, ReconciledAccount, SourceAccount};
use crate::parser::extract_handle;
use crate::services::pacing::Pacer;

pub const USERNAME_NOT_FOUND: &str = "Username not found!";

/// Confirmed accounts in following-list order plus the source-network errors
/// worth showing to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub accounts: Vec<ReconciledAccount>,
    pub errors: Vec<String>,
}

/// Keeps accounts advertising a handle, preferring the bio over the display name.
#[must_use]
pub fn find_candidates(following: Vec<SourceAccount>) -> Vec<Candidate> {
    following
        .into_iter()
        .filter_map(|account| {
            let handle = extract_handle(&account.description)
                .or_else(|| extract_handle(&account.name))?
                .to_string();
            Some(Candidate { account, handle })
        })
        .collect()
}

pub struct ReconciliationEngine {
    source: Arc<dyn SourceNetwork>,
    target: Arc<dyn TargetNetwork>,
    pacer: Arc<dyn Pacer>,
}

impl ReconciliationEngine {
    #[must_use]
    pub fn new(
        source: Arc<dyn SourceNetwork>,
        target: Arc<dyn TargetNetwork>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            source,
            target,
            pacer,
        }
    }

    /// Never fails: unresolvable users, API errors and unconfirmed handles all
    /// fold into the returned [`Reconciliation`].
    pub async fn reconcile(&self, username: &str) -> Reconciliation {
        let lookup = self.source.find_user_id(username).await;
        let Some(user_id) = lookup.value else {
            warn!(username, api_errors = ?lookup.errors, "Username not found");
            return Reconciliation {
                accounts: Vec::new(),
                errors: vec![USERNAME_NOT_FOUND.to_string()],
            };
        };
        debug!(username, user_id, "Found source user");

        let ApiOutcome { value, errors } = self.source.find_following(user_id).await;
        let Some(following) = value else {
            warn!(username, user_id, ?errors, "Following list unavailable");
            return Reconciliation {
                accounts: Vec::new(),
                errors,
            };
        };

        let following_count = following.len();
        let candidates = find_candidates(following);
        info!(
            username,
            following = following_count,
            candidates = candidates.len(),
            "Enriching candidates"
        );

        let mut accounts = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let outcome = self.target.find_account(&candidate.handle).await;
            self.pacer.pause().await;

            match outcome.value {
                Some(profile) => accounts.push(ReconciledAccount::new(candidate, profile)),
                None => {
                    metrics::counter!("handlefinder_enrichment_failures_total").increment(1);
                    debug!(
                        handle = %candidate.handle,
                        errors = ?outcome.errors,
                        "Dropping candidate without a target account"
                    );
                }
            }
        }

        info!(username, matched = accounts.len(), "Reconciliation finished");
        Reconciliation { accounts, errors }
    }
}
