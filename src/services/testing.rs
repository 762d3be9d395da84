//! In-memory stand-ins for the network clients and the pacer.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::clients::{ApiOutcome, SourceNetwork, TargetNetwork};
use crate::models::{SourceAccount, TargetProfile};
use crate::services::pacing::Pacer;

#[derive(Default)]
pub struct FakeSource {
    pub user_id: Option<u64>,
    pub lookup_errors: Vec<String>,
    pub following: Option<Vec<SourceAccount>>,
    pub following_errors: Vec<String>,
    pub lookup_calls: AtomicUsize,
    pub following_calls: AtomicUsize,
}

#[async_trait]
impl SourceNetwork for FakeSource {
    async fn find_user_id(&self, _username: &str) -> ApiOutcome<u64> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        ApiOutcome {
            value: self.user_id,
            errors: self.lookup_errors.clone(),
        }
    }

    async fn find_following(&self, _user_id: u64) -> ApiOutcome<Vec<SourceAccount>> {
        self.following_calls.fetch_add(1, Ordering::SeqCst);
        ApiOutcome {
            value: self.following.clone(),
            errors: self.following_errors.clone(),
        }
    }
}

#[derive(Default)]
pub struct FakeTarget {
    pub profiles: HashMap<String, TargetProfile>,
    pub lookups: Mutex<Vec<String>>,
}

#[async_trait]
impl TargetNetwork for FakeTarget {
    async fn find_account(&self, handle: &str) -> ApiOutcome<TargetProfile> {
        self.lookups.lock().unwrap().push(handle.to_string());
        self.profiles.get(handle).cloned().map_or_else(
            || ApiOutcome::rejected(vec!["Not found".to_string()]),
            ApiOutcome::found,
        )
    }
}

#[derive(Default)]
pub struct CountingPacer(pub AtomicUsize);

#[async_trait]
impl Pacer for CountingPacer {
    async fn pause(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn account(username: &str, name: &str, description: &str) -> SourceAccount {
    SourceAccount {
        username: username.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    }
}

pub fn profile(display_name: &str, note: &str) -> TargetProfile {
    TargetProfile {
        display_name: display_name.to_string(),
        note: note.to_string(),
    }
}
