//! Process-wide TTL caches for users and lookup tables. Entries expire on
//! read; mutation endpoints invalidate explicitly.

use crate::documents::{Lookup, User};
use dashmap::DashMap;
use owlcap_utils::unix_time::unix_now;

const USER_TTL_SECS: u64 = 60;
const LOOKUP_TTL_SECS: u64 = 300;

struct Cached<T> {
    fetched: u64,
    value: T,
}

/// TTL cache for user documents, keyed by user id.
#[derive(Default)]
pub struct UserCache {
    entries: DashMap<String, Cached<User>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<User> {
        let now = unix_now().unwrap_or(0);
        if let Some(entry) = self.entries.get(user_id) {
            if now - entry.fetched < USER_TTL_SECS {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove(user_id);
        None
    }

    pub fn put(&self, user: User) {
        let now = unix_now().unwrap_or(0);
        self.entries.insert(
            user.user_id.clone(),
            Cached {
                fetched: now,
                value: user,
            },
        );
    }

    pub fn invalidate(&self, user_id: &str) {
        self.entries.remove(user_id);
    }
}

/// TTL cache for lookup tables, keyed by name.
#[derive(Default)]
pub struct LookupCache {
    entries: DashMap<String, Cached<Lookup>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Lookup> {
        let now = unix_now().unwrap_or(0);
        if let Some(entry) = self.entries.get(name) {
            if now - entry.fetched < LOOKUP_TTL_SECS {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove(name);
        None
    }

    pub fn put(&self, lookup: Lookup) {
        let now = unix_now().unwrap_or(0);
        self.entries.insert(
            lookup.name.clone(),
            Cached {
                fetched: now,
                value: lookup,
            },
        );
    }

    pub fn invalidate(&self, name: &str) {
        self.entries.remove(name);
    }
}
