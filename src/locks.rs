use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::run::Discipline;

pub type LeaderboardKey = (i64, Discipline);

/// Registry of per-(map, discipline) serialization locks. Submissions for
/// different keys proceed in parallel; the registry itself is only held long
/// enough to hand out the key's lock.
#[derive(Default)]
pub struct LeaderboardLocks {
    inner: Mutex<HashMap<LeaderboardKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl LeaderboardLocks {
    pub fn for_key(&self, key: LeaderboardKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap();
        map.entry(key).or_default().clone()
    }
}
