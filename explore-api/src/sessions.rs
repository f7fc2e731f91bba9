use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};
use std::time::{Duration, Instant};

use explore_store::app_config::SessionConfig;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub idle_ttl: Duration,
    pub settled_ttl: Duration,
    pub max_per_owner: usize,
    pub max_sessions: usize,
}

impl From<&SessionConfig> for SessionLimits {
    fn from(config: &SessionConfig) -> Self {
        Self {
            idle_ttl: Duration::from_secs(config.idle_ttl_secs),
            settled_ttl: Duration::from_secs(config.settled_ttl_secs),
            max_per_owner: config.max_per_customer.max(1),
            max_sessions: config.max_sessions.max(1),
        }
    }
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

#[derive(Debug, Clone, Copy)]
struct Seen {
    at: Instant,
    /// Orders touches that land on the same instant.
    tick: u64,
}

/// A session plus the customer it belongs to. Ownership is checked without
/// the session lock, so a slow exchange never blocks lookups.
pub struct Owned<T> {
    owner: String,
    seen: StdMutex<Seen>,
    settled: AtomicBool,
    session: Mutex<T>,
}

impl<T> Owned<T> {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub async fn lock(&self) -> MutexGuard<'_, T> {
        self.session.lock().await
    }

    /// The session reached its end; it is kept only for `settled_ttl`.
    pub fn mark_settled(&self) {
        self.settled.store(true, Ordering::SeqCst);
    }

    fn seen(&self) -> StdMutexGuard<'_, Seen> {
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn expired(&self, now: Instant, limits: &SessionLimits) -> bool {
        let idle = now.saturating_duration_since(self.seen().at);
        idle >= limits.idle_ttl || (self.settled.load(Ordering::SeqCst) && idle >= limits.settled_ttl)
    }
}

/// Per-customer sessions keyed by id, bounded by idle time and by count.
pub struct SessionMap<T> {
    entries: RwLock<HashMap<Uuid, Arc<Owned<T>>>>,
    clock: AtomicU64,
    limits: SessionLimits,
}

impl<T> SessionMap<T> {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            limits,
        }
    }

    fn now(&self) -> Seen {
        Seen {
            at: Instant::now(),
            tick: self.clock.fetch_add(1, Ordering::SeqCst),
        }
    }

    /// Stores a new session. Expired entries go first; then, while the
    /// owner or the whole map is at its cap, the least recently used.
    pub async fn insert(&self, id: Uuid, owner: &str, session: T) -> Arc<Owned<T>> {
        let seen = self.now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.expired(seen.at, &self.limits));

        while entries.values().filter(|e| e.owner == owner).count() >= self.limits.max_per_owner {
            if !evict_stalest(&mut entries, |e| e.owner == owner) {
                break;
            }
        }
        while entries.len() >= self.limits.max_sessions {
            if !evict_stalest(&mut entries, |_| true) {
                break;
            }
        }

        let entry = Arc::new(Owned {
            owner: owner.to_string(),
            seen: StdMutex::new(seen),
            settled: AtomicBool::new(false),
            session: Mutex::new(session),
        });
        entries.insert(id, entry.clone());
        entry
    }

    /// `None` when the id is unknown, expired or belongs to someone else.
    pub async fn get(&self, id: Uuid, owner: &str) -> Option<Arc<Owned<T>>> {
        let entry = self.entries.read().await.get(&id).cloned()?;
        let now = self.now();
        if entry.owner != owner || entry.expired(now.at, &self.limits) {
            return None;
        }
        *entry.seen() = now;
        Some(entry)
    }

    /// Drops expired sessions and returns how many went.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.expired(now, &self.limits));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

fn evict_stalest<T>(
    entries: &mut HashMap<Uuid, Arc<Owned<T>>>,
    candidate: impl Fn(&Owned<T>) -> bool,
) -> bool {
    let stalest = entries
        .iter()
        .filter(|(_, entry)| candidate(entry))
        .min_by_key(|(_, entry)| entry.seen().tick)
        .map(|(id, _)| *id);
    match stalest {
        Some(id) => {
            tracing::debug!(session_id = %id, "evicting least recently used session");
            entries.remove(&id);
            true
        }
        None => false,
    }
}
