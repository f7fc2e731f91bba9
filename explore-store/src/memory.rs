use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use explore_core::{Record, Repository};
use tokio::sync::RwLock;

/// Largest id a caller may supply. Anything above it would leave the
/// counter no room to allocate.
pub const MAX_RECORD_ID: u64 = i64::MAX as u64;

/// In-memory collection backing one entity type.
///
/// Ids come from a monotonic counter that starts one above the largest
/// seeded id, so two inserts never share an id even within the same
/// millisecond.
pub struct Collection<T: Record> {
    items: RwLock<Vec<T>>,
    next_id: AtomicU64,
}

impl<T: Record> Collection<T> {
    pub fn seeded(items: Vec<T>) -> Self {
        let highest = items.iter().map(Record::id).max().unwrap_or(0);
        Self {
            items: RwLock::new(items),
            next_id: AtomicU64::new(highest.saturating_add(1)),
        }
    }

    pub fn empty() -> Self {
        Self::seeded(Vec::new())
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub async fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.items.read().await.iter().find(|item| predicate(item)).cloned()
    }

    pub async fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.items
            .read()
            .await
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    pub async fn any(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.items.read().await.iter().any(predicate)
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Adds to the end instead of the front. Signups are kept in join order.
    pub async fn append(&self, mut record: T) -> T {
        record.set_id(self.allocate_id());
        self.items.write().await.push(record.clone());
        record
    }

    /// Swaps the whole collection. Records carrying id 0 get a fresh id;
    /// any other id is kept as given.
    pub async fn replace_all(&self, records: Vec<T>) -> Vec<T> {
        let highest = records.iter().map(Record::id).max().unwrap_or(0);
        self.next_id.fetch_max(highest.saturating_add(1), Ordering::SeqCst);

        let records: Vec<T> = records
            .into_iter()
            .map(|mut record| {
                if record.id() == 0 {
                    record.set_id(self.allocate_id());
                }
                record
            })
            .collect();
        *self.items.write().await = records.clone();
        records
    }
}

#[async_trait]
impl<T: Record> Repository<T> for Collection<T> {
    async fn list(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    async fn get(&self, id: u64) -> Option<T> {
        self.find(|item| item.id() == id).await
    }

    async fn add(&self, mut record: T) -> T {
        record.set_id(self.allocate_id());
        self.items.write().await.insert(0, record.clone());
        record
    }

    async fn update(&self, id: u64, patch: T::Patch) -> Option<T> {
        let mut items = self.items.write().await;
        let item = items.iter_mut().find(|item| item.id() == id)?;
        item.apply(patch);
        Some(item.clone())
    }

    async fn delete(&self, id: u64) -> bool {
        let mut items = self.items.write().await;
        match items.iter().position(|item| item.id() == id) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        }
    }
}
