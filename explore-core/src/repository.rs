use async_trait::async_trait;

/// An entity held in a repository collection, keyed by a numeric id.
pub trait Record: Clone + Send + Sync + 'static {
    /// Partial update merged shallowly by [`Record::apply`].
    type Patch: Send + 'static;

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    fn apply(&mut self, patch: Self::Patch);
}

/// CRUD access over one in-memory collection.
///
/// Reads always return owned snapshots; callers can mutate them freely
/// without touching the stored state.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Snapshot of the whole collection, newest first.
    async fn list(&self) -> Vec<T>;

    async fn get(&self, id: u64) -> Option<T>;

    /// Assigns a fresh id, prepends the record and returns the stored copy.
    async fn add(&self, record: T) -> T;

    /// Merges `patch` into the record; `None` when the id is unknown.
    async fn update(&self, id: u64, patch: T::Patch) -> Option<T>;

    async fn delete(&self, id: u64) -> bool;
}
