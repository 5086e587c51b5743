use crate::errors::RepoError;
use crate::models::{CreateMeme, MemeRecord, UpdateMeme};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait defining operations for storing and retrieving meme records.
///
/// The handler layer depends only on this trait, never on a concrete
/// store; implementations exist for an in-memory vector and for DynamoDB.
#[async_trait]
pub trait MemeRepository: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Lists all records, most recent (year, month) bucket first, ties
    /// broken by most recent `created_at`.
    /// WARNING: full scan; fine at encyclopedia scale, no pagination.
    async fn list_all(&self) -> Result<Vec<MemeRecord>, RepoError>;

    /// Retrieves a record by its unique ID.
    /// Returns Ok(None) if the record is not found.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<MemeRecord>, RepoError>;

    /// Creates a record from a draft, assigning a fresh ID and filling
    /// defaults. Title validation is the caller's responsibility.
    async fn create(&self, draft: CreateMeme) -> Result<MemeRecord, RepoError>;

    /// Merges `update` over the stored record and appends one edit
    /// history entry. Returns Ok(None) if the ID is unknown.
    async fn update(&self, id: Uuid, update: UpdateMeme)
        -> Result<Option<MemeRecord>, RepoError>;

    /// Permanently removes a record. Returns Ok(false) if the ID is
    /// unknown; removal leaves no tombstone.
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;

    /// Case-insensitive substring search over title, description, and
    /// tags, ordered like `list_all`. Empty-query rejection happens at
    /// the handler boundary, not here.
    async fn search(&self, query: &str) -> Result<Vec<MemeRecord>, RepoError>;
}
