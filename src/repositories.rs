use crate::{
    domain::MemeRepository,
    errors::RepoError,
    models::{CreateMeme, EditEntry, MemeRecord, UpdateMeme},
    query,
};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{Client as DynamoDbClient, types::AttributeValue};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{self, info};
use uuid::Uuid;

// --- In-memory store (primary configuration) ---

/// Lock-guarded vector with linear scan for every operation. All data is
/// lost on process restart.
#[derive(Debug, Default)]
pub struct InMemoryMemeRepository {
    records: RwLock<Vec<MemeRecord>>,
}

impl InMemoryMemeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemeRepository for InMemoryMemeRepository {
    async fn list_all(&self) -> Result<Vec<MemeRecord>, RepoError> {
        let mut records = self.records.read().await.clone();
        query::sort_chronological(&mut records);
        Ok(records)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<MemeRecord>, RepoError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, draft: CreateMeme) -> Result<MemeRecord, RepoError> {
        let record = draft.into_record(Uuid::new_v4(), Utc::now());
        self.records.write().await.push(record.clone());
        tracing::debug!(meme_id = %record.id, title = %record.title, "Memory: Record created");
        Ok(record)
    }

    async fn update(
        &self,
        id: Uuid,
        update: UpdateMeme,
    ) -> Result<Option<MemeRecord>, RepoError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                update.apply(record, Utc::now());
                tracing::debug!(meme_id = %id, "Memory: Record updated");
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut records = self.records.write().await;
        match records.iter().position(|r| r.id == id) {
            Some(index) => {
                let removed = records.remove(index);
                tracing::debug!(meme_id = %id, title = %removed.title, "Memory: Record deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn search(&self, search_query: &str) -> Result<Vec<MemeRecord>, RepoError> {
        let needle = search_query.to_lowercase();
        let mut matches: Vec<MemeRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| query::matches(r, &needle))
            .cloned()
            .collect();
        query::sort_chronological(&mut matches);
        Ok(matches)
    }
}

// --- DynamoDB store (persistent configuration) ---

#[derive(Debug, Clone)]
pub struct DynamoDbMemeRepository {
    client: DynamoDbClient,
    table_name: String, // Store the table name
}

impl DynamoDbMemeRepository {
    /// Creates a new repository instance configured for a specific table.
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        info!(%table_name, "Initializing DynamoDbMemeRepository");
        Self { client, table_name }
    }

    /// Scans the whole table, following pagination, without sorting.
    async fn scan_all(&self) -> Result<Vec<MemeRecord>, RepoError> {
        tracing::debug!("DynamoDB: Scanning table '{}' for all records", self.table_name);
        let mut records: Vec<MemeRecord> = Vec::new();
        let mut last_evaluated_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut request_builder = self.client.scan().table_name(&self.table_name);

            // Apply ExclusiveStartKey if paginating from previous response
            if let Some(lek) = last_evaluated_key {
                request_builder = request_builder.set_exclusive_start_key(Some(lek));
            }

            let resp = request_builder
                .send()
                .await
                .context(format!("DynamoDB: Failed to scan table '{}'", self.table_name))
                .map_err(RepoError::BackendError)?;

            if let Some(items) = resp.items {
                for item in items {
                    match item_to_record(&item) {
                        Some(record) => records.push(record),
                        None => {
                            let item_id = item.get("meme_id").and_then(|v| v.as_s().ok());
                            tracing::error!(item.id = ?item_id, table_name = %self.table_name, "DynamoDB: Failed to parse item from scan into MemeRecord");
                            // Fail fast if data in the table is corrupt
                            return Err(RepoError::DataCorruption(format!(
                                "DynamoDB: Failed to parse item {:?} during scan of table '{}'",
                                item_id, self.table_name
                            )));
                        }
                    }
                }
            }

            // Check for next page
            last_evaluated_key = resp.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break; // Exit loop if no more pages
            }
        }

        Ok(records)
    }

    async fn put_record(&self, record: &MemeRecord) -> Result<(), RepoError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)))
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to put record (id: {})",
                self.table_name, record.id
            ))
            .map_err(RepoError::BackendError)?;
        Ok(())
    }
}

#[async_trait]
impl MemeRepository for DynamoDbMemeRepository {
    async fn list_all(&self) -> Result<Vec<MemeRecord>, RepoError> {
        let mut records = self.scan_all().await?;
        query::sort_chronological(&mut records);
        tracing::info!("DynamoDB (table: {}): Successfully listed {} records", self.table_name, records.len());
        Ok(records)
    }

    /// Retrieves a record from DynamoDB using GetItem.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<MemeRecord>, RepoError> {
        let id_str = id.to_string();
        let resp = self.client
            .get_item()
            .table_name(&self.table_name)
            .key("meme_id", AttributeValue::S(id_str.clone()))
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to get record (id: {})", self.table_name, id_str))
            .map_err(RepoError::BackendError)?;

        match resp.item {
            Some(item) => match item_to_record(&item) {
                Some(record) => Ok(Some(record)),
                None => {
                    tracing::error!(meme_id = %id_str, table_name = %self.table_name, "DynamoDB: Retrieved item but failed to parse into MemeRecord");
                    // Return a RepoError indicating data inconsistency
                    Err(RepoError::DataCorruption(format!(
                        "Failed to parse record retrieved from DynamoDB table '{}' for id {}",
                        self.table_name, id_str
                    )))
                }
            },
            None => Ok(None), // Item not found is not an error
        }
    }

    async fn create(&self, draft: CreateMeme) -> Result<MemeRecord, RepoError> {
        let record = draft.into_record(Uuid::new_v4(), Utc::now());
        self.put_record(&record).await?;
        tracing::debug!(meme_id = %record.id, table_name = %self.table_name, "DynamoDB: Record created");
        Ok(record)
    }

    /// Read-modify-write; two racing updates to the same id can lose one
    /// editor's history entry (no version field, last write wins).
    async fn update(
        &self,
        id: Uuid,
        update: UpdateMeme,
    ) -> Result<Option<MemeRecord>, RepoError> {
        let Some(mut record) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        update.apply(&mut record, Utc::now());
        self.put_record(&record).await?;
        tracing::debug!(meme_id = %id, table_name = %self.table_name, "DynamoDB: Record updated");
        Ok(Some(record))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let id_str = id.to_string();

        // DeleteItem succeeds even for absent keys, so check existence
        // first to report not-found to the caller.
        if self.get_by_id(id).await?.is_none() {
            return Ok(false);
        }

        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("meme_id", AttributeValue::S(id_str.clone()))
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to delete record (id: {})", self.table_name, id_str))
            .map_err(RepoError::BackendError)?;

        tracing::debug!(meme_id = %id_str, table_name = %self.table_name, "DynamoDB: Record deleted");
        Ok(true)
    }

    async fn search(&self, search_query: &str) -> Result<Vec<MemeRecord>, RepoError> {
        let needle = search_query.to_lowercase();
        let mut matches: Vec<MemeRecord> = self
            .scan_all()
            .await?
            .into_iter()
            .filter(|r| query::matches(r, &needle))
            .collect();
        query::sort_chronological(&mut matches);
        Ok(matches)
    }
}

// Marshalling helpers between MemeRecord and DynamoDB attribute maps.
// Remain internal to this module.

fn record_to_item(record: &MemeRecord) -> HashMap<String, AttributeValue> {
    let edit_history = record
        .edit_history
        .iter()
        .map(|entry| {
            let mut map = HashMap::new();
            map.insert("editor".to_string(), AttributeValue::S(entry.editor.clone()));
            map.insert(
                "edited_at".to_string(),
                AttributeValue::S(entry.edited_at.to_rfc3339()),
            );
            map.insert("changes".to_string(), AttributeValue::S(entry.changes.clone()));
            AttributeValue::M(map)
        })
        .collect();

    let mut item = HashMap::new();
    item.insert("meme_id".to_string(), AttributeValue::S(record.id.to_string()));
    item.insert("title".to_string(), AttributeValue::S(record.title.clone()));
    item.insert(
        "description".to_string(),
        AttributeValue::S(record.description.clone()),
    );
    item.insert("image_url".to_string(), AttributeValue::S(record.image_url.clone()));
    item.insert("video_url".to_string(), AttributeValue::S(record.video_url.clone()));
    item.insert("year".to_string(), AttributeValue::N(record.year.to_string()));
    item.insert("month".to_string(), AttributeValue::N(record.month.to_string()));
    item.insert("examples".to_string(), string_list_to_attr(&record.examples));
    item.insert("tags".to_string(), string_list_to_attr(&record.tags));
    item.insert("source".to_string(), AttributeValue::S(record.source.clone()));
    item.insert(
        "created_at".to_string(),
        AttributeValue::S(record.created_at.to_rfc3339()),
    );
    item.insert(
        "updated_at".to_string(),
        AttributeValue::S(record.updated_at.to_rfc3339()),
    );
    item.insert("edit_history".to_string(), AttributeValue::L(edit_history));
    item
}

fn item_to_record(item: &HashMap<String, AttributeValue>) -> Option<MemeRecord> {
    // Use flat_map style for conciseness and early exit on None/Err
    let id = item
        .get("meme_id")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let title = item.get("title")?.as_s().ok()?.to_string();
    let description = item.get("description")?.as_s().ok()?.to_string();
    let image_url = item.get("image_url")?.as_s().ok()?.to_string();
    let video_url = item.get("video_url")?.as_s().ok()?.to_string();
    let year = item.get("year")?.as_n().ok()?.parse().ok()?;
    let month = item.get("month")?.as_n().ok()?.parse().ok()?;
    let examples = attr_to_string_list(item.get("examples")?)?;
    let tags = attr_to_string_list(item.get("tags")?)?;
    let source = item.get("source")?.as_s().ok()?.to_string();
    let created_at = parse_datetime(item.get("created_at")?)?;
    let updated_at = parse_datetime(item.get("updated_at")?)?;

    let edit_history = item
        .get("edit_history")?
        .as_l()
        .ok()?
        .iter()
        .map(|entry| {
            let map = entry.as_m().ok()?;
            Some(EditEntry {
                editor: map.get("editor")?.as_s().ok()?.to_string(),
                edited_at: parse_datetime(map.get("edited_at")?)?,
                changes: map.get("changes")?.as_s().ok()?.to_string(),
            })
        })
        .collect::<Option<Vec<EditEntry>>>()?;

    // A stored record always carries its creation entry
    if edit_history.is_empty() {
        return None;
    }

    Some(MemeRecord {
        id,
        title,
        description,
        image_url,
        video_url,
        year,
        month,
        examples,
        tags,
        source,
        created_at,
        updated_at,
        edit_history,
    })
}

fn string_list_to_attr(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().map(|v| AttributeValue::S(v.clone())).collect())
}

fn attr_to_string_list(attr: &AttributeValue) -> Option<Vec<String>> {
    attr.as_l()
        .ok()?
        .iter()
        .map(|v| v.as_s().ok().map(|s| s.to_string()))
        .collect()
}

fn parse_datetime(attr: &AttributeValue) -> Option<DateTime<Utc>> {
    let raw = attr.as_s().ok()?;
    Some(DateTime::parse_from_rfc3339(raw).ok()?.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_CHANGES, INITIAL_CHANGES, PLACEHOLDER_IMAGE_URL};

    fn draft(title: &str, year: i32, month: u32) -> CreateMeme {
        CreateMeme {
            title: title.to_string(),
            year: Some(year),
            month: Some(month),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_seeds_one_initial_history_entry() {
        let repo = InMemoryMemeRepository::new();
        let record = repo.create(draft("Doge", 2013, 8)).await.unwrap();

        assert_eq!(record.edit_history.len(), 1);
        assert_eq!(record.edit_history[0].changes, INITIAL_CHANGES);
        assert_eq!(record.image_url, PLACEHOLDER_IMAGE_URL);
    }

    #[tokio::test]
    async fn get_by_id_is_exact_match() {
        let repo = InMemoryMemeRepository::new();
        let record = repo.create(draft("Doge", 2013, 8)).await.unwrap();

        let found = repo.get_by_id(record.id).await.unwrap();
        assert_eq!(found.as_ref().map(|r| r.id), Some(record.id));
        assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_orders_most_recent_bucket_first() {
        let repo = InMemoryMemeRepository::new();
        repo.create(draft("old", 2020, 1)).await.unwrap();
        repo.create(draft("new", 2021, 5)).await.unwrap();

        let records = repo.list_all().await.unwrap();
        assert_eq!(records[0].title, "new");
        assert_eq!(records[1].title, "old");
    }

    #[tokio::test]
    async fn update_grows_history_by_one_and_preserves_identity() {
        let repo = InMemoryMemeRepository::new();
        let record = repo.create(draft("Doge", 2013, 8)).await.unwrap();

        let updated = repo
            .update(
                record.id,
                UpdateMeme {
                    title: Some("Doge (Shiba Inu)".to_string()),
                    changes: Some("fixed typo".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("record should exist");

        assert_eq!(updated.title, "Doge (Shiba Inu)");
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.created_at, record.created_at);
        assert_eq!(updated.edit_history.len(), 2);
        assert_eq!(updated.edit_history[1].changes, "fixed typo");

        let refetched = repo.get_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(refetched.edit_history.len(), 2);
    }

    #[tokio::test]
    async fn update_without_changes_text_uses_generic_description() {
        let repo = InMemoryMemeRepository::new();
        let record = repo.create(draft("Doge", 2013, 8)).await.unwrap();

        let updated = repo
            .update(record.id, UpdateMeme::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.edit_history[1].changes, DEFAULT_CHANGES);
    }

    #[tokio::test]
    async fn update_unknown_id_reports_not_found() {
        let repo = InMemoryMemeRepository::new();
        let result = repo.update(Uuid::new_v4(), UpdateMeme::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_is_permanent_and_idempotent_on_absence() {
        let repo = InMemoryMemeRepository::new();
        let record = repo.create(draft("Doge", 2013, 8)).await.unwrap();

        assert!(repo.delete(record.id).await.unwrap());
        assert!(repo.get_by_id(record.id).await.unwrap().is_none());
        // Second delete of the same id is a not-found, not an error
        assert!(!repo.delete(record.id).await.unwrap());
    }

    #[tokio::test]
    async fn search_matches_title_description_and_tags() {
        let repo = InMemoryMemeRepository::new();
        repo.create(CreateMeme {
            title: "Gangnam Style".to_string(),
            description: Some("Worldwide K-pop phenomenon".to_string()),
            tags: Some(vec!["Dance".to_string()]),
            year: Some(2012),
            month: Some(7),
            ..Default::default()
        })
        .await
        .unwrap();
        repo.create(draft("Doge", 2013, 8)).await.unwrap();

        assert_eq!(repo.search("GANGNAM").await.unwrap().len(), 1);
        assert_eq!(repo.search("k-pop").await.unwrap().len(), 1);
        assert_eq!(repo.search("dance").await.unwrap().len(), 1);
        assert!(repo.search("nyan cat").await.unwrap().is_empty());
    }

    #[test]
    fn dynamodb_marshalling_round_trips_a_full_record() {
        let mut record = draft("Doge", 2013, 8).into_record(Uuid::new_v4(), Utc::now());
        record.examples = vec!["such wow".to_string(), "very meme".to_string()];
        record.tags = vec!["shiba".to_string()];
        record.source = "https://knowyourmeme.com/memes/doge".to_string();

        let parsed = item_to_record(&record_to_item(&record)).expect("item should parse");
        assert_eq!(parsed, record);
    }

    #[test]
    fn item_missing_required_attribute_fails_to_parse() {
        let record = draft("Doge", 2013, 8).into_record(Uuid::new_v4(), Utc::now());
        let mut item = record_to_item(&record);
        item.remove("title");
        assert!(item_to_record(&item).is_none());
    }
}
