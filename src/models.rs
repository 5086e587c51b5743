use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback image shown for entries submitted without one.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400x300?text=No+Image";
pub const DEFAULT_DESCRIPTION: &str = "No description";
pub const DEFAULT_EDITOR: &str = "anonymous";
pub const INITIAL_CHANGES: &str = "initial creation";
pub const DEFAULT_CHANGES: &str = "content updated";

/// One audit entry in a record's edit history. Appended once at creation
/// and once per update, never truncated or reordered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditEntry {
    pub editor: String,
    pub edited_at: DateTime<Utc>,
    pub changes: String,
}

/// A single meme entry. `year`/`month` place it in its chronological
/// bucket; they are grouping keys only and are not range-checked here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemeRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub video_url: String,
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub edit_history: Vec<EditEntry>,
}

/// Request body for POST /memes. Everything except `title` is optional;
/// the store fills defaults. `title` presence is validated by the handler.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateMeme {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub examples: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub source: Option<String>,
    pub editor: Option<String>,
}

impl CreateMeme {
    /// Materializes a full record from the draft, filling every omitted
    /// field with its default and seeding the edit history with the
    /// creation entry.
    pub fn into_record(self, id: Uuid, now: DateTime<Utc>) -> MemeRecord {
        let editor = non_blank(self.editor).unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        MemeRecord {
            id,
            title: self.title.trim().to_string(),
            description: non_blank(self.description)
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            image_url: non_blank(self.image_url)
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            video_url: self.video_url.unwrap_or_default(),
            year: self.year.unwrap_or_else(|| now.year()),
            month: self.month.unwrap_or_else(|| now.month()),
            examples: self.examples.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            source: self.source.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            edit_history: vec![EditEntry {
                editor,
                edited_at: now,
                changes: INITIAL_CHANGES.to_string(),
            }],
        }
    }
}

/// Request body for PUT /memes/{id}. Supplied fields overwrite the stored
/// record; `editor`/`changes` only feed the appended audit entry.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateMeme {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub examples: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub source: Option<String>,
    pub editor: Option<String>,
    pub changes: Option<String>,
}

impl UpdateMeme {
    /// Merges the supplied fields over `record`, appends exactly one edit
    /// history entry, and refreshes `updated_at`. `id` and `created_at`
    /// are left untouched.
    pub fn apply(self, record: &mut MemeRecord, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(description) = self.description {
            record.description = description;
        }
        if let Some(image_url) = self.image_url {
            record.image_url = image_url;
        }
        if let Some(video_url) = self.video_url {
            record.video_url = video_url;
        }
        if let Some(year) = self.year {
            record.year = year;
        }
        if let Some(month) = self.month {
            record.month = month;
        }
        if let Some(examples) = self.examples {
            record.examples = examples;
        }
        if let Some(tags) = self.tags {
            record.tags = tags;
        }
        if let Some(source) = self.source {
            record.source = source;
        }
        record.edit_history.push(EditEntry {
            editor: non_blank(self.editor).unwrap_or_else(|| DEFAULT_EDITOR.to_string()),
            edited_at: now,
            changes: non_blank(self.changes).unwrap_or_else(|| DEFAULT_CHANGES.to_string()),
        });
        record.updated_at = now;
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_defaults_fill_every_optional_field() {
        let now = Utc::now();
        let record = CreateMeme {
            title: "  Test Meme  ".to_string(),
            ..Default::default()
        }
        .into_record(Uuid::new_v4(), now);

        assert_eq!(record.title, "Test Meme");
        assert_eq!(record.description, DEFAULT_DESCRIPTION);
        assert_eq!(record.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(record.video_url, "");
        assert_eq!(record.year, now.year());
        assert_eq!(record.month, now.month());
        assert!(record.examples.is_empty());
        assert!(record.tags.is_empty());
        assert_eq!(record.edit_history.len(), 1);
        assert_eq!(record.edit_history[0].editor, DEFAULT_EDITOR);
        assert_eq!(record.edit_history[0].changes, INITIAL_CHANGES);
    }

    #[test]
    fn blank_description_falls_back_to_default() {
        let record = CreateMeme {
            title: "Doge".to_string(),
            description: Some("   ".to_string()),
            ..Default::default()
        }
        .into_record(Uuid::new_v4(), Utc::now());

        assert_eq!(record.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn update_merges_fields_and_appends_history() {
        let now = Utc::now();
        let mut record = CreateMeme {
            title: "Doge".to_string(),
            ..Default::default()
        }
        .into_record(Uuid::new_v4(), now);
        let created_at = record.created_at;

        let later = now + chrono::Duration::seconds(5);
        UpdateMeme {
            description: Some("such wow".to_string()),
            editor: Some("wow".to_string()),
            changes: Some("fixed typo".to_string()),
            ..Default::default()
        }
        .apply(&mut record, later);

        assert_eq!(record.description, "such wow");
        assert_eq!(record.created_at, created_at);
        assert_eq!(record.updated_at, later);
        assert_eq!(record.edit_history.len(), 2);
        let last = record.edit_history.last().unwrap();
        assert_eq!(last.editor, "wow");
        assert_eq!(last.changes, "fixed typo");
    }

    #[test]
    fn update_without_metadata_uses_anonymous_defaults() {
        let mut record = CreateMeme {
            title: "Doge".to_string(),
            ..Default::default()
        }
        .into_record(Uuid::new_v4(), Utc::now());

        UpdateMeme::default().apply(&mut record, Utc::now());

        let last = record.edit_history.last().unwrap();
        assert_eq!(last.editor, DEFAULT_EDITOR);
        assert_eq!(last.changes, DEFAULT_CHANGES);
    }
}
