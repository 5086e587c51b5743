use crate::domain::MemeRepository;
use crate::errors::AppError;
use crate::models::CreateMeme;
use aws_sdk_dynamodb::{
    Client as DynamoDbClient, error::SdkError as DynamoSdkError,
    types::{AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType},
};
use tracing;

/// Creates the DynamoDB table if it doesn't exist.
pub async fn create_memes_table_if_not_exists(
    client: &DynamoDbClient,
    table_name: &str,
) -> Result<(), AppError> {
    let result = client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("meme_id")
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(|e| AppError::InitError(format!("Failed to build attribute definition: {}", e)))?
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("meme_id")
                .key_type(KeyType::Hash)
                .build()
                .map_err(|e| AppError::InitError(format!("Failed to build key schema: {}", e)))?
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;
    match result {
        Ok(_) => {
            tracing::info!("Startup: Table '{}' created successfully or setup initiated.", table_name);
            Ok(())
        }
        Err(e) => {
            if let DynamoSdkError::ServiceError(service_err) = &e {
                if service_err.err().is_resource_in_use_exception() {
                    tracing::info!("Startup: Table '{}' already exists, no action needed.", table_name);
                    Ok(())
                } else {
                    let context = format!("Startup: Service error creating DynamoDB table '{}'", table_name);
                    tracing::error!("{}: {:?}", context, service_err);
                    Err(AppError::InitError(format!("{}: {}", context, e)))
                }
            } else {
                let context = format!("Startup: SDK error creating DynamoDB table '{}'", table_name);
                tracing::error!("{}: {}", context, e);
                Err(AppError::InitError(format!("{}: {}", context, e)))
            }
        }
    }
}

fn sample_memes() -> Vec<CreateMeme> {
    vec![
        CreateMeme {
            title: "Gangnam Style".to_string(),
            description: Some(
                "Psy's 'Gangnam Style' exploded on YouTube in 2012 and became a worldwide \
                 phenomenon, carrying the horse dance and K-pop onto the global stage."
                    .to_string(),
            ),
            image_url: Some("https://i.ytimg.com/vi/9bZkp7q19f0/maxresdefault.jpg".to_string()),
            video_url: Some("https://www.youtube.com/watch?v=9bZkp7q19f0".to_string()),
            year: Some(2012),
            month: Some(7),
            examples: Some(vec![
                "Doing the horse dance".to_string(),
                "Parody videos".to_string(),
            ]),
            tags: Some(vec![
                "k-pop".to_string(),
                "psy".to_string(),
                "dance".to_string(),
                "korea".to_string(),
            ]),
            source: Some("https://knowyourmeme.com/memes/gangnam-style".to_string()),
            editor: Some("system".to_string()),
        },
        CreateMeme {
            title: "Doge".to_string(),
            description: Some(
                "A photo of Kabosu the Shiba Inu captioned in Comic Sans with broken English \
                 like 'such wow' and 'very amaze'. Popular since 2013, it later spawned the \
                 Dogecoin cryptocurrency."
                    .to_string(),
            ),
            image_url: Some(
                "https://i.kym-cdn.com/entries/icons/original/000/013/564/doge.jpg".to_string(),
            ),
            video_url: None,
            year: Some(2013),
            month: Some(8),
            examples: Some(vec![
                "such wow".to_string(),
                "very meme".to_string(),
                "much doge".to_string(),
            ]),
            tags: Some(vec![
                "shiba inu".to_string(),
                "cryptocurrency".to_string(),
                "cute".to_string(),
            ]),
            source: Some("https://knowyourmeme.com/memes/doge".to_string()),
            editor: Some("system".to_string()),
        },
        CreateMeme {
            title: "Distracted Boyfriend".to_string(),
            description: Some(
                "A stock photo of a man checking out another woman while his girlfriend looks \
                 on in disbelief. It took off in 2017 as a template for any clash of \
                 priorities."
                    .to_string(),
            ),
            image_url: Some(
                "https://i.kym-cdn.com/entries/icons/original/000/021/311/free.jpg".to_string(),
            ),
            video_url: None,
            year: Some(2017),
            month: Some(8),
            examples: Some(vec![
                "Expressing a conflict of choice".to_string(),
                "Comparing priorities".to_string(),
            ]),
            tags: Some(vec![
                "stock photo".to_string(),
                "relationships".to_string(),
                "choice".to_string(),
            ]),
            source: Some("https://knowyourmeme.com/memes/distracted-boyfriend".to_string()),
            editor: Some("system".to_string()),
        },
    ]
}

/// Seeds the store with demo records. Idempotent: only an empty store is
/// seeded, so repeated bootstrap calls (or a persistent table that already
/// has data) are no-ops.
pub async fn seed_store(repo: &dyn MemeRepository) -> Result<(), AppError> {
    let existing = repo.list_all().await?;
    if !existing.is_empty() {
        tracing::info!(
            "Startup: Store already holds {} records, skipping demo seed.",
            existing.len()
        );
        return Ok(());
    }

    let samples = sample_memes();
    let count = samples.len();
    for draft in samples {
        repo.create(draft).await?;
    }
    tracing::info!("Startup: Seeded store with {} demo records.", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryMemeRepository;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let repo = InMemoryMemeRepository::new();
        seed_store(&repo).await.unwrap();
        let first = repo.list_all().await.unwrap();
        assert_eq!(first.len(), 3);

        seed_store(&repo).await.unwrap();
        assert_eq!(repo.list_all().await.unwrap().len(), first.len());
    }

    #[tokio::test]
    async fn seeded_records_carry_a_creation_entry() {
        let repo = InMemoryMemeRepository::new();
        seed_store(&repo).await.unwrap();
        for record in repo.list_all().await.unwrap() {
            assert_eq!(record.edit_history.len(), 1);
            assert_eq!(record.edit_history[0].editor, "system");
        }
    }
}
