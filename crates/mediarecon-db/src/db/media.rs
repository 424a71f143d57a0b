use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use mediarecon_core::constants::IMAGE_MIME_TYPES;
use mediarecon_core::{MediaPatch, MediaRecord, UpdateOutcome};
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection};

use super::{DbError, DbResult};

/// Records in cursor order. Pulling the next item may fetch the next server batch.
pub type MediaStream = BoxStream<'static, DbResult<MediaRecord>>;

/// Media collection operations used by the flows.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Count of image records with an empty height or width.
    async fn count_missing_dimensions(&self) -> DbResult<u64>;

    /// Cursor over image records with an empty height or width.
    async fn find_missing_dimensions(&self) -> DbResult<MediaStream>;

    /// `$set` the patch fields on the record whose `key` matches. Never inserts.
    async fn update_by_key(&self, key: &str, patch: &MediaPatch) -> DbResult<UpdateOutcome>;
}

/// Selection for records that need their dimensions repaired.
pub fn missing_dimensions_filter() -> Document {
    let mimetypes: Vec<Bson> = IMAGE_MIME_TYPES
        .iter()
        .map(|mimetype| Bson::Document(doc! { "mimetype": *mimetype }))
        .collect();

    doc! {
        "$and": [
            { "$or": mimetypes },
            { "$or": [ { "height": "" }, { "width": "" } ] },
        ]
    }
}

/// Fields the dimension flows read. Other fields stay on the server.
pub fn dimension_projection() -> Document {
    doc! { "key": 1, "mimetype": 1, "height": 1, "width": 1 }
}

/// `$set` body for a patch; unset fields are omitted.
pub fn set_document(patch: &MediaPatch) -> Document {
    let mut set = Document::new();
    let fields = [
        ("etag", &patch.etag),
        ("height", &patch.height),
        ("width", &patch.width),
        ("size", &patch.size),
        ("duration", &patch.duration),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            set.insert(name, value.as_str());
        }
    }
    set
}

/// MongoDB-backed media repository.
#[derive(Clone)]
pub struct MongoMediaRepository {
    collection: Collection<MediaRecord>,
}

impl MongoMediaRepository {
    /// Connect and ping the server so an unreachable database fails here rather than
    /// on the first query.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> DbResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;

        tracing::debug!(database = %database, collection = %collection, "Connected to media store");

        Ok(Self {
            collection: db.collection(collection),
        })
    }
}

#[async_trait]
impl MediaRepository for MongoMediaRepository {
    async fn count_missing_dimensions(&self) -> DbResult<u64> {
        Ok(self
            .collection
            .count_documents(missing_dimensions_filter())
            .await?)
    }

    async fn find_missing_dimensions(&self) -> DbResult<MediaStream> {
        let cursor = self
            .collection
            .find(missing_dimensions_filter())
            .projection(dimension_projection())
            .await?;
        Ok(cursor.map_err(DbError::from).boxed())
    }

    async fn update_by_key(&self, key: &str, patch: &MediaPatch) -> DbResult<UpdateOutcome> {
        let set = set_document(patch);
        if set.is_empty() {
            return Ok(UpdateOutcome::default());
        }

        let result = self
            .collection
            .update_one(doc! { "key": key }, doc! { "$set": set })
            .await?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }
}
