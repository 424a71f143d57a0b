pub mod media;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

pub type DbResult<T> = Result<T, DbError>;
