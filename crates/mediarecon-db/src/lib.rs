//! Mediarecon Database Library
//!
//! Access to the media collection: the dimension-repair selection, a pull-based cursor
//! over it, and merge-patch updates addressed by record key.

pub mod db;

pub use db::media::{
    dimension_projection, missing_dimensions_filter, set_document, MediaRepository, MediaStream,
    MongoMediaRepository,
};
pub use db::{DbError, DbResult};
