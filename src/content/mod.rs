//! Content module - raw documents, post view models and their mapping

pub mod mapper;
mod post;
pub mod reading_time;
pub mod record;

pub use post::{ContentBlock, NeighborLinks, Paragraph, PostDetail, PostSummary};
pub use record::Document;
