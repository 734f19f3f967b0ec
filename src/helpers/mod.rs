//! Helper functions for templates and output paths

mod date;
mod url;

pub use date::*;
pub use url::*;
