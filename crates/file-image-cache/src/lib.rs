//! Flat-directory image cache keyed by status code
//!
//! Each entry is a single file named `<code>.jpg` under the cache root.
//! There is no in-memory index; the directory is the only source of truth.

mod cache;
mod error;
mod types;

pub use cache::ImageCache;
pub use error::{CacheError, Result};
pub use types::ImageCode;
