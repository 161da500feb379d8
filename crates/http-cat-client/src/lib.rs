//! Remote status image source
//!
//! Fetches the image for a status code from an http.cat-style service,
//! where `GET <base>/<code>` returns the raw image bytes.

pub mod client;
pub mod error;

pub use client::{HttpCatClient, ImageSource};
pub use error::{ImageSourceError, Result};
