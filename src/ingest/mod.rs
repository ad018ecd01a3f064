//! Image input: decoding and blob retrieval.
//!
//! This module turns encoded image bytes into an RGB [`Raster`] and
//! provides the storage abstraction the analyzer fetches uploads through.
//! Neither concern carries any analysis logic.

mod decoder;
mod raster;
mod store;

pub use decoder::Decoder;
pub use raster::Raster;
pub use store::{validate_key, BlobStore, DirectoryStore, FetchFn, MemoryStore, StoreError};
