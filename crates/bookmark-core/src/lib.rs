//! bookmark-core: persistent line bookmarks keyed by file and line number.

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod service;
pub mod store;

pub use codec::{decode, encode, DecodeError};
pub use document::{CorruptDocument, Document, KeyPath};
pub use error::{Result, StoreError};
pub use service::{
    BookmarkEntry, BookmarkRecord, Bookmarks, Direction, FileBucket, Listing, ListingReport,
    Toggled,
};
pub use store::KeyPathStore;
