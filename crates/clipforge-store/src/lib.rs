//! Versioned media store: binary content on a local filesystem plus a
//! record per asset, with edit-in-place and fork-as-new-version semantics.
//!
//! The record collection sits behind the [`RecordStore`] trait so a document
//! database client can be plugged in; [`InMemoryRecordStore`] ships as the
//! in-process implementation.

pub mod files;
pub mod locks;
pub mod records;
pub mod store;

pub use files::FileStore;
pub use locks::AssetLocks;
pub use records::{InMemoryRecordStore, RecordStore};
pub use store::MediaStore;
