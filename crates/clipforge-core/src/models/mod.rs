pub mod edit;
pub mod media;
pub mod metadata;

pub use edit::{Crop, Cut, EditParams, Quality, Rotate};
pub use media::{MediaRecord, ThumbnailInfo};
pub use metadata::VideoMetadata;
