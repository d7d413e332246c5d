//! Video transformation pipeline: scratch file management, external tool
//! invocation, metadata extraction, cut/crop/rotate/rescale transforms,
//! thumbnail capture and the edit orchestration service.
//!
//! External processes are reached through the [`VideoTool`] capability
//! trait; [`tool::FfmpegTool`] binds it to local ffmpeg/ffprobe binaries
//! and [`testing::FakeTool`] provides a canned in-process double.

pub mod extractor;
pub mod pipeline;
pub mod scratch;
pub mod service;
pub mod testing;
pub mod thumbnail;
pub mod tool;

pub use extractor::MetadataExtractor;
pub use pipeline::{TransformOutput, TransformPipeline};
pub use scratch::Scratch;
pub use service::EditService;
pub use thumbnail::{Frame, ThumbnailExtractor, TimelineFrames};
pub use tool::{FfmpegTool, VideoTool};
