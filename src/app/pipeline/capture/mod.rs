pub mod context;
pub mod pipeline;
pub mod tasks;

pub use context::{CaptureContext, CaptureOutcome};
pub use pipeline::build_capture_pipeline;
