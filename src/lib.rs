pub mod batch;
pub mod isolation;
pub mod models;

pub use batch::{BatchJob, BatchOutcome, process_batch};
pub use isolation::IsolationPipeline;
pub use models::{
    BezierSegment, BoundingBox, InstanceId, InstanceMask, IsolationResult, OutlinePath, PathPoint,
};
