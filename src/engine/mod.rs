pub mod derive;
pub mod fusion;
pub mod normalizer;
pub mod pipeline;

pub use derive::{derive, derive_op, DerivedOp};
pub use fusion::fuse;
pub use normalizer::{normalize, normalize_all};
pub use pipeline::{PanelPipeline, PipelineResult};
