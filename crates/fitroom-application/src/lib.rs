//! Fitroom application layer.
//!
//! Use cases on top of `fitroom-core`: the commit pipeline that turns a
//! composition session into a persisted outfit, and the composition use case
//! wiring catalog loading, session lifecycle and saving together for the
//! host application.

pub mod commit;
pub mod usecase;

pub use commit::{CommitPipeline, ProgressCallback, SaveProgress, SaveStage};
pub use usecase::CompositionUseCase;
