pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod execution;
pub mod layout;
pub mod listing;
pub mod pipeline;

pub use crate::config::RunnerConfig;
pub use crate::core::{BuildRequest, BuildResult, ProcessOutcome, Stage, Target, ToolCommand};
pub use crate::error::{Result, RunnerError};
pub use crate::execution::{ChannelRelay, DiagnosticRelay, ProcessInvoker, ToolInvoker, TracingRelay};
pub use crate::layout::BuildDirectory;
pub use crate::listing::{list_builds, BuiltArtifact};
pub use crate::pipeline::BuildPipeline;
