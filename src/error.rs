use crate::core::Stage;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RunnerError>;

/// Everything that can abort a kernel build.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A required input path does not exist at setup time.
    #[error("configuration not found: {}", .path.display())]
    ConfigurationNotFound { path: PathBuf },

    /// The external compiler could not be located.
    #[error("{tool} not found on PATH; source the toolchain settings script first")]
    EnvironmentUnavailable { tool: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// One of the three toolchain stages exited nonzero.
    #[error("{stage} stage failed (exit code {}): {command}; full log: {}", exit_code_label(.exit_code), .log_path.display())]
    ExternalProcessFailure {
        stage: Stage,
        exit_code: Option<i32>,
        command: String,
        log_path: PathBuf,
    },

    /// The toolchain reported success but the expected file is absent.
    #[error("expected artifact missing after successful run: {}", .path.display())]
    MissingArtifact { path: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}
