use crate::core::Target;
use crate::error::{Result, RunnerError};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

pub const LOG_FILE_NAME: &str = "build.log";
pub const PACKAGE_DIR_NAME: &str = "package";

/// Artifact paths for one (kernel, target) build under a build root.
///
/// Every path lives inside `{root}/{kernel}_{target}/`, so builds that differ
/// in kernel name or target never share files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDirectory {
    pub kernel_name: String,
    pub target: Target,
    pub dir: PathBuf,
    pub source_path: PathBuf,
    pub object_path: PathBuf,
    pub archive_path: PathBuf,
    pub binary_path: PathBuf,
    pub log_path: PathBuf,
    pub package_dir: PathBuf,
}

impl BuildDirectory {
    /// Validate `target` and `kernel_name`, then derive the paths. Touches nothing on disk.
    pub fn resolve(root: &Path, kernel_name: &str, target: &str) -> Result<Self> {
        let target: Target = target.parse()?;
        validate_kernel_name(kernel_name)?;
        Ok(Self::for_target(root, kernel_name, target))
    }

    fn for_target(root: &Path, kernel_name: &str, target: Target) -> Self {
        let dir = root.join(format!("{}_{}", kernel_name, target));
        Self {
            kernel_name: kernel_name.to_string(),
            target,
            source_path: dir.join(format!("{}.cpp", kernel_name)),
            object_path: dir.join(format!("{}.xo", kernel_name)),
            archive_path: dir.join(format!("{}.xsa", kernel_name)),
            binary_path: dir.join(format!("{}.xclbin", kernel_name)),
            log_path: dir.join(LOG_FILE_NAME),
            package_dir: dir.join(PACKAGE_DIR_NAME),
            dir,
        }
    }

    /// The six derived artifact paths, in pipeline order.
    pub fn artifact_paths(&self) -> [&Path; 6] {
        [
            &self.source_path,
            &self.object_path,
            &self.archive_path,
            &self.binary_path,
            &self.log_path,
            &self.package_dir,
        ]
    }

    /// Create the directory tree, wiping it first when `clean` is set.
    pub async fn prepare(&self, clean: bool) -> Result<()> {
        if clean && fs::try_exists(&self.dir).await? {
            info!("Removing previous build artifacts in {:?}", self.dir);
            fs::remove_dir_all(&self.dir).await?;
        }
        fs::create_dir_all(&self.package_dir).await?;
        debug!("Build directory ready: {:?}", self.dir);
        Ok(())
    }
}

fn validate_kernel_name(kernel_name: &str) -> Result<()> {
    if kernel_name.is_empty() {
        return Err(RunnerError::InvalidConfiguration(
            "kernel name must not be empty".to_string(),
        ));
    }

    let mut components = Path::new(kernel_name).components();
    let single_normal = matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
    if !single_normal || kernel_name.contains(['/', '\\']) {
        return Err(RunnerError::InvalidConfiguration(format!(
            "kernel name must be a plain file name, got '{}'",
            kernel_name
        )));
    }

    Ok(())
}
