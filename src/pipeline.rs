use crate::config::RunnerConfig;
use crate::core::{BuildRequest, BuildResult, Stage, ToolCommand};
use crate::detection::resolve_linux_images;
use crate::error::{Result, RunnerError};
use crate::execution::{ProcessInvoker, ToolInvoker};
use crate::layout::BuildDirectory;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tracing::{info, instrument};

/// Drives the compile → link → package flow of the vendor compiler.
///
/// Construction checks the environment once (platform present, compiler
/// resolvable); each [`build`](Self::build) then runs the three stages in
/// order against its own build directory and shares one append-only log
/// between them.
pub struct BuildPipeline<I = ProcessInvoker> {
    compiler: PathBuf,
    platform: PathBuf,
    build_root: PathBuf,
    rootfs: Option<PathBuf>,
    kernel_image: Option<PathBuf>,
    invoker: I,
}

impl BuildPipeline<ProcessInvoker> {
    pub async fn new(config: RunnerConfig) -> Result<Self> {
        Self::with_invoker(config, ProcessInvoker::default()).await
    }
}

impl<I: ToolInvoker> BuildPipeline<I> {
    pub async fn with_invoker(config: RunnerConfig, invoker: I) -> Result<Self> {
        let platform = std::path::absolute(&config.platform)?;
        if !fs::try_exists(&platform).await? {
            return Err(RunnerError::ConfigurationNotFound { path: platform });
        }

        let compiler = which::which(&config.compiler).map_err(|_| RunnerError::EnvironmentUnavailable {
            tool: config.compiler.display().to_string(),
        })?;

        fs::create_dir_all(&config.build_root).await?;
        let build_root = fs::canonicalize(&config.build_root).await?;

        let (rootfs, kernel_image) = resolve_linux_images(
            &platform,
            &config.images_subdir,
            config.rootfs,
            config.kernel_image,
        );

        info!("Platform     : {:?}", platform);
        info!("Compiler     : {:?}", compiler);
        info!("Build dir    : {:?}", build_root);
        if let Some(rootfs) = &rootfs {
            info!("rootfs       : {:?}", rootfs);
        }
        if let Some(kernel_image) = &kernel_image {
            info!("kernel_image : {:?}", kernel_image);
        }

        Ok(Self {
            compiler,
            platform,
            build_root,
            rootfs,
            kernel_image,
            invoker,
        })
    }

    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    pub fn platform(&self) -> &Path {
        &self.platform
    }

    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    pub fn rootfs(&self) -> Option<&Path> {
        self.rootfs.as_deref()
    }

    pub fn kernel_image(&self) -> Option<&Path> {
        self.kernel_image.as_deref()
    }

    /// Compile `request.source_text` down to a packaged binary.
    #[instrument(skip_all, fields(kernel = %request.kernel_name, target = %request.target))]
    pub async fn build(&self, request: &BuildRequest) -> Result<BuildResult> {
        let started = Instant::now();
        let layout = BuildDirectory::resolve(&self.build_root, &request.kernel_name, &request.target)?;

        layout.prepare(request.clean).await?;
        fs::write(&layout.source_path, &request.source_text).await?;

        for stage in Stage::ALL {
            let command = self.command_for(stage, &layout, request);
            info!(
                "[{}/{}] v++ {}  ({}) {} ...",
                stage.ordinal(),
                Stage::ALL.len(),
                stage.mode_flag(),
                layout.target,
                describe_transition(stage, &layout.kernel_name)
            );
            self.invoker.invoke(stage, &command, &layout.log_path).await?;
            info!(
                "       {} done ({:.0}s)",
                capitalize(&stage.to_string()),
                started.elapsed().as_secs_f64()
            );
        }

        let metadata = fs::metadata(&layout.binary_path).await;
        let byte_size = match metadata {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RunnerError::MissingArtifact {
                    path: layout.binary_path,
                });
            }
            Err(e) => return Err(e.into()),
        };
        let elapsed_seconds = started.elapsed().as_secs_f64();

        info!("Build complete in {:.1} min", elapsed_seconds / 60.0);
        info!("  xclbin : {:?} ({:.0} KB)", layout.binary_path, byte_size as f64 / 1024.0);
        info!("  log    : {:?}", layout.log_path);

        Ok(BuildResult {
            binary_path: layout.binary_path,
            byte_size,
            elapsed_seconds,
            log_path: layout.log_path,
        })
    }

    /// The exact command line a stage runs for `request`.
    pub fn command_for(&self, stage: Stage, layout: &BuildDirectory, request: &BuildRequest) -> ToolCommand {
        let command = ToolCommand::new(&self.compiler)
            .arg(stage.mode_flag())
            .args(["-t", layout.target.as_str()])
            .arg("--platform")
            .arg(path_arg(&self.platform));

        let command = match stage {
            Stage::Compile => {
                let mut command = command
                    .args(["-k", request.kernel_name.as_str()])
                    .arg("--save-temps")
                    .arg("-o")
                    .arg(path_arg(&layout.object_path))
                    .arg(path_arg(&layout.source_path));
                // Passed through unchanged for emulated targets too.
                if let Some(clock_hz) = request.clock_hz {
                    command = command
                        .arg("--hls.clock")
                        .arg(format!("{}:{}", clock_hz, request.kernel_name));
                }
                command
            }
            Stage::Link => command
                .arg("--save-temps")
                .arg("-o")
                .arg(path_arg(&layout.archive_path))
                .arg(path_arg(&layout.object_path)),
            Stage::Package => {
                let mut command = command
                    .arg("--save-temps")
                    .arg("--package.out_dir")
                    .arg(path_arg(&layout.package_dir))
                    .arg("-o")
                    .arg(path_arg(&layout.binary_path))
                    .arg(path_arg(&layout.archive_path));
                if let Some(rootfs) = &self.rootfs {
                    command = command.arg("--package.rootfs").arg(path_arg(rootfs));
                }
                if let Some(kernel_image) = &self.kernel_image {
                    command = command.arg("--package.kernel_image").arg(path_arg(kernel_image));
                }
                command
            }
        };

        command.args(request.extra_flags.iter().cloned())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn describe_transition(stage: Stage, kernel_name: &str) -> String {
    match stage {
        Stage::Compile => format!("{}.cpp -> .xo", kernel_name),
        Stage::Link => ".xo -> .xsa".to_string(),
        Stage::Package => ".xsa -> .xclbin".to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
