use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vpp_runner::config::{DEFAULT_BUILD_ROOT, DEFAULT_COMPILER};
use vpp_runner::detection::DEFAULT_IMAGES_SUBDIR;
use vpp_runner::{list_builds, BuildPipeline, BuildRequest, RunnerConfig};

/// Compile HLS kernels to .xclbin with the v++ toolchain
#[derive(Parser)]
#[command(name = "vpp-runner", version, about)]
struct Cli {
    /// Directory holding one subdirectory per kernel/target build
    #[arg(long, global = true, env = "VPP_BUILD_ROOT", default_value = DEFAULT_BUILD_ROOT)]
    build_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run compile, link and package for one kernel source file
    Build {
        /// HLS C++ source file
        source: PathBuf,

        /// Platform descriptor (.xpfm)
        #[arg(long, env = "VPP_PLATFORM")]
        platform: PathBuf,

        /// Top-level kernel function name
        #[arg(short, long, default_value = "krnl_custom")]
        kernel: String,

        /// Build target: hw_emu or hw
        #[arg(short, long, default_value = "hw_emu")]
        target: String,

        /// HLS clock in Hz for this kernel (platform default when omitted)
        #[arg(long)]
        clock_hz: Option<u64>,

        /// Extra flag passed to every v++ invocation (repeatable)
        #[arg(long = "flag", allow_hyphen_values = true)]
        flags: Vec<String>,

        /// Remove previous artifacts before building
        #[arg(long)]
        clean: bool,

        #[arg(long, env = "VPP_COMPILER", default_value = DEFAULT_COMPILER)]
        compiler: PathBuf,

        /// Root filesystem image for the packager (auto-detected when omitted)
        #[arg(long, env = "VPP_ROOTFS")]
        rootfs: Option<PathBuf>,

        /// Boot kernel image for the packager (auto-detected when omitted)
        #[arg(long, env = "VPP_KERNEL_IMAGE")]
        kernel_image: Option<PathBuf>,

        #[arg(long, env = "VPP_IMAGES_SUBDIR", default_value = DEFAULT_IMAGES_SUBDIR)]
        images_subdir: PathBuf,
    },

    /// List packaged binaries under the build root
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            source,
            platform,
            kernel,
            target,
            clock_hz,
            flags,
            clean,
            compiler,
            rootfs,
            kernel_image,
            images_subdir,
        } => {
            let source_text = tokio::fs::read_to_string(&source)
                .await
                .with_context(|| format!("failed to read kernel source {:?}", source))?;

            let mut config = RunnerConfig::new(platform)
                .with_build_root(cli.build_root)
                .with_compiler(compiler)
                .with_images_subdir(images_subdir);
            config.rootfs = rootfs;
            config.kernel_image = kernel_image;

            let pipeline = BuildPipeline::new(config).await?;

            let mut request = BuildRequest::new(source_text, kernel, target)
                .with_extra_flags(flags)
                .clean(clean);
            request.clock_hz = clock_hz;

            let result = pipeline.build(&request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::List => {
            let builds = list_builds(&cli.build_root)?;
            info!("Found {} packaged binaries under {:?}", builds.len(), cli.build_root);
            println!("{}", serde_json::to_string_pretty(&builds)?);
        }
    }

    Ok(())
}
