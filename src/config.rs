use crate::detection::DEFAULT_IMAGES_SUBDIR;
use std::path::PathBuf;

pub const DEFAULT_COMPILER: &str = "v++";
pub const DEFAULT_BUILD_ROOT: &str = "./vitis_builds";

/// Settings shared by every build driven through one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Platform descriptor (`.xpfm`) passed to every stage.
    pub platform: PathBuf,
    pub build_root: PathBuf,
    /// Compiler executable name or path.
    pub compiler: PathBuf,
    pub rootfs: Option<PathBuf>,
    pub kernel_image: Option<PathBuf>,
    pub images_subdir: PathBuf,
}

impl RunnerConfig {
    pub fn new(platform: impl Into<PathBuf>) -> Self {
        Self {
            platform: platform.into(),
            build_root: PathBuf::from(DEFAULT_BUILD_ROOT),
            compiler: PathBuf::from(DEFAULT_COMPILER),
            rootfs: None,
            kernel_image: None,
            images_subdir: PathBuf::from(DEFAULT_IMAGES_SUBDIR),
        }
    }

    pub fn with_build_root(mut self, build_root: impl Into<PathBuf>) -> Self {
        self.build_root = build_root.into();
        self
    }

    pub fn with_compiler(mut self, compiler: impl Into<PathBuf>) -> Self {
        self.compiler = compiler.into();
        self
    }

    pub fn with_rootfs(mut self, rootfs: impl Into<PathBuf>) -> Self {
        self.rootfs = Some(rootfs.into());
        self
    }

    pub fn with_kernel_image(mut self, kernel_image: impl Into<PathBuf>) -> Self {
        self.kernel_image = Some(kernel_image.into());
        self
    }

    pub fn with_images_subdir(mut self, images_subdir: impl Into<PathBuf>) -> Self {
        self.images_subdir = images_subdir.into();
        self
    }
}
