use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the embedded Linux build drops its images, relative to some ancestor of the platform.
pub const DEFAULT_IMAGES_SUBDIR: &str = "step2_vp1552/my_foe_flx/images/linux";
pub const ROOTFS_FILE_NAME: &str = "rootfs.ext4";
pub const KERNEL_IMAGE_FILE_NAME: &str = "Image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxImages {
    pub rootfs: PathBuf,
    pub kernel_image: PathBuf,
}

/// Best-effort lookup of the boot images the packager needs for embedded targets.
///
/// Walks up from `platform`, probing `<ancestor>/<images_subdir>` for both a
/// root filesystem and a kernel image. Returns `None` when no ancestor holds
/// both; callers package without them in that case.
pub fn detect_linux_images(platform: &Path, images_subdir: &Path) -> Option<LinuxImages> {
    for ancestor in platform.ancestors().skip(1) {
        let linux_dir = ancestor.join(images_subdir);
        if !linux_dir.is_dir() {
            continue;
        }

        let rootfs = linux_dir.join(ROOTFS_FILE_NAME);
        let kernel_image = linux_dir.join(KERNEL_IMAGE_FILE_NAME);
        if rootfs.is_file() && kernel_image.is_file() {
            debug!("Found Linux images in {:?}", linux_dir);
            return Some(LinuxImages { rootfs, kernel_image });
        }
        debug!("Skipping incomplete image directory {:?}", linux_dir);
    }

    None
}

/// Fill whichever of `rootfs` / `kernel_image` the caller left unset.
pub fn resolve_linux_images(
    platform: &Path,
    images_subdir: &Path,
    rootfs: Option<PathBuf>,
    kernel_image: Option<PathBuf>,
) -> (Option<PathBuf>, Option<PathBuf>) {
    if rootfs.is_some() && kernel_image.is_some() {
        return (rootfs, kernel_image);
    }

    match detect_linux_images(platform, images_subdir) {
        Some(found) => (
            rootfs.or(Some(found.rootfs)),
            kernel_image.or(Some(found.kernel_image)),
        ),
        None => (rootfs, kernel_image),
    }
}
