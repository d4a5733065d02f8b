use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vpp_runner::{BuildDirectory, RunnerError, Target};

#[test]
fn test_paths_are_distinct_and_contained() {
    let root = Path::new("/builds");
    for kernel in ["vadd", "krnl_custom", "mmult"] {
        for target in ["hw_emu", "hw"] {
            let layout = BuildDirectory::resolve(root, kernel, target).unwrap();
            let paths = layout.artifact_paths();

            let unique: HashSet<_> = paths.iter().collect();
            assert_eq!(unique.len(), 6);
            for path in paths {
                assert_eq!(path.parent(), Some(layout.dir.as_path()));
            }
            assert_eq!(layout.dir, root.join(format!("{}_{}", kernel, target)));
        }
    }
}

#[test]
fn test_artifact_names() {
    let layout = BuildDirectory::resolve(Path::new("/b"), "vadd", "hw_emu").unwrap();

    assert_eq!(layout.target, Target::Emulated);
    assert_eq!(layout.source_path, Path::new("/b/vadd_hw_emu/vadd.cpp"));
    assert_eq!(layout.object_path, Path::new("/b/vadd_hw_emu/vadd.xo"));
    assert_eq!(layout.archive_path, Path::new("/b/vadd_hw_emu/vadd.xsa"));
    assert_eq!(layout.binary_path, Path::new("/b/vadd_hw_emu/vadd.xclbin"));
    assert_eq!(layout.log_path, Path::new("/b/vadd_hw_emu/build.log"));
    assert_eq!(layout.package_dir, Path::new("/b/vadd_hw_emu/package"));
}

#[test]
fn test_resolution_is_deterministic() {
    let a = BuildDirectory::resolve(Path::new("/b"), "vadd", "hw").unwrap();
    let b = BuildDirectory::resolve(Path::new("/b"), "vadd", "hw").unwrap();
    let other = BuildDirectory::resolve(Path::new("/b"), "vadd", "hw_emu").unwrap();

    assert_eq!(a, b);
    assert_ne!(a.dir, other.dir);
}

#[test]
fn test_target_aliases() {
    assert_eq!("emulated".parse::<Target>().unwrap(), Target::Emulated);
    assert_eq!("hardware".parse::<Target>().unwrap(), Target::Hardware);
    assert_eq!(Target::Hardware.to_string(), "hw");

    let layout = BuildDirectory::resolve(Path::new("/b"), "vadd", "hardware").unwrap();
    assert_eq!(layout.dir, Path::new("/b/vadd_hw"));
}

#[test]
fn test_unknown_target_is_rejected() {
    for target in ["sw_emu", "HW", ""] {
        let err = BuildDirectory::resolve(Path::new("/b"), "vadd", target).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidConfiguration(_)), "target {:?}", target);
    }
}

#[test]
fn test_unusable_kernel_names_are_rejected() {
    for kernel in ["", ".", "..", "a/b", "/abs", "a\\b"] {
        let err = BuildDirectory::resolve(Path::new("/b"), kernel, "hw").unwrap_err();
        assert!(matches!(err, RunnerError::InvalidConfiguration(_)), "kernel {:?}", kernel);
    }
}

#[tokio::test]
async fn test_prepare_creates_package_dir() {
    let temp_dir = TempDir::new().unwrap();
    let layout = BuildDirectory::resolve(temp_dir.path(), "vadd", "hw_emu").unwrap();
    assert!(!layout.dir.exists());

    layout.prepare(false).await.unwrap();

    assert!(layout.dir.is_dir());
    assert!(layout.package_dir.is_dir());
}

#[tokio::test]
async fn test_prepare_clean_wipes_previous_contents() {
    let temp_dir = TempDir::new().unwrap();
    let layout = BuildDirectory::resolve(temp_dir.path(), "vadd", "hw").unwrap();
    fs::create_dir_all(layout.package_dir.join("sd_card")).unwrap();
    fs::write(layout.dir.join("stale.txt"), "old").unwrap();

    layout.prepare(false).await.unwrap();
    assert!(layout.dir.join("stale.txt").exists());

    layout.prepare(true).await.unwrap();
    assert!(!layout.dir.join("stale.txt").exists());
    assert!(!layout.package_dir.join("sd_card").exists());
    assert!(layout.package_dir.is_dir());
}
