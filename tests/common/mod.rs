#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const STUB_TEMPLATE: &str = r#"#!/bin/sh
mode="$1"
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
printf '%s\n' "$mode" >> "@CALLS@"
echo "INFO: [v++ 60-1306] stub running $mode"
echo "WARNING: [v++ 17-1] stub warning for $mode" >&2
if [ "$mode" = "@FAIL@" ]; then
  echo "ERROR: [v++ 60-399] stub failure in $mode" >&2
  exit 3
fi
if [ "$mode" != "@SKIP@" ]; then
  printf 'artifact from %s\n' "$mode" > "$out"
fi
exit 0
"#;

/// How the fake compiler should misbehave, if at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBehavior {
    /// Mode flag (`-c`, `-l`, `-p`) that exits with code 3.
    pub fail_mode: Option<&'static str>,
    /// Mode flag that exits 0 without writing its `-o` output.
    pub skip_output_mode: Option<&'static str>,
}

pub struct TestToolchain {
    pub compiler: PathBuf,
    pub platform: PathBuf,
    pub build_root: PathBuf,
    pub calls_path: PathBuf,
}

impl TestToolchain {
    pub fn new(dir: &Path, behavior: StubBehavior) -> Self {
        let bin_dir = dir.join("bin");
        fs::create_dir_all(&bin_dir).unwrap();
        let calls_path = dir.join("invocations.txt");

        let script = STUB_TEMPLATE
            .replace("@CALLS@", &calls_path.to_string_lossy())
            .replace("@FAIL@", behavior.fail_mode.unwrap_or("none"))
            .replace("@SKIP@", behavior.skip_output_mode.unwrap_or("none"));
        let compiler = bin_dir.join("v++");
        fs::write(&compiler, script).unwrap();
        fs::set_permissions(&compiler, fs::Permissions::from_mode(0o755)).unwrap();

        let platform_dir = dir.join("platforms").join("custom");
        fs::create_dir_all(&platform_dir).unwrap();
        let platform = platform_dir.join("custom.xpfm");
        fs::write(&platform, "<platform/>").unwrap();

        Self {
            compiler,
            platform,
            build_root: dir.join("builds"),
            calls_path,
        }
    }

    /// Mode flags the stub has been invoked with, in order.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.calls_path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

pub const VADD_SOURCE: &str = r#"extern "C" void vadd(const int* a, const int* b, int* c, int n) {
    for (int i = 0; i < n; ++i) c[i] = a[i] + b[i];
}
"#;
