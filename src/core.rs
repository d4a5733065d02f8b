use crate::error::RunnerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    #[serde(rename = "hw_emu")]
    Emulated,
    #[serde(rename = "hw")]
    Hardware,
}

impl Target {
    /// Spelling expected by the toolchain's `-t` flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Emulated => "hw_emu",
            Target::Hardware => "hw",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hw_emu" | "emulated" => Ok(Target::Emulated),
            "hw" | "hardware" => Ok(Target::Hardware),
            other => Err(RunnerError::InvalidConfiguration(format!(
                "target must be 'hw_emu' or 'hw', got '{}'",
                other
            ))),
        }
    }
}

/// The three toolchain invocations of one build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Compile,
    Link,
    Package,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Compile, Stage::Link, Stage::Package];

    pub fn mode_flag(&self) -> &'static str {
        match self {
            Stage::Compile => "-c",
            Stage::Link => "-l",
            Stage::Package => "-p",
        }
    }

    /// 1-based position, used for `[n/3]` progress lines.
    pub fn ordinal(&self) -> usize {
        match self {
            Stage::Compile => 1,
            Stage::Link => 2,
            Stage::Package => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Compile => "compile",
            Stage::Link => "link",
            Stage::Package => "package",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub source_text: String,
    pub kernel_name: String,
    pub target: String,
    #[serde(default)]
    pub clock_hz: Option<u64>,
    #[serde(default)]
    pub extra_flags: Vec<String>,
    #[serde(default)]
    pub clean: bool,
}

impl BuildRequest {
    pub fn new(source_text: impl Into<String>, kernel_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            kernel_name: kernel_name.into(),
            target: target.into(),
            clock_hz: None,
            extra_flags: Vec::new(),
            clean: false,
        }
    }

    pub fn with_clock_hz(mut self, clock_hz: u64) -> Self {
        self.clock_hz = Some(clock_hz);
        self
    }

    pub fn with_extra_flags(mut self, flags: Vec<String>) -> Self {
        self.extra_flags = flags;
        self
    }

    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResult {
    pub binary_path: PathBuf,
    pub byte_size: u64,
    pub elapsed_seconds: f64,
    pub log_path: PathBuf,
}

/// One external command line: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Summary of a successful invocation; nonzero exits surface as errors instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub line_count: usize,
    pub diagnostic_count: usize,
}
