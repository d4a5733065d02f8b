use crate::core::{ProcessOutcome, Stage, ToolCommand};
use crate::error::{exit_code_label, Result, RunnerError};
use async_trait::async_trait;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

const DIAGNOSTIC_KEYWORDS: [&str; 3] = ["error", "warning", "critical"];
const HEADER_RULE_WIDTH: usize = 60;

/// Whether a toolchain output line should be surfaced live.
pub fn is_diagnostic(line: &str) -> bool {
    let lower = line.to_lowercase();
    DIAGNOSTIC_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Receives the keyword-filtered lines of a running tool.
pub trait DiagnosticRelay: Send + Sync {
    fn relay(&self, stage: Stage, line: &str);
}

/// Emits each diagnostic line as a tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRelay;

impl DiagnosticRelay for TracingRelay {
    fn relay(&self, stage: Stage, line: &str) {
        warn!(%stage, ">> {}", line);
    }
}

/// Forwards diagnostic lines to a channel the caller drains concurrently.
#[derive(Debug, Clone)]
pub struct ChannelRelay {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelRelay {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DiagnosticRelay for ChannelRelay {
    fn relay(&self, _stage: Stage, line: &str) {
        // A dropped receiver only means nobody is watching anymore.
        let _ = self.tx.send(line.to_string());
    }
}

#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Run `command` to completion, appending its output to `log_path`.
    async fn invoke(&self, stage: Stage, command: &ToolCommand, log_path: &Path) -> Result<ProcessOutcome>;
}

/// Full-transcript consumer: appends every line to the shared build log.
pub struct LogSink {
    file: File,
    path: PathBuf,
}

impl LogSink {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path).await?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub async fn write_header(&mut self, command: &ToolCommand) -> Result<()> {
        let rule = "=".repeat(HEADER_RULE_WIDTH);
        let header = format!("\n{}\n$ {}\n{}\n", rule, command, rule);
        self.file.write_all(header.as_bytes()).await?;
        Ok(())
    }

    pub async fn record(&mut self, line: &str) -> Result<()> {
        self.file.write_all(line.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        Ok(())
    }

    pub async fn finish(mut self) -> Result<PathBuf> {
        self.file.flush().await?;
        Ok(self.path)
    }
}

/// Runs the toolchain as a real child process.
#[derive(Clone)]
pub struct ProcessInvoker {
    relay: Arc<dyn DiagnosticRelay>,
}

impl Default for ProcessInvoker {
    fn default() -> Self {
        Self::new(Arc::new(TracingRelay))
    }
}

impl ProcessInvoker {
    pub fn new(relay: Arc<dyn DiagnosticRelay>) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl ToolInvoker for ProcessInvoker {
    async fn invoke(&self, stage: Stage, command: &ToolCommand, log_path: &Path) -> Result<ProcessOutcome> {
        let mut sink = LogSink::open(log_path).await?;
        sink.write_header(command).await?;

        debug!("Spawning: {}", command);
        // stdout and stderr share one pipe so the log keeps the order the tool wrote in.
        let (reader, writer) = io::pipe()?;
        let mut child = {
            let mut process = Command::new(&command.program);
            process
                .args(&command.args)
                .stdin(Stdio::null())
                .stdout(Stdio::from(writer.try_clone()?))
                .stderr(Stdio::from(writer))
                .kill_on_drop(true);
            process.spawn()?
        };

        let (tx, mut lines) = mpsc::unbounded_channel();
        let reader_task = tokio::task::spawn_blocking(move || forward_lines(reader, tx));

        let pumped: Result<(usize, usize)> = async {
            let mut line_count = 0;
            let mut diagnostic_count = 0;
            while let Some(line) = lines.recv().await {
                sink.record(&line).await?;
                line_count += 1;
                if is_diagnostic(&line) {
                    diagnostic_count += 1;
                    self.relay.relay(stage, line.trim());
                }
            }
            Ok((line_count, diagnostic_count))
        }
        .await;

        let (line_count, diagnostic_count) = match pumped {
            Ok(counts) => counts,
            Err(e) => {
                error!("Could not record output of {}: {}", command, e);
                // Kill and reap before bailing out.
                let _ = child.kill().await;
                return Err(e);
            }
        };

        let status = child.wait().await?;
        reader_task.await.map_err(io::Error::other)??;
        let log_path = sink.finish().await?;

        match status.code() {
            Some(0) => Ok(ProcessOutcome {
                line_count,
                diagnostic_count,
            }),
            code => {
                error!(
                    "Build failed (rc={}). Full log: {:?}",
                    exit_code_label(&code),
                    log_path
                );
                Err(RunnerError::ExternalProcessFailure {
                    stage,
                    exit_code: code,
                    command: command.to_string(),
                    log_path,
                })
            }
        }
    }
}

/// Read `reader` line by line (lossy UTF-8) and push each line into `tx`.
fn forward_lines<R: Read>(reader: R, tx: mpsc::UnboundedSender<String>) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if tx.send(line.to_string()).is_err() {
            return Ok(());
        }
    }
}
