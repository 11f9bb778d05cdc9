//! Process runner for external tools.
//!
//! Handles command execution, stderr collection and error mapping, plus
//! the two-stage producer/consumer pipe used for MIDI rendering.

use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::logging::RunLogger;

use super::types::{ToolError, ToolResult};

/// How often a bounded wait polls the child.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs external commands and reports through the run logger.
#[derive(Clone)]
pub struct ToolRunner {
    logger: Arc<RunLogger>,
    timeout: Option<Duration>,
}

impl ToolRunner {
    /// Create a runner that waits for tools without a deadline.
    pub fn new(logger: Arc<RunLogger>) -> Self {
        Self {
            logger,
            timeout: None,
        }
    }

    /// Kill tools that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a command to completion.
    ///
    /// stdin and stdout are discarded; stderr is collected into the
    /// logger's tail buffer and shown if the tool fails.
    pub fn run(&self, mut cmd: Command) -> ToolResult<()> {
        let tool = tool_name(&cmd);
        self.logger.command(&describe_command(&cmd));
        self.logger.clear_tail();

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| ToolError::spawn(&tool, e))?;
        let stderr = collect_stderr(&mut child);

        // A killed tool's own children may still hold stderr open, so the
        // collector is only joined once the tool exited by itself.
        let status = self.wait(&mut child, &tool)?;
        let lines = join_stderr(stderr);
        self.check(&tool, status, &lines)
    }

    /// Run `producer | consumer`.
    ///
    /// Both processes run concurrently. Bytes from the producer's stdout are
    /// pumped into the consumer's stdin on a helper thread. The consumer's
    /// stdin is the only write end of the stream: it is dropped exactly
    /// once, after the producer has finished, and only then is the consumer
    /// awaited.
    pub fn run_piped(&self, mut producer: Command, mut consumer: Command) -> ToolResult<()> {
        let producer_tool = tool_name(&producer);
        let consumer_tool = tool_name(&consumer);
        self.logger.command(&format!(
            "{} | {}",
            describe_command(&producer),
            describe_command(&consumer)
        ));
        self.logger.clear_tail();

        producer
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        consumer
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut stage_a = producer
            .spawn()
            .map_err(|e| ToolError::spawn(&producer_tool, e))?;
        let mut stage_b = match consumer.spawn() {
            Ok(child) => child,
            Err(e) => {
                kill_quietly(&mut stage_a);
                return Err(ToolError::spawn(&consumer_tool, e));
            }
        };

        let a_stderr = collect_stderr(&mut stage_a);
        let b_stderr = collect_stderr(&mut stage_b);

        let (source, sink) = match (stage_a.stdout.take(), stage_b.stdin.take()) {
            (Some(source), Some(sink)) => (source, sink),
            _ => {
                kill_quietly(&mut stage_a);
                kill_quietly(&mut stage_b);
                return Err(ToolError::io(
                    &producer_tool,
                    io::Error::new(io::ErrorKind::BrokenPipe, "pipe handles unavailable"),
                ));
            }
        };
        let pump = spawn_pump(source, sink);

        let a_status = match self.wait(&mut stage_a, &producer_tool) {
            Ok(status) => status,
            Err(e) => {
                // The pump and collectors are left detached; they end once
                // every process holding the pipes has exited.
                kill_quietly(&mut stage_b);
                drop((pump, a_stderr, b_stderr));
                return Err(e);
            }
        };

        let (pumped, write_end) = match pump.join() {
            Ok(result) => result,
            Err(_) => {
                kill_quietly(&mut stage_b);
                return Err(ToolError::io(
                    &producer_tool,
                    io::Error::new(io::ErrorKind::Other, "pipe thread panicked"),
                ));
            }
        };
        // Producer is done: close the stream so the consumer sees EOF.
        drop(write_end);

        let b_status = self.wait(&mut stage_b, &consumer_tool)?;
        let a_lines = join_stderr(a_stderr);
        let b_lines = join_stderr(b_stderr);

        // The consumer's own failure explains a broken pipe better than the
        // producer's, so it is reported first.
        self.check(&consumer_tool, b_status, &b_lines)?;
        self.check(&producer_tool, a_status, &a_lines)?;
        match pumped {
            Ok(bytes) => {
                tracing::debug!("Piped {} bytes from {} to {}", bytes, producer_tool, consumer_tool);
                Ok(())
            }
            Err(e) => Err(ToolError::io(&producer_tool, e)),
        }
    }

    /// Wait for a child, honoring the timeout if one is set.
    fn wait(&self, child: &mut Child, tool: &str) -> ToolResult<ExitStatus> {
        let Some(limit) = self.timeout else {
            return child.wait().map_err(|e| ToolError::io(tool, e));
        };

        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait().map_err(|e| ToolError::io(tool, e))? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                kill_quietly(child);
                return Err(ToolError::TimedOut {
                    tool: tool.to_string(),
                    limit,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Feed stderr to the logger and map a failed status to an error.
    fn check(&self, tool: &str, status: ExitStatus, stderr: &[String]) -> ToolResult<()> {
        for line in stderr {
            self.logger.output_line(line);
        }

        if status.success() {
            return Ok(());
        }

        self.logger.show_tail(tool);
        let message = stderr
            .iter()
            .rev()
            .find(|line| !line.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| "no error output".to_string());
        Err(ToolError::failed(tool, status.code().unwrap_or(-1), message))
    }
}

/// Render a command line for logs.
pub fn describe_command(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    for arg in cmd.get_args() {
        let arg = arg.to_string_lossy();
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            parts.push(format!("\"{}\"", arg));
        } else {
            parts.push(arg.to_string());
        }
    }
    parts.join(" ")
}

/// Short tool name (file name of the program).
fn tool_name(cmd: &Command) -> String {
    let program = cmd.get_program();
    Path::new(program)
        .file_name()
        .unwrap_or(program)
        .to_string_lossy()
        .to_string()
}

/// Copy the producer's output into the consumer, handing the write end back.
fn spawn_pump<R, W>(mut source: R, mut sink: W) -> JoinHandle<(io::Result<u64>, W)>
where
    R: Read + Send + 'static,
    W: io::Write + Send + 'static,
{
    thread::spawn(move || {
        let copied = io::copy(&mut source, &mut sink);
        (copied, sink)
    })
}

/// Start collecting a child's stderr on a helper thread.
fn collect_stderr(child: &mut Child) -> Option<JoinHandle<Vec<String>>> {
    let stderr = child.stderr.take()?;
    Some(thread::spawn(move || {
        BufReader::new(stderr)
            .lines()
            .map_while(Result::ok)
            .collect()
    }))
}

fn join_stderr(handle: Option<JoinHandle<Vec<String>>>) -> Vec<String> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn kill_quietly(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
