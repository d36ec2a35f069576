//! Checker tasks: one external process per file, driven without blocking the control loop.

use crossbeam_channel::Sender;
use log::{debug, warn};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::engine::output::OutputParser;
use crate::error::LintError;
use crate::utils::config::SchedulerConsts;
use crate::{CheckerConfig, Diagnostic, FileRef};

/// What a finished task concluded about its file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed(Diagnostic),
}

/// One in-flight check. Every method must return promptly.
pub trait CheckTask {
    fn file(&self) -> &FileRef;

    /// Non-blocking status poll.
    fn is_running(&mut self) -> bool;

    /// Outcome of the check. Only meaningful once `is_running` returned false.
    fn verdict(&mut self) -> Verdict;

    /// Terminate and reap the task, returning whatever output it produced.
    fn kill(&mut self) -> String;
}

/// Starts checks. `done` receives a message whenever a task is likely to have finished, so the
/// scheduler can sleep on it instead of spinning; sending is optional.
pub trait Checker {
    fn start(&self, file: &FileRef, done: Sender<()>) -> Result<Box<dyn CheckTask>, LintError>;
}

/// Runs `program args... <file>` for every file.
#[derive(Clone, Debug)]
pub struct ProcessChecker {
    program: String,
    args: Vec<String>,
    parser: Arc<OutputParser>,
}

impl Default for ProcessChecker {
    fn default() -> Self {
        let config = CheckerConfig::default();
        Self {
            program: config.program,
            args: config.args,
            parser: Arc::new(OutputParser::default()),
        }
    }
}

impl ProcessChecker {
    pub fn from_config(config: &CheckerConfig) -> Result<Self, LintError> {
        Ok(Self {
            program: config.program.clone(),
            args: config.args.clone(),
            parser: Arc::new(OutputParser::from_config(config)?),
        })
    }
}

impl Checker for ProcessChecker {
    fn start(&self, file: &FileRef, done: Sender<()>) -> Result<Box<dyn CheckTask>, LintError> {
        ProcessTask::start(self, file, done).map(|t| Box::new(t) as Box<dyn CheckTask>)
    }
}

enum TaskState {
    Running,
    /// The checker exited; waiting for the reader to hit EOF.
    Draining { success: bool },
    Exited { success: bool, output: String },
    Killed,
}

/// A checker process whose stdout and stderr share one pipe, drained by a reader thread so a
/// chatty checker can never block on a full pipe buffer.
///
/// On Unix the checker leads its own process group, so anything it forks is killed with it and
/// cannot keep the pipe open after the checker is gone.
pub struct ProcessTask {
    file: FileRef,
    child: Child,
    reader: Option<JoinHandle<Vec<u8>>>,
    parser: Arc<OutputParser>,
    state: TaskState,
    wait_error: Option<String>,
}

impl ProcessTask {
    pub fn start(
        checker: &ProcessChecker,
        file: &FileRef,
        done: Sender<()>,
    ) -> Result<Self, LintError> {
        let spawn_err = |source| LintError::Spawn {
            path: file.path.clone(),
            source,
        };
        let (mut pipe_reader, pipe_writer) = os_pipe::pipe().map_err(spawn_err)?;
        let pipe_writer_err = pipe_writer.try_clone().map_err(spawn_err)?;

        let mut command = Command::new(&checker.program);
        command
            .args(&checker.args)
            .arg(&file.path)
            .stdin(Stdio::null())
            .stdout(pipe_writer)
            .stderr(pipe_writer_err);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let child = command.spawn().map_err(spawn_err)?;
        // The Command holds the write ends; drop it so the reader sees EOF when the child exits.
        drop(command);
        debug!("started checker pid {} for {}", child.id(), file.key);

        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe_reader.read_to_end(&mut buf);
            let _ = done.send(());
            buf
        });

        Ok(Self {
            file: file.clone(),
            child,
            reader: Some(reader),
            parser: Arc::clone(&checker.parser),
            state: TaskState::Running,
            wait_error: None,
        })
    }

    /// SIGKILL the checker's process group. A group that is already gone is not an error.
    #[cfg(unix)]
    fn kill_group(&self) {
        let Ok(pgid) = libc::pid_t::try_from(self.child.id()) else {
            return;
        };
        // SAFETY: killpg takes plain integers; the group was created for this child only.
        unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }

    #[cfg(not(unix))]
    fn kill_group(&self) {}

    fn reader_finished(&self) -> bool {
        self.reader.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Join the reader thread. Only called once it finished, so this never blocks.
    fn collect_output(&mut self) -> String {
        let bytes = self
            .reader
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        let mut output = String::from_utf8_lossy(&bytes).into_owned();
        if let Some(e) = self.wait_error.take() {
            output.push_str(&e);
        }
        output
    }

    /// After a kill, give the reader a short grace period to reach EOF. A pipe still held
    /// open by something outside the process group is abandoned along with its output.
    fn collect_output_after_kill(&mut self) -> String {
        let deadline = Instant::now() + SchedulerConsts::KILL_GRACE;
        while !self.reader_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        if self.reader_finished() {
            return self.collect_output();
        }
        debug!("output pipe for {} still open after kill, detaching reader", self.file.key);
        self.reader = None;
        self.wait_error.take().unwrap_or_default()
    }

    /// Valid once the task finished: true iff the checker reported invalid syntax.
    pub fn has_syntax_error(&self) -> bool {
        match &self.state {
            TaskState::Running | TaskState::Draining { .. } => false,
            TaskState::Exited { success, output } => self.parser.is_failure(*success, output),
            TaskState::Killed => true,
        }
    }

    /// Diagnostic for a failed check; None if the check passed or is still running.
    pub fn syntax_error(&self) -> Option<Diagnostic> {
        if !self.has_syntax_error() {
            return None;
        }
        let output = match &self.state {
            TaskState::Exited { output, .. } => output.clone(),
            _ => String::new(),
        };
        let (line, message) = self.parser.parse(&output);
        Some(Diagnostic::syntax(&self.file, line, message, output))
    }
}

impl CheckTask for ProcessTask {
    fn file(&self) -> &FileRef {
        &self.file
    }

    fn is_running(&mut self) -> bool {
        let success = match self.state {
            TaskState::Running => match self.child.try_wait() {
                Ok(None) => return true,
                Ok(Some(status)) => status.success(),
                Err(e) => {
                    warn!("lost track of checker for {}: {}", self.file.key, e);
                    let _ = self.child.kill();
                    let _ = self.child.wait();
                    self.wait_error = Some(e.to_string());
                    false
                }
            },
            TaskState::Draining { success } => success,
            _ => return false,
        };
        if matches!(self.state, TaskState::Running) {
            // Leftover background children would otherwise hold the pipe open.
            self.kill_group();
            self.state = TaskState::Draining { success };
        }
        if !self.reader_finished() {
            return true;
        }
        let output = self.collect_output();
        self.state = TaskState::Exited { success, output };
        false
    }

    fn verdict(&mut self) -> Verdict {
        match self.syntax_error() {
            Some(diag) => Verdict::Failed(diag),
            None => Verdict::Passed,
        }
    }

    fn kill(&mut self) -> String {
        match &self.state {
            TaskState::Exited { output, .. } => return output.clone(),
            TaskState::Killed => return String::new(),
            TaskState::Running | TaskState::Draining { .. } => {}
        }
        self.kill_group();
        let _ = self.child.kill();
        let _ = self.child.wait();
        let output = self.collect_output_after_kill();
        self.state = TaskState::Killed;
        output
    }
}

impl Drop for ProcessTask {
    fn drop(&mut self) {
        if matches!(self.state, TaskState::Running | TaskState::Draining { .. }) {
            self.kill_group();
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
