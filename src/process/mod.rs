use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// A program name plus its ordered argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl std::fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs external programs to completion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `invocation`, wiring the child's standard streams to `stdout` and `stderr`.
    ///
    /// Fails if the program cannot be launched or exits unsuccessfully.
    async fn execute(&self, invocation: &CommandInvocation, stdout: Stdio, stderr: Stdio) -> io::Result<()>;
}

/// Executor backed by the operating system's process launcher
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn execute(&self, invocation: &CommandInvocation, stdout: Stdio, stderr: Stdio) -> io::Result<()> {
        tracing::debug!("Running: {}", invocation);

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status()
            .await?;

        if !status.success() {
            return Err(io::Error::other(format!("{} exited with {}", invocation.program, status)));
        }

        Ok(())
    }
}

/// Resolves program names against the executable search path
#[cfg_attr(test, mockall::automock)]
pub trait CommandChecker: Send + Sync {
    /// Return the location of `name` if it can be run, `None` otherwise
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

/// Checker that looks programs up on `PATH` (honouring `PATHEXT` on Windows)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemChecker;

impl CommandChecker for SystemChecker {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        match which::which(name) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("{} is not on PATH: {}", name, e);
                None
            }
        }
    }
}
