use crate::process::{CommandChecker, SystemChecker};
use crate::{Error, Result};

/// External tools the converter relies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    YtDlp,
    Ffmpeg,
}

impl Dependency {
    /// Checked in this order; the first missing tool aborts validation
    pub const REQUIRED: [Dependency; 2] = [Dependency::YtDlp, Dependency::Ffmpeg];

    pub fn command(&self) -> &'static str {
        match self {
            Dependency::YtDlp => "yt-dlp",
            Dependency::Ffmpeg => "ffmpeg",
        }
    }

    pub fn install_hint(&self) -> &'static str {
        match self {
            Dependency::YtDlp => "pip install yt-dlp or brew install yt-dlp",
            Dependency::Ffmpeg => "sudo apt install ffmpeg or brew install ffmpeg",
        }
    }
}

/// Verifies that required tools are resolvable on the search path
pub struct DependencyValidator {
    checker: Box<dyn CommandChecker>,
}

impl DependencyValidator {
    /// Create a validator that queries the real `PATH`
    pub fn new() -> Self {
        Self::with_checker(Box::new(SystemChecker))
    }

    pub fn with_checker(checker: Box<dyn CommandChecker>) -> Self {
        Self { checker }
    }

    /// Check yt-dlp, then ffmpeg, stopping at the first missing tool
    pub fn validate_dependencies(&self) -> Result<()> {
        Dependency::REQUIRED
            .iter()
            .try_for_each(|dependency| self.validate(*dependency))
    }

    pub fn validate_yt_dlp(&self) -> Result<()> {
        self.validate(Dependency::YtDlp)
    }

    pub fn validate_ffmpeg(&self) -> Result<()> {
        self.validate(Dependency::Ffmpeg)
    }

    fn validate(&self, dependency: Dependency) -> Result<()> {
        match self.checker.resolve(dependency.command()) {
            Some(path) => {
                tracing::debug!("Found {} at {}", dependency.command(), path.display());
                Ok(())
            }
            None => Err(Error::DependencyMissing {
                tool: dependency.command(),
                hint: dependency.install_hint(),
            }),
        }
    }
}

impl Default for DependencyValidator {
    fn default() -> Self {
        Self::new()
    }
}
