use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use crate::config::Config;
use crate::process::{CommandExecutor, CommandInvocation, SystemExecutor};
use crate::{Error, Result};

/// Name of the download tool on the search path
pub const YT_DLP: &str = "yt-dlp";

/// Trait for fetching media and locating the converted files
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` and convert it according to the configuration
    async fn download(&self, url: &str) -> Result<()>;

    /// List the converted files currently in the output directory
    fn output_files(&self) -> Result<Vec<PathBuf>>;
}

/// Downloader that delegates fetching and transcoding to yt-dlp
pub struct YtDlpDownloader {
    config: Config,
    executor: Box<dyn CommandExecutor>,
}

impl YtDlpDownloader {
    /// Create a downloader that spawns real yt-dlp processes
    pub fn new(config: Config) -> Self {
        Self::with_executor(config, Box::new(SystemExecutor))
    }

    pub fn with_executor(config: Config, executor: Box<dyn CommandExecutor>) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the yt-dlp arguments; the URL is always last
    pub fn build_args(&self, url: &str) -> Vec<String> {
        vec![
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            self.config.audio_format().to_string(),
            "--audio-quality".to_string(),
            self.config.audio_quality().to_string(),
            "--postprocessor-args".to_string(),
            format!("ffmpeg:-b:a {}", self.config.bitrate()),
            "-o".to_string(),
            self.config.output_template().to_string(),
            url.to_string(),
        ]
    }

    pub fn build_invocation(&self, url: &str) -> CommandInvocation {
        CommandInvocation::new(YT_DLP, self.build_args(url))
    }

    fn matches_format(&self, file_name: &str) -> bool {
        file_name
            .strip_suffix(self.config.audio_format())
            .is_some_and(|stem| stem.ends_with('.'))
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn download(&self, url: &str) -> Result<()> {
        let output_dir = self.config.output_dir();
        fs_err::create_dir_all(output_dir).map_err(|source| Error::DirectoryCreation {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let invocation = self.build_invocation(url);
        tracing::info!("Downloading {} into {}", url, output_dir.display());

        self.executor
            .execute(&invocation, Stdio::inherit(), Stdio::inherit())
            .await
            .map_err(Error::DownloadFailed)
    }

    fn output_files(&self) -> Result<Vec<PathBuf>> {
        let output_dir = self.config.output_dir();
        let pattern = self.config.output_pattern();

        // Only a malformed pattern is an error; unreadable directories just have no matches
        if let Some(invalid) = self.config.audio_format().chars().find(|c| is_pattern_char(*c)) {
            return Err(Error::FileLookup {
                pattern,
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("audio format contains {:?}", invalid),
                ),
            });
        }

        let entries = match fs_err::read_dir(output_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("No files matching {}: {}", pattern, e);
                return Ok(Vec::new());
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.file_name()),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry in {}: {}", output_dir.display(), e);
                    None
                }
            })
            .filter(|file_name| self.matches_format(&file_name.to_string_lossy()))
            .map(|file_name| output_dir.join(file_name))
            .collect();
        files.sort();

        tracing::debug!("Found {} file(s) matching {}", files.len(), pattern);
        Ok(files)
    }
}

/// Characters that would turn the extension into something other than a literal file-name suffix
fn is_pattern_char(c: char) -> bool {
    matches!(c, '*' | '?' | '[' | ']' | '\\') || std::path::is_separator(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockCommandExecutor;
    use std::sync::{Arc, Mutex};
    use tokio_test::{assert_err, assert_ok};

    const URL: &str = "https://www.youtube.com/watch?v=test123";

    fn succeeding_executor() -> MockCommandExecutor {
        let mut executor = MockCommandExecutor::new();
        executor.expect_execute().returning(|_, _, _| Ok(()));
        executor
    }

    #[test]
    fn test_build_args_order() {
        let config = Config::new();
        let downloader = YtDlpDownloader::new(config.clone());
        let args = downloader.build_args(URL);

        let expected = [
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--audio-quality",
            "0",
            "--postprocessor-args",
            "ffmpeg:-b:a 320k",
            "-o",
            config.output_template(),
            URL,
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn test_url_is_last_argument() {
        let downloader = YtDlpDownloader::new(Config::new());
        for url in ["https://youtu.be/abc", "", "not a url at all"] {
            let invocation = downloader.build_invocation(url);
            assert_eq!(invocation.program, "yt-dlp");
            assert_eq!(invocation.args.len(), 10);
            assert_eq!(invocation.args.last().map(String::as_str), Some(url));
        }
    }

    #[test]
    fn test_postprocessor_args_follow_bitrate() {
        for bitrate in ["128k", "256k", ""] {
            let downloader = YtDlpDownloader::new(Config::new().with_bitrate(bitrate));
            let args = downloader.build_args(URL);
            assert_eq!(args[6], format!("ffmpeg:-b:a {}", bitrate));
        }
    }

    #[tokio::test]
    async fn test_download_runs_yt_dlp() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_output_dir(temp_dir.path()).with_bitrate("256k");
        let expected_args = YtDlpDownloader::new(config.clone()).build_args(URL);

        let mut executor = MockCommandExecutor::new();
        executor
            .expect_execute()
            .withf(move |invocation, _, _| invocation.program == "yt-dlp" && invocation.args == expected_args)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let downloader = YtDlpDownloader::with_executor(config, Box::new(executor));
        assert_ok!(downloader.download(URL).await);
        assert!(temp_dir.path().is_dir());
    }

    #[tokio::test]
    async fn test_download_failure_is_wrapped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_execute()
            .times(1)
            .returning(|_, _, _| Err(io::Error::other("download error")));

        let config = Config::new().with_output_dir(temp_dir.path());
        let downloader = YtDlpDownloader::with_executor(config, Box::new(executor));

        let err = assert_err!(downloader.download(URL).await);
        assert!(matches!(err, Error::DownloadFailed(_)));
        let message = err.to_string();
        assert!(message.contains("download failed"));
        assert!(message.contains("download error"));
    }

    #[tokio::test]
    async fn test_download_creates_missing_directory_even_on_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_dir = temp_dir.path().join("nested").join("output");

        let mut executor = MockCommandExecutor::new();
        executor
            .expect_execute()
            .returning(|_, _, _| Err(io::Error::other("exit status: 1")));

        let config = Config::new().with_output_dir(&output_dir);
        let downloader = YtDlpDownloader::with_executor(config, Box::new(executor));

        assert!(downloader.download(URL).await.is_err());
        assert!(output_dir.is_dir());
    }

    #[tokio::test]
    async fn test_download_reports_directory_creation_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("occupied");
        fs_err::write(&blocker, "a file, not a directory").unwrap();

        let mut executor = MockCommandExecutor::new();
        executor.expect_execute().never();

        let config = Config::new().with_output_dir(blocker.join("output"));
        let downloader = YtDlpDownloader::with_executor(config, Box::new(executor));

        let err = assert_err!(downloader.download(URL).await);
        assert!(matches!(err, Error::DirectoryCreation { .. }));
    }

    #[tokio::test]
    async fn test_download_passes_invocation_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let mut executor = MockCommandExecutor::new();
        executor.expect_execute().returning(move |invocation, _, _| {
            recorder.lock().unwrap().push(invocation.clone());
            Ok(())
        });

        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_output_dir(temp_dir.path());
        let downloader = YtDlpDownloader::with_executor(config, Box::new(executor));
        downloader.download(URL).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], downloader.build_invocation(URL));
    }

    #[test]
    fn test_output_files_filters_by_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["b.mp3", "a.mp3", "c.mp4", "notes.mp3.txt"] {
            fs_err::write(temp_dir.path().join(name), "test").unwrap();
        }

        let config = Config::new().with_output_dir(temp_dir.path());
        let downloader = YtDlpDownloader::with_executor(config, Box::new(succeeding_executor()));

        let files = downloader.output_files().unwrap();
        assert_eq!(
            files,
            vec![temp_dir.path().join("a.mp3"), temp_dir.path().join("b.mp3")]
        );
    }

    #[test]
    fn test_output_files_empty_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_output_dir(temp_dir.path());
        let downloader = YtDlpDownloader::new(config);

        assert!(downloader.output_files().unwrap().is_empty());
    }

    #[test]
    fn test_output_files_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_output_dir(temp_dir.path().join("never-created"));
        let downloader = YtDlpDownloader::new(config);

        assert!(downloader.output_files().unwrap().is_empty());
    }

    #[test]
    fn test_output_files_on_a_file_path_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let not_a_dir = temp_dir.path().join("song.mp3");
        fs_err::write(&not_a_dir, "test").unwrap();

        let downloader = YtDlpDownloader::new(Config::new().with_output_dir(&not_a_dir));
        let files = assert_ok!(downloader.output_files());
        assert!(files.is_empty());
    }

    #[test]
    fn test_output_files_rejects_malformed_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs_err::write(temp_dir.path().join("a.mp3"), "test").unwrap();

        for format in ["mp[3", "*", "mp3/x"] {
            let config = Config::new().with_output_dir(temp_dir.path()).with_audio_format(format);
            let downloader = YtDlpDownloader::new(config);

            let err = assert_err!(downloader.output_files());
            assert!(matches!(err, Error::FileLookup { .. }), "format {:?}", format);
        }
    }

    #[test]
    fn test_output_files_with_other_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["a.mp3", "b.m4a"] {
            fs_err::write(temp_dir.path().join(name), "test").unwrap();
        }

        let config = Config::new().with_output_dir(temp_dir.path()).with_audio_format("m4a");
        let downloader = YtDlpDownloader::new(config);

        assert_eq!(downloader.output_files().unwrap(), vec![temp_dir.path().join("b.m4a")]);
    }
}
