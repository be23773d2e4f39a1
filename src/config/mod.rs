use std::path::{Path, PathBuf};

/// Placeholder pattern yt-dlp substitutes with the video title and extension
const FILENAME_TEMPLATE: &str = "%(title)s.%(ext)s";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory that receives the converted audio
    output_dir: PathBuf,

    /// Audio format passed to `--audio-format`
    audio_format: String,

    /// Audio quality passed to `--audio-quality` (0 is best)
    audio_quality: String,

    /// Bitrate handed to ffmpeg during post-processing
    bitrate: String,

    /// yt-dlp output template, always derived from `output_dir`
    output_template: String,
}

impl Default for Config {
    fn default() -> Self {
        let output_dir = PathBuf::from("output");
        Self {
            output_template: template_for(&output_dir),
            output_dir,
            audio_format: "mp3".to_string(),
            audio_quality: "0".to_string(),
            bitrate: "320k".to_string(),
        }
    }
}

impl Config {
    /// Create a configuration with the default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory and regenerate the output template.
    ///
    /// The directory is not validated; an empty path produces a template
    /// relative to the current directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self.output_template = template_for(&self.output_dir);
        self
    }

    /// Set the post-processing bitrate (e.g. `"192k"`)
    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.bitrate = bitrate.into();
        self
    }

    /// Set the audio format handed to yt-dlp and used to find converted files
    pub fn with_audio_format(mut self, format: impl Into<String>) -> Self {
        self.audio_format = format.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn audio_format(&self) -> &str {
        &self.audio_format
    }

    pub fn audio_quality(&self) -> &str {
        &self.audio_quality
    }

    pub fn bitrate(&self) -> &str {
        &self.bitrate
    }

    pub fn output_template(&self) -> &str {
        &self.output_template
    }

    /// Glob-style pattern describing the files a download produces
    pub fn output_pattern(&self) -> String {
        self.output_dir
            .join(format!("*.{}", self.audio_format))
            .to_string_lossy()
            .into_owned()
    }
}

fn template_for(dir: &Path) -> String {
    dir.join(FILENAME_TEMPLATE).to_string_lossy().into_owned()
}
