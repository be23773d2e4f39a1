use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "yt-mp3",
    about = "Download a video and convert its audio track to MP3",
    version,
    long_about = "Downloads a video with yt-dlp and converts its audio to a 320k MP3 with ffmpeg. Files are written to the ./output directory."
)]
pub struct Cli {
    /// Video URL to download (anything yt-dlp supports)
    #[arg(value_name = "URL")]
    pub url: String,
}
