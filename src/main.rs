use anyhow::Result;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_mp3::utils;
use yt_mp3::{Cli, Config, DependencyValidator, Downloader, YtDlpDownloader};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yt_mp3=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // A missing URL exits with 1 like every other failure; --help and --version exit cleanly
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Nothing more can be reported if stderr itself is gone
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n{} {:#}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    println!("Processing video...");
    println!("URL: {}\n", cli.url);

    DependencyValidator::new().validate_dependencies()?;

    let config = Config::new();
    let downloader = YtDlpDownloader::new(config);

    println!("Downloading and converting...");
    println!("{}", style("(large files can take a few minutes to convert)").dim());

    downloader.download(&cli.url).await?;

    println!("\nConversion finished, looking for output files...");

    let output_dir = downloader.config().output_dir();
    match downloader.output_files() {
        Ok(files) => match files.last() {
            Some(file) => {
                let size = utils::file_size(file)
                    .map(|bytes| format!(" ({})", utils::format_file_size(bytes)))
                    .unwrap_or_default();
                println!("\n{} MP3 saved to: {}{}", style("Success!").green().bold(), file.display(), size);
            }
            None => {
                println!(
                    "{} no output file found, but the conversion completed",
                    style("Warning:").yellow().bold()
                );
                println!("Please check the {} directory", output_dir.display());
            }
        },
        Err(e) => {
            println!("{} could not look up output files: {}", style("Warning:").yellow().bold(), e);
        }
    }

    println!("\n{} All done!", style("✓").green());
    Ok(())
}
