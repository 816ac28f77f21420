use std::io::{self, BufRead, Read, Write};

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "ocr-locator-rust",
    version,
    about = "Translate a recognized phrase and locate its best-matching OCR fragment"
)]
struct Cli {
    /// Comma-delimited candidate phrases. With this flag the phrase is read
    /// from stdin, ranked against the options, and a single JSON result is
    /// printed. Without it the process runs the streaming locate loop:
    /// one JSON request per stdin line, one JSON response per stdout line.
    #[arg(short = 'o', long = "options")]
    options: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ocr_locator_rust::logging::init(cli.verbose)?;

    let config = ocr_locator_rust::Config {
        options: cli.options,
        settings_path: cli.read_settings,
        verbose: cli.verbose,
    };

    if config.options.is_some() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        let output = ocr_locator_rust::run(config, Some(input)).await?;
        println!("{}", output);
        return Ok(());
    }

    run_locate_loop(config).await
}

/// The host loop: the capture/OCR stage writes one request per line and
/// reads one response per line. Each tick is independent; a bad line gets
/// an error response and the loop continues.
async fn run_locate_loop(config: ocr_locator_rust::Config) -> Result<()> {
    let locator = ocr_locator_rust::build_locator(&config)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    let mut reader = stdin.lock();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let response = ocr_locator_rust::respond_line(&locator, trimmed).await;
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }
    Ok(())
}
