use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use xpmconvert::cli::{Args, clap_exit_code};
use xpmconvert::config::sanitize_label;
use xpmconvert::{Result, SourceImage};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(clap_exit_code(err.kind()).unwrap_or(0));
        }
    };

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(args: Args) -> Result<()> {
    let input = args.input.clone();
    let explicit_label = args.label.is_some();
    let mut config = args.into_config()?;

    let source = SourceImage::load(&input)?;
    if !explicit_label {
        if let Some(name) = &source.name {
            config.label = sanitize_label(name);
        }
    }
    tracing::debug!(
        "{}: {}x{} pixels, {} colors, {} char(s) per pixel",
        config.label,
        source.width,
        source.height,
        source.colors.len(),
        source.chars_per_pixel
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    xpmconvert::convert(&source, &config, &mut out)?;
    out.flush()?;
    Ok(())
}
