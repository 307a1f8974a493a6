//! a cpu load controller.

use {
    clap::Parser,
    duty::{App, Error, RunConfig},
    std::{io, process::ExitCode},
    tracing_subscriber::EnvFilter,
};

/// hold the cpu near a target utilization, and watch it happen.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// target cpu utilization, in percent (0 to 100).
    #[arg(short, long, default_value_t = RunConfig::DEFAULT_TARGET)]
    target: f64,
    /// how long to run, in seconds (at least 1).
    #[arg(short, long, default_value_t = RunConfig::DEFAULT_DURATION_SECS)]
    duration: u64,
    /// width of the load and progress bars, in cells (at least 10).
    #[arg(short, long, default_value_t = RunConfig::DEFAULT_BAR_LENGTH)]
    bar_length: usize,
    /// seconds between display updates (at least 0.05).
    #[arg(short, long, default_value_t = RunConfig::DEFAULT_INTERVAL_SECS)]
    interval: f64,
}

fn main() -> ExitCode {
    // logs go to stderr, and stay quiet by default so they do not tear the display.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(
    Args {
        target,
        duration,
        bar_length,
        interval,
    }: Args,
) -> Result<(), Error> {
    let config = RunConfig::new(target, duration, bar_length, interval)?;
    tracing::info!(?config, "duty v{} starting", env!("CARGO_PKG_VERSION"));

    println!(
        "holding the cpu at {target}% for {duration}s (ctrl-c to stop)",
        target = config.target_percent(),
        duration = config.duration().as_secs(),
    );

    let summary = App::new(config).run(&mut io::stdout())?;
    println!("{summary}");

    Ok(())
}
