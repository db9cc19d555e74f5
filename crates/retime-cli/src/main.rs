use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use env_logger::{Env, Target};

#[derive(Parser)]
#[command(
    name = "retime",
    version,
    about = "Set file timestamps of exported photos and videos to their capture date"
)]
struct Cli {
    /// File or directory to process
    path: PathBuf,

    /// Print the date each file would get without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging: skipped hidden entries and extracted metadata
    #[arg(long)]
    debug: bool,

    /// ffprobe executable used to read video metadata
    #[arg(long, default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// Seconds before a hanging ffprobe is killed (0 waits forever)
    #[arg(long, default_value_t = retime_core::DEFAULT_PROBE_TIMEOUT.as_secs())]
    probe_timeout: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        Env::default().default_filter_or(if cli.debug { "debug" } else { "info" }),
    )
    .target(Target::Stdout)
    .format_timestamp(None)
    .init();

    let t_total = std::time::Instant::now();

    let mut options = retime_core::RunOptions::new(cli.path)
        .with_dry_run(cli.dry_run)
        .with_debug(cli.debug);
    options.ffprobe = cli.ffprobe;
    options.probe_timeout = match cli.probe_timeout {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let result = retime_core::process(&options)?;

    if options.dry_run {
        log::info!(
            "Done! {} files, {} would be updated, {} failed ({:.2}s)",
            result.files_seen,
            result.files_would_update,
            result.files_failed,
            t_total.elapsed().as_secs_f64()
        );
    } else {
        log::info!(
            "Done! {} files, {} updated, {} failed ({:.2}s)",
            result.files_seen,
            result.files_updated,
            result.files_failed,
            t_total.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
