//! hookreel - assemble a captioned vertical short from four clips.
//!
//! Reads the job from flags or the CI environment, runs it, publishes the
//! output path to the CI result channel and exits with a status that
//! classifies any failure.

mod input;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use hookreel_core::config::ConfigManager;
use hookreel_core::logging::{init_tracing, JobLoggerBuilder, LogConfig};
use hookreel_core::orchestrator::{Engines, ErrorKind, JobDriver};

const DEFAULT_CONFIG: &str = "hookreel.toml";

/// Exit status for configuration and input parsing errors.
const EXIT_USAGE: u8 = 2;

/**
    Fetch four clips, caption them and encode a single vertical short.
*/
#[derive(Parser)]
#[command(name = "hookreel", version)]
struct Cli {
    /// JSON array of exactly four clip locators (URLs or local paths).
    #[arg(long, env = "VIDEO_URLS")]
    video_urls: Option<String>,

    /// Caption shown during the first three seconds.
    #[arg(long, env = "HOOK_TEXT", default_value = "")]
    hook: String,

    /// Caption shown during the last three seconds.
    #[arg(long, env = "TITLE_TEXT", default_value = "")]
    title: String,

    /// Output file. Defaults to `[paths] output_file`.
    #[arg(short, long, env = "HOOKREEL_OUTPUT")]
    output: Option<PathBuf>,

    /// Settings file. Missing files fall back to defaults.
    #[arg(short, long, env = "HOOKREEL_CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Write a commented default settings file to `--config` and exit.
    #[arg(long)]
    write_default_config: bool,

    /// Name for the work directory and log file.
    #[arg(long, default_value = "hookreel")]
    job_name: String,

    /// File receiving `key=value` CI outputs.
    #[arg(long, env = "GITHUB_OUTPUT", hide_env_values = true)]
    github_output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("hookreel: {:#}", e);
            ExitCode::from(ErrorKind::Setup.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let mut config = ConfigManager::new(&cli.config);

    if cli.write_default_config {
        config
            .save()
            .with_context(|| format!("writing {}", cli.config.display()))?;
        println!("Wrote default settings to {}", cli.config.display());
        return Ok(0);
    }

    if let Err(e) = config.load_or_default() {
        eprintln!("hookreel: {}: {}", cli.config.display(), e);
        return Ok(EXIT_USAGE);
    }
    let settings = config.into_settings();
    init_tracing(settings.logging.level);

    let locators = match input::parse_locators(cli.video_urls.as_deref()) {
        Ok(locators) => locators,
        Err(e) => {
            eprintln!("hookreel: {:#}", e);
            return Ok(EXIT_USAGE);
        }
    };
    let job_spec = input::build_job_spec(locators, &cli.hook, &cli.title, cli.output, &settings);

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let engines = Engines::real(&settings, runtime.handle().clone())
        .context("setting up the HTTP client")?;

    let logger = JobLoggerBuilder::new(&cli.job_name)
        .log_dir(&settings.paths.logs_folder)
        .config(LogConfig::from_settings(&settings.logging))
        .console_callback(Box::new(|line| eprintln!("{}", line)))
        .build()
        .with_context(|| format!("creating log file in {}", settings.paths.logs_folder))?;
    let logger = Arc::new(logger);
    if let Some(path) = logger.log_path() {
        tracing::info!("Job log: {}", path.display());
    }

    let driver = JobDriver::new(settings, &engines);

    let cancel = driver.cancel_handle();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping the job");
            cancel.cancel();
        }
    });

    // Blocking engines call into the runtime, so the job runs on this thread.
    let outcome = driver.run(&cli.job_name, job_spec, Arc::clone(&logger));
    logger.close();

    eprintln!("{}", report::summary(&outcome.result));
    report::publish(&outcome.result, cli.github_output.as_deref())
        .context("publishing job outputs")?;

    Ok(outcome.exit_code())
}
