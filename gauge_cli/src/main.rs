mod cli;
mod error_fmt;
mod run;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use eyre::WrapErr;
use gauge_core::GaugeError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn main() {
    if let Err(err) = try_main() {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}

fn try_main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    let _ = JSON_MODE.set(args.json);

    let cfg = load_config(args.config.as_deref())?;
    cfg.validate()
        .map_err(|e| eyre::Report::new(GaugeError::Config(e.to_string())))?;

    init_tracing(&args, &cfg.logging)?;

    match args.cmd {
        Commands::Run {
            samples,
            start_gallons,
            diag,
        } => run::cmd_run(&cfg, samples, start_gallons, diag),
        Commands::Sample {
            count,
            start_gallons,
        } => run::cmd_sample(&cfg, count, start_gallons, args.json),
        Commands::Fit { csv } => run::cmd_fit(&csv, args.json),
    }
}

fn load_config(path: Option<&std::path::Path>) -> eyre::Result<gauge_config::Config> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .wrap_err_with(|| format!("read config file {p:?}"))?;
            gauge_config::load_toml(&text)
                .map_err(|e| eyre::Report::new(GaugeError::Config(e.to_string())))
        }
        None => Ok(gauge_config::Config::default()),
    }
}

fn init_tracing(args: &Cli, logging: &gauge_config::Logging) -> eyre::Result<()> {
    let level = logging.level.as_deref().unwrap_or(&args.log_level);
    let filter = EnvFilter::try_new(level).wrap_err("invalid log level")?;

    // Logs go to stderr; stdout is reserved for the rendered display.
    let console: Box<dyn Layer<_> + Send + Sync> = if args.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file_layer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("open log file {path:?}"))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = FILE_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();
    Ok(())
}
