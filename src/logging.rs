use eyre::{
    Context as _,
    Result,
};
use std::{
    fs::OpenOptions,
    sync::Mutex,
};
use support_stats_config::Args;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

/// Logs to stderr and, with `--log-file`, appends the same events to that file.
///
/// `RUST_LOG` takes precedence over `--verbose`.
pub fn init_logging(args: &Args) -> Result<()> {
    let default_directives = if args.verbose {
        "debug,hyper=info,hyper_util=info,reqwest=info"
    } else {
        "info"
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let file_layer = match &args.log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).wrap_err_with(|| format!("Failed to create log directory {dir:?}"))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("Failed to open log file {path:?}"))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter()))
        .with(file_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .context("Failed to initialize tracing subscriber")
}
