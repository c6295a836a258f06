use crate::app::config::{FileRotation, LogType, LoggingConfig};
use anyhow::{Result, anyhow};
use std::path::Path;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

type DynLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync + 'static>;

fn file_writer(
    path: &Path,
    rotation: &FileRotation,
    max_files: usize,
) -> Result<tracing_appender::non_blocking::NonBlocking> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let prefix = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Log file path has no usable file name: {:?}", path))?;

    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir)
            .map_err(|e| anyhow!("Failed to create log directory {}: {}", dir.display(), e))?;
    }

    let mut builder = tracing_appender::rolling::Builder::new().filename_prefix(prefix);

    builder = match rotation {
        FileRotation::Daily => builder.rotation(tracing_appender::rolling::Rotation::DAILY),
        FileRotation::Hourly => builder.rotation(tracing_appender::rolling::Rotation::HOURLY),
        FileRotation::Never => builder.rotation(tracing_appender::rolling::Rotation::NEVER),
    };

    if max_files > 0 {
        builder = builder.max_log_files(max_files);
    }

    let appender = builder.build(dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    // Guard flushes on drop; the subscriber outlives main so leak it
    std::mem::forget(guard);

    Ok(non_blocking)
}

/// Install the process-wide tracing subscriber from the logging
/// section of the config. Must run once, before the server starts
pub fn init(config: &LoggingConfig) -> Result<()> {
    config.validate()?;

    let crate_name = env!("CARGO_PKG_NAME");
    let filter = EnvFilter::from_default_env()
        .add_directive("error".parse()?)
        .add_directive(format!("{}={}", crate_name, config.level).parse()?);

    let mut layers: Vec<DynLayer> = Vec::new();

    for sink in &config.sinks {
        match &sink.dest {
            LogType::Stdout { color, json } => {
                let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
                std::mem::forget(guard);

                let layer: DynLayer = if *json {
                    fmt::layer().json().with_writer(non_blocking).boxed()
                } else {
                    fmt::layer()
                        .compact()
                        .with_ansi(*color)
                        .with_writer(non_blocking)
                        .boxed()
                };

                layers.push(layer);
            }
            LogType::File {
                path,
                json,
                rotation,
                max_files,
            } => {
                let writer = file_writer(path, rotation, *max_files)?;

                let layer: DynLayer = if *json {
                    fmt::layer().json().with_writer(writer).boxed()
                } else {
                    fmt::layer()
                        .compact()
                        .with_ansi(false)
                        .with_writer(writer)
                        .boxed()
                };

                layers.push(layer);
            }
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(())
}
