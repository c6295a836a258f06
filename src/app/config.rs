use anyhow::bail;
use config::Config;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
        }
    }
}

fn default_http_port() -> u16 {
    8080
}

/// The fixed Conversions API destination. Everything here is
/// deploy-time configuration, none of it is ever request supplied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    /// The dataset (pixel) id events are reported against
    pub pixel_id: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_graph_base")]
    pub graph_base: String,
    /// Name of the environment variable holding the access token.
    /// The token itself never lives in the config file
    #[serde(default = "default_token_env")]
    pub access_token_env: String,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            pixel_id: String::new(),
            api_version: default_api_version(),
            graph_base: default_graph_base(),
            access_token_env: default_token_env(),
        }
    }
}

fn default_api_version() -> String {
    "v21.0".to_string()
}

fn default_graph_base() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_token_env() -> String {
    "META_CAPI_TOKEN".to_string()
}

/// Third-party tag identifiers served through the bootstrap route
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagsConfig {
    pub gtm_container: String,
    pub utmify_pixel: String,
    /// When set, analytics urls get their vendor host swapped for
    /// this first-party domain
    #[serde(default)]
    pub first_party_host: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRotation {
    Daily,
    Hourly,
    Never,
}

impl Default for FileRotation {
    fn default() -> Self {
        FileRotation::Daily
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSink {
    #[serde(flatten)]
    pub dest: LogType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogType {
    Stdout {
        #[serde(default = "default_true")]
        color: bool,
        #[serde(default)]
        json: bool,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        json: bool,
        #[serde(default)]
        rotation: FileRotation,
        #[serde(default)]
        max_files: usize,
    },
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_span_sample_rate")]
    pub span_sample_rate: f32,
    #[serde(default)]
    pub sinks: Vec<LogSink>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_span_sample_rate() -> f32 {
    0.01
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            span_sample_rate: default_span_sample_rate(),
            sinks: vec![LogSink {
                dest: LogType::Stdout {
                    color: true,
                    json: false,
                },
            }],
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.sinks.is_empty() {
            bail!("At least one logging sink must be configured");
        }

        self.level.parse::<tracing::Level>().map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: trace, debug, info, warn, error",
                self.level
            )
        })?;

        if !(0.0..=1.0).contains(&self.span_sample_rate) {
            bail!(
                "span_sample_rate must be between 0.0 and 1.0, got {}",
                self.span_sample_rate
            );
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConveyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub meta: MetaConfig,
    #[serde(default)]
    pub tags: TagsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConveyConfig {
    pub fn load(path: &PathBuf) -> Result<ConveyConfig, anyhow::Error> {
        let cfg = Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.meta.pixel_id.trim().is_empty() {
            bail!("meta.pixel_id must be set");
        }

        if self.meta.api_version.trim().is_empty() {
            bail!("meta.api_version must be set");
        }

        if self.meta.access_token_env.trim().is_empty() {
            bail!("meta.access_token_env must be set");
        }

        self.logging.validate()
    }
}
