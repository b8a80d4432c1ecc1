use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{
    Config, DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_RANK_BIN, DEFAULT_TIMEOUT_SECS,
    DEFAULT_WORKER_LIMIT, SourceKind,
};

#[derive(Debug, Parser)]
#[command(
    name = "tfbp-explorer",
    version,
    about = "Correlation and rank-response queries over TF binding and perturbation data"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    #[arg(long, global = true, env = "TFBP_API_URL", help = "Dataset API base URL")]
    pub api_url: Option<String>,

    #[arg(long, global = true, env = "TFBP_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    #[arg(long, global = true, env = "TFBP_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, global = true, env = "TFBP_BINDING_FILE", default_value = "binding_corr.csv")]
    pub binding_file: String,

    #[arg(
        long,
        global = true,
        env = "TFBP_PERTURBATION_FILE",
        default_value = "perturbation_corr.csv"
    )]
    pub perturbation_file: String,

    #[arg(long, global = true, env = "TFBP_BINDING_CORR_URL")]
    pub binding_remote: Option<String>,

    #[arg(long, global = true, env = "TFBP_PERTURBATION_CORR_URL")]
    pub perturbation_remote: Option<String>,

    #[arg(long, global = true, env = "TFBP_CACHE_TTL", default_value_t = DEFAULT_CACHE_TTL_SECS, help = "Cache TTL (seconds)")]
    pub cache_ttl: u64,

    #[arg(long, global = true, env = "TFBP_WORKERS", default_value_t = DEFAULT_WORKER_LIMIT, help = "Concurrent replicate downloads")]
    pub workers: usize,

    #[arg(long, global = true, env = "TFBP_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, help = "HTTP timeout (seconds)")]
    pub timeout: u64,

    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RANK_BIN)]
    pub max_rank_bin: u32,

    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        help = "Perturbation sources to include (comma separated)"
    )]
    pub expression_source: Vec<String>,
}

impl GlobalArgs {
    pub fn to_config(&self) -> Config {
        let mut config = Config {
            api_base_url: self.api_url.clone(),
            api_token: self.api_token.clone(),
            data_dir: self.data_dir.clone(),
            binding_file: self.binding_file.clone(),
            perturbation_file: self.perturbation_file.clone(),
            binding_remote: self.binding_remote.clone(),
            perturbation_remote: self.perturbation_remote.clone(),
            cache_ttl: std::time::Duration::from_secs(self.cache_ttl),
            worker_limit: self.workers.max(1),
            request_timeout: std::time::Duration::from_secs(self.timeout),
            max_rank_bin: self.max_rank_bin,
            ..Config::default()
        };
        if !self.expression_source.is_empty() {
            config.expression_sources = self.expression_source.clone();
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Correlation(CorrelationArgs),
    Metadata(MetadataArgs),
    Regulator(RegulatorArgs),
}

#[derive(Debug, Args)]
pub struct CorrelationArgs {
    #[arg(long, value_enum)]
    pub source: SourceArg,

    #[arg(long, default_value_t = false)]
    pub refresh: bool,

    #[arg(long, help = "Write JSON here instead of stdout")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MetadataArgs {
    #[arg(long, default_value_t = false)]
    pub refresh: bool,

    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long)]
    pub tsv: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RegulatorArgs {
    #[arg(long)]
    pub id: i64,

    #[arg(long, default_value_t = false)]
    pub refresh: bool,

    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, help = "Write curve points as TSV")]
    pub tsv: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Binding,
    Perturbation,
}

impl From<SourceArg> for SourceKind {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Binding => SourceKind::Binding,
            SourceArg::Perturbation => SourceKind::Perturbation,
        }
    }
}
