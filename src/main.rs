use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tfbp_explorer::cli::{Cli, Commands};
use tfbp_explorer::config::SourceKind;
use tfbp_explorer::error::QueryError;
use tfbp_explorer::io::{json_writer, summary, tsv_writer};
use tfbp_explorer::schema::v1::Provenance;
use tfbp_explorer::service::Explorer;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<QueryError>() {
                Some(query_err) => {
                    tracing::error!(kind = ?query_err.kind(), error = %query_err, "query failed");
                    if let Ok(json) = json_writer::error_json(query_err) {
                        println!("{}", json);
                    }
                }
                None => tracing::error!(error = %format!("{:#}", err), "command failed"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.global.to_config();
    let explorer = Explorer::from_config(config)?;

    match cli.command {
        Commands::Correlation(args) => {
            let kind: SourceKind = args.source.into();
            let cached = explorer.correlation_matrix(kind, args.refresh).await?;
            eprint!(
                "{}",
                summary::format_correlation_summary(kind.as_str(), &cached.value, cached.provenance)
            );
            emit(args.out.as_deref(), cached.provenance, &*cached.value)?;
        }
        Commands::Metadata(args) => {
            let cached = explorer.rank_response_metadata(args.refresh).await?;
            eprint!(
                "{}",
                summary::format_metadata_summary(&cached.value, cached.provenance)
            );
            if let Some(path) = &args.tsv {
                tsv_writer::write_metadata_tsv(path, &cached.value.metadata)?;
            }
            emit(args.out.as_deref(), cached.provenance, &*cached.value)?;
        }
        Commands::Regulator(args) => {
            let cached = explorer
                .regulator_rank_response(args.id, args.refresh)
                .await?;
            eprint!(
                "{}",
                summary::format_regulator_summary(&cached.value, cached.provenance)
            );
            if let Some(path) = &args.tsv {
                tsv_writer::write_curves_tsv(path, &cached.value)?;
            }
            emit(args.out.as_deref(), cached.provenance, &*cached.value)?;
        }
    }

    Ok(())
}

fn emit<T: Serialize>(
    out: Option<&std::path::Path>,
    provenance: Provenance,
    data: &T,
) -> Result<()> {
    match out {
        Some(path) => json_writer::write_json(path, provenance, data),
        None => {
            println!("{}", json_writer::to_json_string(provenance, data)?);
            Ok(())
        }
    }
}
