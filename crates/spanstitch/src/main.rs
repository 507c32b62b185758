mod backend;
mod lifecycle;
mod telemetry;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use spanstitch_core::tags::TagSet;
use spanstitch_core::time::resolve_override;
use spanstitch_store::StateFile;

use crate::backend::{BackendConfig, OtlpBackend};
use crate::lifecycle::OpenRequest;

#[derive(Parser, Debug)]
#[command(name = "spanstitch")]
#[command(about = "Build one trace span across short-lived process invocations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Open a span and persist its state for a later finish")]
    Start {
        #[arg(long, help = "Where this invocation's span state is written")]
        state: PathBuf,
        #[arg(long, default_value = "dev")]
        env: String,
        #[arg(long, default_value = "spanstitch")]
        service: String,
        #[arg(long, help = "Resource name; defaults to the operation name")]
        resource: Option<String>,
        #[arg(long, default_value = "process")]
        operation: String,
        #[arg(long, help = "Another invocation's state file to link as parent")]
        parent: Option<PathBuf>,
        #[arg(long, help = "Flat JSON object of string tags")]
        tags: Option<String>,
        #[arg(long, help = "Start time as epoch nanoseconds")]
        epoch_time: Option<i64>,
        #[arg(long, help = "Start time as RFC3339; wins over --epoch-time")]
        iso_time: Option<String>,
    },
    #[command(about = "Finish a previously opened span")]
    Finish {
        #[arg(long, help = "The state file written by start")]
        state: PathBuf,
        #[arg(long, help = "Extra tags merged over the stored ones")]
        tags: Option<String>,
        #[arg(long, help = "Finish time as epoch nanoseconds")]
        epoch_time: Option<i64>,
        #[arg(long, help = "Finish time as RFC3339; wins over --epoch-time")]
        iso_time: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_cli_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            state,
            env,
            service,
            resource,
            operation,
            parent,
            tags,
            epoch_time,
            iso_time,
        } => {
            let at = resolve_override(epoch_time, iso_time.as_deref())?;
            let req = OpenRequest {
                resource: resource.unwrap_or_else(|| operation.clone()),
                env,
                service,
                operation,
                tags_json: tags,
                state,
                parent,
                at,
            };
            let backend = OtlpBackend::initialize(&BackendConfig {
                service: req.service.clone(),
                env: req.env.clone(),
                global_tags: TagSet::default(),
            })?;
            lifecycle::open(&backend, &req)?;
            backend.shutdown()?;
        }
        Commands::Finish {
            state,
            tags,
            epoch_time,
            iso_time,
        } => {
            let at = resolve_override(epoch_time, iso_time.as_deref())?;
            let mut record = StateFile::new(&state).load()?;
            if let Some(raw) = tags.as_deref() {
                record.tags.merge(TagSet::parse(raw)?);
            }
            let backend = OtlpBackend::initialize(&BackendConfig {
                service: record.service.clone(),
                env: record.env.clone(),
                global_tags: record.tags.clone(),
            })?;
            lifecycle::close(&backend, &record, at)?;
            backend.shutdown()?;
        }
    }

    Ok(())
}
