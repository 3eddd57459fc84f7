#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the GCS uploader.

mod auth;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use gcs_uploader_cli_utils::IndicatifProgress;
use gcs_uploader_storage::{GcsClient, open_client};
use gcs_uploader_upload::progress::null_progress;
use gcs_uploader_upload::{ConfigError, LocalFiles, Orchestrator, load_file};
use gcs_uploader_upload_models::{DEFAULT_WORKERS, UploadConfig};

use crate::auth::{AuthType, auth_config};

#[derive(Parser)]
#[command(name = "gcs_uploader", version, about = "Bulk uploader for Google Cloud Storage")]
struct Cli {
    /// Bucket to operate on
    #[arg(short, long, global = true, default_value = "")]
    bucket_name: String,

    /// Log level used when `RUST_LOG` is not set (e.g. "info", "debug")
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// How to authenticate against storage
    #[arg(long, global = true, value_enum, default_value_t = AuthType::Emulator)]
    auth_type: AuthType,

    /// Emulator address, credential file path, or credential JSON,
    /// depending on `--auth-type`
    #[arg(long, global = true)]
    credentials: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the bucket
    CreateBucket {
        /// Project the bucket belongs to
        #[arg(short = 'i', long)]
        project_id: String,
    },
    /// Delete the bucket
    DeleteBucket,
    /// Check whether the bucket exists (exits 1 when it does not)
    ExistsBucket,
    /// Print the bucket attributes as JSON
    AttrsBucket,
    /// Upload a single file under an exact object name
    Load {
        /// Object name in the bucket
        #[arg(short = 'n', long)]
        blob_path: String,
        /// Local file to upload
        #[arg(short = 'f', long)]
        source_file: PathBuf,
    },
    /// Upload every file under a directory whose name starts with a prefix
    LoadPrefix {
        /// Directory to walk
        #[arg(short, long, default_value = ".")]
        search_path: PathBuf,
        /// Only files whose name starts with this are uploaded
        #[arg(short = 'x', long, default_value = "")]
        source_prefix: String,
        /// Directory component prepended to every object name
        #[arg(short = 'p', long, default_value = "")]
        blob_prefix_path: String,
        /// Prefix joined to each object name with a dash
        #[arg(short = 'a', long, default_value = "")]
        blob_prefix_name: String,
        /// Number of concurrent upload workers
        #[arg(short = 'c', long, default_value_t = DEFAULT_WORKERS)]
        num_concurrent_files: usize,
        /// Write failed source paths to `errors.log` in `--dump-dir`
        #[arg(long)]
        track_failures: bool,
        /// Directory the failure dump is written to
        #[arg(long, default_value = ".")]
        dump_dir: PathBuf,
        /// Do not draw a progress bar
        #[arg(long)]
        no_progress: bool,
    },
}

fn require_bucket(bucket_name: &str) -> Result<&str, ConfigError> {
    if bucket_name.is_empty() {
        return Err(ConfigError::MissingBucket);
    }
    Ok(bucket_name)
}

async fn connect(cli: &Cli) -> Result<GcsClient, Box<dyn std::error::Error>> {
    let auth = auth_config(cli.auth_type, cli.credentials.clone())?;
    log::debug!("Opening storage client ({auth})");
    Ok(open_client(&auth).await?)
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let multi = gcs_uploader_cli_utils::init_logger(&cli.log_level);

    let Some(command) = &cli.command else {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    };

    match command {
        Commands::CreateBucket { project_id } => {
            let bucket = require_bucket(&cli.bucket_name)?;
            let client = connect(&cli).await?;
            client.create_bucket(bucket, project_id).await?;
            log::info!("Bucket {bucket} created successfully");
        }
        Commands::DeleteBucket => {
            let bucket = require_bucket(&cli.bucket_name)?;
            let client = connect(&cli).await?;
            client.delete_bucket(bucket).await?;
            log::info!("Bucket {bucket} deleted successfully");
        }
        Commands::ExistsBucket => {
            let bucket = require_bucket(&cli.bucket_name)?;
            let client = connect(&cli).await?;
            if !client.bucket_exists(bucket).await? {
                log::error!("Bucket {bucket} doesn't exist");
                std::process::exit(1);
            }
            log::info!("Bucket {bucket} exists");
        }
        Commands::AttrsBucket => {
            let bucket = require_bucket(&cli.bucket_name)?;
            let client = connect(&cli).await?;
            let attrs = client.bucket_attrs(bucket).await?;
            println!("{}", serde_json::to_string_pretty(&attrs)?);
        }
        Commands::Load {
            blob_path,
            source_file,
        } => {
            let bucket = require_bucket(&cli.bucket_name)?;
            let client = connect(&cli).await?;
            load_file(&client, &LocalFiles, bucket, source_file, blob_path).await?;
        }
        Commands::LoadPrefix {
            search_path,
            source_prefix,
            blob_prefix_path,
            blob_prefix_name,
            num_concurrent_files,
            track_failures,
            dump_dir,
            no_progress,
        } => {
            let mut config = UploadConfig::new(cli.bucket_name.clone(), search_path.clone())
                .with_source_prefix(source_prefix.clone())
                .with_blob_prefix_path(blob_prefix_path.clone())
                .with_blob_prefix_name(blob_prefix_name.clone())
                .with_workers(*num_concurrent_files);
            if *track_failures {
                config = config.with_failure_dump(dump_dir.clone());
            }
            gcs_uploader_upload::config::validate(&config)?;

            let client = Arc::new(connect(&cli).await?);
            let progress = if *no_progress {
                null_progress()
            } else {
                IndicatifProgress::batch_bar(&multi, "Uploading")
            };

            let start = Instant::now();
            let mut orchestrator = Orchestrator::new(config, client);
            let report = orchestrator.run(progress).await?;
            log::info!(
                "Batch {} in {:.1}s",
                orchestrator.phase(),
                start.elapsed().as_secs_f64()
            );

            if !report.is_complete() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
