//! `osk`: drive an object store from the command line.

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use object_storage_kit::{ObjectStorageClient, StorageConfig, StorageFactory};

#[derive(Parser)]
#[command(name = "osk", version, about = "Object storage on S3 or MinIO, picked by configuration")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "OSK_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a bucket (the default bucket if none is given)
    CreateBucket { bucket: Option<String> },
    /// Delete a bucket and every object in it
    DeleteBucket { bucket: String },
    /// List all buckets
    ListBuckets,
    /// Check whether a bucket exists
    BucketExists { bucket: String },
    /// Upload a local file as an object
    Put {
        bucket: String,
        key: String,
        file: PathBuf,
    },
    /// Download an object to stdout or a file
    Get {
        bucket: String,
        key: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete an object
    Delete { bucket: String, key: String },
    /// List object keys in a bucket
    List { bucket: String },
}

async fn run(client: &ObjectStorageClient, config: &StorageConfig, command: Command) -> Result<()> {
    match command {
        Command::CreateBucket { bucket } => {
            let bucket = bucket.unwrap_or_else(|| config.default_bucket.clone());
            client.create_bucket(&bucket).await?;
            println!("{}", bucket);
        }
        Command::DeleteBucket { bucket } => {
            client.delete_bucket(&bucket).await?;
        }
        Command::ListBuckets => {
            for bucket in client.list_buckets().await? {
                println!("{}", bucket);
            }
        }
        Command::BucketExists { bucket } => {
            println!("{}", client.bucket_exists(&bucket).await?);
        }
        Command::Put { bucket, key, file } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            client.put_object(&bucket, &key, Bytes::from(data)).await?;
        }
        Command::Get { bucket, key, output } => {
            let data = client
                .get_object(&bucket, &key)
                .await?
                .with_context(|| format!("no such object: {}/{}", bucket, key))?;
            match output {
                Some(path) => tokio::fs::write(&path, &data)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&data)?;
                }
            }
        }
        Command::Delete { bucket, key } => {
            client.delete_object(&bucket, &key).await?;
        }
        Command::List { bucket } => {
            for key in client.list_objects(&bucket).await? {
                println!("{}", key);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = StorageConfig::from_file(&cli.config)
        .await
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    let client = StorageFactory::bootstrap(&config).await?;

    run(&client, &config, cli.command).await
}
