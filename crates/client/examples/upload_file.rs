//! Uploads a file into a document's blob field and prints the result.
//!
//! ```text
//! CHINO_CONFIG=chino.toml RUST_LOG=debug \
//!     cargo run -p chino-client --example upload_file -- <document_id> <field> <path>
//! ```

use std::path::PathBuf;

use chino_blobs::UploadEvent;
use chino_client::{ChinoClient, ClientConfig};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(document_id), Some(field), Some(path)) = (args.next(), args.next(), args.next())
    else {
        eprintln!("usage: upload_file <document_id> <field> <path>");
        std::process::exit(2);
    };
    let path = PathBuf::from(path);

    let config = match std::env::var_os("CHINO_CONFIG") {
        Some(p) => ClientConfig::load(&PathBuf::from(p))?,
        None => ClientConfig::default(),
    };
    let client = ChinoClient::new(&config, None)?;
    let blobs = client.blobs().pinned();

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("path has no file name")?
        .to_string();
    let file = tokio::fs::File::open(&path).await?;

    let (tx, mut rx) = mpsc::channel::<UploadEvent>(32);
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let upload_id = event.upload_id().to_string();
            match event {
                UploadEvent::Chunk {
                    bytes_sent,
                    bytes_per_second,
                    ..
                } => tracing::info!(%upload_id, bytes_sent, bytes_per_second, "progress"),
                UploadEvent::Failed { error, .. } => {
                    tracing::warn!(%upload_id, %error, "upload failed")
                }
                _ => tracing::debug!(%upload_id, ?event, "upload event"),
            }
        }
    });

    let mut session = blobs.session().with_events(tx);
    session.begin(&document_id, &field, &file_name).await?;
    let result = session.send_all(file, config.chunk_size).await;
    drop(session);
    let _ = progress.await;

    let result = result?;
    println!(
        "blob {} ({} bytes, sha1 {})",
        result.blob_id, result.byte_count, result.sha1
    );
    Ok(())
}
