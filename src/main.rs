use anyhow::{bail, Context};
use blobgate::utils::{logger, validation::Validate};
use blobgate::{BlobContent, BlobStorage, CliConfig, GatewayStorage};
use clap::Parser;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting blobgate smoke run");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let storage = GatewayStorage::new(config.storage_config()?)?;
    println!("Gateway: {}", storage.config().base_url());

    let (name, payload) = match &config.file {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("smoke_upload.bin")
                .to_string();
            (name, bytes)
        }
        None => (
            "smoke_test.txt".to_string(),
            b"Hello from blobgate!\n".to_vec(),
        ),
    };

    match run_smoke(&storage, &name, payload).await {
        Ok(saved) => {
            println!("✅ Smoke run passed (blob '{}' uploaded, verified and deleted)", saved);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Smoke run failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Walks the full contract once against a live gateway: upload, exists,
/// size, signed URL, download, delete. Fails on the first mismatch.
async fn run_smoke(
    storage: &GatewayStorage,
    name: &str,
    payload: Vec<u8>,
) -> anyhow::Result<String> {
    println!("1. Uploading {} ({} bytes)...", name, payload.len());
    let saved = storage
        .save(name, BlobContent::new(payload.clone()))
        .await?;
    println!("   ✓ Saved as: {}", saved);

    println!("2. Checking existence...");
    if !storage.exists(&saved).await {
        bail!("blob '{}' missing right after upload", saved);
    }
    println!("   ✓ Exists");

    println!("3. Checking size...");
    let size = storage.size(&saved).await;
    if size != payload.len() as u64 {
        bail!(
            "size mismatch: gateway reports {}, uploaded {}",
            size,
            payload.len()
        );
    }
    println!("   ✓ Size: {} bytes", size);

    println!("4. Fetching signed URL...");
    match storage.url(&saved).await {
        Some(signed) => verify_signed_url(&signed)?,
        None => bail!("gateway did not issue an access URL for '{}'", saved),
    }

    println!("5. Downloading content back...");
    let blob = storage.open(&saved).await?;
    if blob.bytes.as_ref() != payload.as_slice() {
        bail!(
            "downloaded content differs from uploaded content ({} vs {} bytes)",
            blob.len(),
            payload.len()
        );
    }
    println!("   ✓ Content matches");

    println!("6. Deleting...");
    storage.delete(&saved).await;
    if storage.exists(&saved).await {
        bail!("blob '{}' still exists after delete", saved);
    }
    println!("   ✓ Deleted");

    Ok(saved)
}

fn verify_signed_url(signed: &str) -> anyhow::Result<()> {
    let parsed = Url::parse(signed).context("gateway issued an unparseable access URL")?;

    let mut has_signature = false;
    let mut has_path = false;
    let mut expires: Option<i64> = None;
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "signature" => has_signature = true,
            "path" => has_path = true,
            "expires" => expires = value.parse().ok(),
            _ => {}
        }
    }

    if !has_signature || !has_path {
        bail!("access URL is missing signature/path parameters: {}", signed);
    }

    let now = chrono::Utc::now().timestamp();
    match expires {
        Some(ts) if ts > now => {
            println!("   ✓ URL valid for another {}s", ts - now);
            Ok(())
        }
        Some(ts) => bail!("access URL already expired {}s ago", now - ts),
        None => bail!("access URL has no usable expires parameter: {}", signed),
    }
}
