use anyhow::{bail, Context};
use clap::Parser;

use imgur_photo_uploader::cli::{format_record, log_level_filter, Cli, Command, ConsoleView};
use imgur_photo_uploader::config::{self, Config};
use imgur_photo_uploader::{HistoryStore, ImgurClient, UploadCoordinator, UploadEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging before anything can warn. Without RUST_LOG the
    // configured level is applied below through the global max level.
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace")).init();
    if !rust_log_set {
        log::set_max_level(log::LevelFilter::Info);
    }

    let mut config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    if !rust_log_set {
        log::set_max_level(log_level_filter(&config.log_level));
    }

    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    log::debug!("Starting Imgur Photo Uploader");

    let store = HistoryStore::new(config.history_path()?);

    match cli.command {
        Command::Upload { paths, quality } => {
            let quality = quality.unwrap_or(config.jpeg_quality);
            let paths = paths
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect();
            upload(&config, store, paths, quality).await
        }
        Command::List { json } => {
            let state = store.load();
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else if state.is_empty() {
                println!("No uploads yet.");
            } else {
                for record in &state.uploads {
                    println!("{}", format_record(record));
                }
            }
            Ok(())
        }
        Command::Remove { key } => {
            let state = store.load();
            match state.find(key) {
                Some(record) => {
                    let url = record.url.clone();
                    store.remove(&state, key)?;
                    println!("Removed upload {} ({})", key, url);
                }
                None => println!("No upload with key {}", key),
            }
            Ok(())
        }
        Command::Fetch { key, output } => {
            let state = store.load();
            let record = match state.find(key) {
                Some(record) => record,
                None => bail!("No upload with key {}", key),
            };

            let client = ImgurClient::from_config(&config)?;
            let bytes = client.fetch_image(&record.url).await?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Saved {} ({} bytes) to {}", record.url, bytes.len(), output.display());
            Ok(())
        }
        Command::Config => {
            match &cli.config {
                Some(path) => println!("Config file:  {}", path.display()),
                None => println!("Config file:  {}", config::get_config_path()?.display()),
            }
            println!("History file: {}", store.path().display());
            println!("Endpoint:     {}", config.endpoint);
            println!(
                "Client id:    {}",
                if config.client_id.is_empty() { "(not set)" } else { "(set)" }
            );
            println!("JPEG quality: {}", config.jpeg_quality);
            println!("Log level:    {}", config.log_level);
            Ok(())
        }
    }
}

async fn upload(
    config: &Config,
    store: HistoryStore,
    paths: Vec<String>,
    quality: u8,
) -> anyhow::Result<()> {
    let client = ImgurClient::from_config(config)?;
    let mut coordinator = UploadCoordinator::new(client, store, ConsoleView::default());

    for path in paths {
        println!("Uploading {}...", path);
        coordinator.start_file_upload(path, quality);
    }

    let mut failures = 0usize;
    loop {
        tokio::select! {
            event = coordinator.next_completion() => match event {
                Some(UploadEvent::Uploaded { record, .. }) => {
                    println!("Success! {}", record.url);
                }
                Some(UploadEvent::Failed { error, .. }) => {
                    eprintln!("Did not upload: {}", error);
                    failures += 1;
                }
                Some(UploadEvent::Aborted { .. }) => failures += 1,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted, cancelling uploads");
                failures += coordinator.in_flight();
                coordinator.shutdown().await;
                break;
            }
        }
    }

    if failures > 0 {
        bail!("{} upload(s) failed", failures);
    }
    Ok(())
}
