//! ArtNet In - Art-Net DMX input monitor
//!
//! Listens for Art-Net on the configured universe and prints the watched
//! channels until Ctrl+C.
//!
//! Usage: `artnet-in [settings.json]`

#![warn(missing_docs)]

mod logging;
mod logging_setup;
mod settings;

use anyhow::{Context, Result};
use artnet_in_control::{ArtNetInput, ChannelReader};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use settings::HostSettings;

#[tokio::main]
async fn main() -> Result<()> {
    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let mut settings = HostSettings::load(settings_path.as_deref())?;
    settings.apply_overrides(|key| std::env::var(key).ok())?;

    let _log_guard = logging_setup::init(&settings.log)?;

    // Leave an editable file behind on first run
    if settings_path.is_none() {
        if let Some(path) = HostSettings::default_path().filter(|p| !p.exists()) {
            match HostSettings::default().save(&path) {
                Ok(()) => info!("Wrote default settings to {:?}", path),
                Err(e) => warn!("Failed to write default settings: {:#}", e),
            }
        }
    }

    let mut input = ArtNetInput::new(settings.receiver.clone());
    input.start().with_context(|| {
        format!(
            "Failed to start Art-Net input on {}:{}",
            settings.receiver.ip, settings.receiver.port
        )
    })?;

    let shutdown = input.shutdown_hook();
    let printer = tokio::spawn(print_channels(
        input.reader(),
        settings.watch_channels.clone(),
        Duration::from_millis(settings.print_interval_ms.max(1)),
    ));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Ctrl+C received, shutting down");

    printer.abort();

    // Joining the receive thread blocks for up to the join timeout
    let closed = tokio::task::spawn_blocking(move || shutdown.run()).await?;
    if !closed {
        warn!("Art-Net input was already shut down");
    }

    info!("Bye!");
    Ok(())
}

async fn print_channels(reader: ChannelReader, channels: Vec<u16>, period: Duration) {
    let mut ticker = tokio::time::interval(period);

    loop {
        ticker.tick().await;

        let values: Vec<String> = channels
            .iter()
            .map(|&channel| format!("{}={:>3}", channel, reader.dmx(channel)))
            .collect();
        println!("[{}] {}", reader.status(), values.join(" "));
    }
}
