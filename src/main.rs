use anyhow::Context;
use eframe::egui::ViewportBuilder;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hack_or_snooze::api::HackOrSnoozeClient;
use hack_or_snooze::app::HackOrSnoozeApp;
use hack_or_snooze::config::AppConfig;
use hack_or_snooze::db::CredentialStore;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hack_or_snooze=info")),
        )
        .init();

    let config_path = AppConfig::default_path()?;
    let config = AppConfig::load(&config_path)?;
    info!(api = %config.api.base_url, "starting");

    let api = HackOrSnoozeClient::new(&config.api).context("Failed to create HTTP client")?;

    // Without a credential store the app still works, the user just has to
    // log in again next time.
    let credentials = match config
        .data_dir()
        .and_then(|dir| CredentialStore::open_default(&dir))
    {
        Ok(store) => Some(store),
        Err(e) => {
            error!("Failed to open credential store: {:#}", e);
            None
        }
    };

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Hack or Snooze"),
        ..Default::default()
    };

    eframe::run_native(
        "Hack or Snooze",
        options,
        Box::new(move |cc| {
            let is_dark_mode = cc
                .storage
                .and_then(|storage| storage.get_string("is_dark_mode"))
                .and_then(|value| value.parse::<bool>().ok())
                .unwrap_or(true);

            Ok(Box::new(HackOrSnoozeApp::new(
                cc.egui_ctx.clone(),
                Arc::new(api),
                credentials,
                is_dark_mode,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window closed with an error: {}", e))
}
