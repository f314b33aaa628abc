//! Diabscreen: offline diabetes risk screening
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use diabscreen::adapters::artifacts::{load_artifacts, LoadOptions};
use diabscreen::adapters::sanitize::SanitizingMakeWriter;
use diabscreen::application::Readiness;
use diabscreen::config::AppConfig;
use diabscreen::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Writing logs to the terminal would corrupt the TUI (alternate screen):
    // an interactive TTY logs to a file, anything else logs to stdout.
    let interactive = std::io::stdout().is_terminal();
    let (writer, _guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory surfaces on open below.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting Diabscreen...");

    let options = LoadOptions {
        require_manifest: config.require_manifest,
    };
    let readiness = Readiness::from_load(load_artifacts(&config.model_dir, options), config.policy);

    // The prediction path is unusable without the model: refuse to start.
    let service = match readiness.into_service() {
        Ok(service) => service,
        Err(e) => {
            if e.is_not_found() {
                eprintln!(
                    "Model file not found: {:?}. Set DIABSCREEN_MODEL_DIR to a directory containing diabetes_model.json and feature_names.json (plus manifest.json when DIABSCREEN_REQUIRE_MANIFEST is set).",
                    e.path()
                );
            } else {
                eprintln!("Failed to load model: {e}");
            }
            drop(_guard);
            std::process::exit(1);
        }
    };

    let mut app = App::new(service, config.tier_display);
    app.run()?;

    tracing::info!("Diabscreen shutdown complete.");
    Ok(())
}
