mod audio;
mod config;
mod controller;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use audio::AudioBackend;
use config::{AppConfig, Cli};
use controller::AppController;
use model::{AppModel, SaavnClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== saavn-rs starting ===");

    let config = AppConfig::load(&cli)?;
    tracing::info!(
        api = %config.api_base_url,
        quality = %config.stream_quality,
        volume = config.default_volume,
        "Configuration loaded"
    );

    let catalog = SaavnClient::new(&config).context("Failed to create catalog client")?;

    let mut app_model = AppModel::new();
    app_model.set_catalog(catalog.clone());
    app_model.set_volume(config.default_volume).await;
    app_model.set_seek_step_ms(config.seek_step_secs * 1000).await;
    let model = Arc::new(Mutex::new(app_model));

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let controller = AppController::new(
        model.clone(),
        Arc::new(Mutex::new(None)),
        Duration::from_millis(config.progress_poll_ms),
    );

    // Opening the output device blocks, so do it off the async workers
    let controller_for_audio = controller.clone();
    let volume = config.default_volume;
    tokio::spawn(async move {
        let opened = tokio::task::spawn_blocking(move || AudioBackend::new(catalog, volume)).await;
        match opened {
            Ok(Ok(backend)) => {
                tracing::info!("Audio output ready");
                controller_for_audio.attach_player(Arc::new(backend)).await;
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Audio init failed");
                let model = controller_for_audio.model.lock().await;
                model.set_error(format!("Audio init failed: {}", e)).await;
            }
            Err(e) => tracing::error!(error = %e, "Audio init task panicked"),
        }
    });

    controller.start_progress_loop().await;

    let controller_for_start = controller.clone();
    let play_on_start = cli.play.clone();
    tokio::spawn(async move {
        controller_for_start.load_featured().await;
        if let Some(song_id) = play_on_start {
            // Give the output device a moment to open
            for _ in 0..50 {
                if controller_for_start.current_player().await.is_some() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            controller_for_start.play_song_by_id(&song_id).await;
        }
    });

    let res = run_app(&mut terminal, model.clone(), controller.clone()).await;

    controller.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("saavn-rs shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let (playback, ui_state, content_state, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            (
                model_guard.get_playback_info().await,
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.should_quit().await,
            )
        };

        if should_quit {
            break;
        }

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &content_state);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
