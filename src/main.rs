mod config;
mod controller;
mod engine;
mod error;
mod logging;
mod model;
mod service;
mod session;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use config::AppConfig;
use controller::AppController;
use engine::VirtualEngineFactory;
use model::{playlist, projection, AppModel, Queue, ServiceStatus};
use service::platform::DesktopPlatform;
use service::{ForegroundRunner, ServiceRegistry, StartOutcome};
use session::{ResumptionCache, SessionBridge};
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Arc::new(AppConfig::load()?);

    let _log_guard = match logging::init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!(api_level = config.api_level, "=== pocketplay starting ===");

    let resumption = match &config.resumption_cache_path {
        Some(path) => ResumptionCache::with_file(path),
        None => ResumptionCache::in_memory(),
    };

    let platform = Arc::new(DesktopPlatform::from_config(&config));
    let runner = ForegroundRunner::new(
        ServiceRegistry::new(),
        platform.clone(),
        Arc::new(Mutex::new(SessionBridge::new(resumption))),
        Arc::new(VirtualEngineFactory::new(config.track_duration())),
    );

    match runner.start().await {
        StartOutcome::Started(mode) => tracing::info!(?mode, "Playback service started"),
        outcome => tracing::warn!(?outcome, "Playback service not running"),
    }

    let (writer, reader) = projection::channel();
    let model = Arc::new(Mutex::new(AppModel::new(Queue::new(playlist::demo_playlist())?, reader)));
    let controller = AppController::new(model.clone(), runner.session_bridge(), writer, config.clone());
    controller.on_start().await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller.clone(), &runner, &platform).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller.on_stop().await;
    runner.stop().await;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("pocketplay shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
    runner: &ForegroundRunner,
    platform: &DesktopPlatform,
) -> io::Result<()> {
    loop {
        controller
            .sync_service_status(ServiceStatus {
                runner: runner.state().await,
                foreground: platform.is_foreground(),
                notification: platform.active_notification().map(|n| n.title),
                session_id: runner.session().await.map(|s| s.id().to_string()),
            })
            .await;

        // Get current state
        let (now_playing, ui_state, service, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old status messages (after 3 seconds)
            model_guard.auto_clear_old_status().await;

            (
                model_guard.get_now_playing().await,
                model_guard.get_ui_state().await,
                model_guard.get_service_status().await,
                model_guard.should_quit().await,
            )
        };

        // Draw UI
        terminal.draw(|f| {
            AppView::render(f, &now_playing, &ui_state, &service);
        })?;

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
