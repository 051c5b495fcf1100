//! Foreground runner: keeps the session's engine alive in the background
//!
//! - `platform`: Host capabilities (service start, foreground, notifications)
//! - `notification`: The playback notification and its channel
//!
//! Runner lifecycle is `Stopped -> Starting -> Running -> Stopped`, tracked by
//! a [`ServiceRegistry`] shared by every runner handle in the process.

pub mod notification;
pub mod platform;

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::engine::{EngineEvent, EngineFactory};
use crate::error::ForegroundError;
use crate::session::{Session, SessionBridge};

use notification::NOTIFICATION_ID;
use platform::{api, Platform};

const SERVICE_NAME: &str = "PlaybackService";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RunnerState {
    #[default]
    Stopped,
    Starting,
    Running,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchMode {
    ForegroundService,
    Plain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    AlreadyRunning,
    Started(LaunchMode),
    /// The service came up but could not enter the foreground and stopped itself
    StoppedSelf,
}

/// Process-wide runner state: the start latch and the live service instance
pub struct ServiceRegistry {
    state: Mutex<RunnerState>,
    instance: Mutex<Option<Arc<PlaybackService>>>,
}

impl ServiceRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RunnerState::Stopped),
            instance: Mutex::new(None),
        })
    }

    pub async fn state(&self) -> RunnerState {
        *self.state.lock().await
    }

    /// Latch `Stopped -> Starting`. Any other state means a start is already
    /// in progress or done.
    async fn try_begin_start(&self) -> bool {
        let mut state = self.state.lock().await;
        if *state != RunnerState::Stopped {
            return false;
        }
        *state = RunnerState::Starting;
        true
    }

    async fn set_state(&self, next: RunnerState) {
        let mut state = self.state.lock().await;
        tracing::debug!(from = ?*state, to = ?next, "Runner state transition");
        *state = next;
    }

    async fn install(&self, service: Arc<PlaybackService>) {
        *self.instance.lock().await = Some(service);
    }

    async fn take_instance(&self) -> Option<Arc<PlaybackService>> {
        self.instance.lock().await.take()
    }

    async fn instance(&self) -> Option<Arc<PlaybackService>> {
        self.instance.lock().await.clone()
    }
}

/// Called when the host refuses to let a running service enter the foreground
pub trait ServiceListener: Send + Sync {
    fn on_foreground_service_start_not_allowed(&self);
}

/// Posts the plain notification so the user still sees playback controls
struct FallbackNotification {
    platform: Arc<dyn Platform>,
}

impl ServiceListener for FallbackNotification {
    fn on_foreground_service_start_not_allowed(&self) {
        tracing::warn!("Foreground start not allowed, posting plain notification");
        notification::show_notification(self.platform.as_ref());
    }
}

/// Handle used to start and stop the playback service
pub struct ForegroundRunner {
    registry: Arc<ServiceRegistry>,
    platform: Arc<dyn Platform>,
    bridge: Arc<Mutex<SessionBridge>>,
    factory: Arc<dyn EngineFactory>,
}

impl ForegroundRunner {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        platform: Arc<dyn Platform>,
        bridge: Arc<Mutex<SessionBridge>>,
        factory: Arc<dyn EngineFactory>,
    ) -> Self {
        Self { registry, platform, bridge, factory }
    }

    pub async fn start(&self) -> StartOutcome {
        if !self.registry.try_begin_start().await {
            tracing::debug!("Playback service already running");
            return StartOutcome::AlreadyRunning;
        }

        let mode = if self.platform.api_level() > api::O {
            self.platform.start_foreground_service(SERVICE_NAME);
            LaunchMode::ForegroundService
        } else {
            self.platform.start_service(SERVICE_NAME);
            LaunchMode::Plain
        };

        let service = Arc::new(PlaybackService {
            registry: self.registry.clone(),
            platform: self.platform.clone(),
            bridge: self.bridge.clone(),
            factory: self.factory.clone(),
            listener: Arc::new(FallbackNotification { platform: self.platform.clone() }),
            engine_watch: Mutex::new(None),
        });
        self.registry.install(service.clone()).await;

        if service.on_create().await {
            StartOutcome::Started(mode)
        } else {
            StartOutcome::StoppedSelf
        }
    }

    pub async fn stop(&self) {
        match self.registry.instance().await {
            Some(service) => service.on_destroy().await,
            None => self.registry.set_state(RunnerState::Stopped).await,
        }
    }

    pub async fn state(&self) -> RunnerState {
        self.registry.state().await
    }

    pub fn session_bridge(&self) -> Arc<Mutex<SessionBridge>> {
        self.bridge.clone()
    }

    pub async fn session(&self) -> Option<Session> {
        match self.registry.instance().await {
            Some(service) => service.on_get_session().await,
            None => None,
        }
    }
}

/// The running service instance. At most one exists per registry.
pub struct PlaybackService {
    registry: Arc<ServiceRegistry>,
    platform: Arc<dyn Platform>,
    bridge: Arc<Mutex<SessionBridge>>,
    factory: Arc<dyn EngineFactory>,
    listener: Arc<dyn ServiceListener>,
    engine_watch: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackService {
    /// Returns false if the service stopped itself while coming up.
    async fn on_create(&self) -> bool {
        let engine = {
            let mut bridge = self.bridge.lock().await;
            bridge.initialize(self.factory.as_ref());
            bridge.session().map(|s| s.engine())
        };

        if let Some(engine) = engine {
            let handle = tokio::spawn(watch_foreground_requests(
                engine.subscribe(),
                self.platform.clone(),
                self.listener.clone(),
            ));
            *self.engine_watch.lock().await = Some(handle);
        }

        self.registry.set_state(RunnerState::Running).await;
        self.open_notification().await
    }

    async fn open_notification(&self) -> bool {
        if self.platform.api_level() < api::O {
            return true;
        }
        let notification = notification::build_notification(self.platform.as_ref());
        match self.platform.start_foreground(NOTIFICATION_ID, &notification) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Could not enter foreground, stopping service");
                self.stop_self().await;
                false
            }
        }
    }

    async fn stop_self(&self) {
        self.on_destroy().await;
    }

    async fn on_destroy(&self) {
        if let Some(handle) = self.engine_watch.lock().await.take() {
            handle.abort();
        }
        self.bridge.lock().await.release().await;
        self.platform.stop_foreground();
        self.registry.take_instance().await;
        self.registry.set_state(RunnerState::Stopped).await;
        tracing::info!("Playback service destroyed");
    }

    async fn on_get_session(&self) -> Option<Session> {
        self.bridge.lock().await.session().cloned()
    }
}

/// Re-request foreground status whenever playback starts.
async fn watch_foreground_requests(
    mut events: broadcast::Receiver<EngineEvent>,
    platform: Arc<dyn Platform>,
    listener: Arc<dyn ServiceListener>,
) {
    loop {
        match events.recv().await {
            Ok(EngineEvent::IsPlayingChanged(true)) => {
                let notification = notification::build_notification(platform.as_ref());
                match platform.start_foreground(NOTIFICATION_ID, &notification) {
                    Ok(()) => {}
                    Err(ForegroundError::NotAllowed) => listener.on_foreground_service_start_not_allowed(),
                    Err(e) => tracing::warn!(error = %e, "Foreground refresh failed"),
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Foreground watcher lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{ScriptedEngine, ScriptedFactory};
    use crate::session::ResumptionCache;
    use platform::MockPlatform;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn runner(platform: MockPlatform, factory: ScriptedFactory) -> ForegroundRunner {
        ForegroundRunner::new(
            ServiceRegistry::new(),
            Arc::new(platform),
            Arc::new(Mutex::new(SessionBridge::new(ResumptionCache::in_memory()))),
            Arc::new(factory),
        )
    }

    fn modern_platform() -> MockPlatform {
        let mut platform = MockPlatform::new();
        platform.expect_api_level().return_const(34u32);
        platform.expect_has_notification_channel().return_const(true);
        platform.expect_stop_foreground().return_const(());
        platform
    }

    #[tokio::test]
    async fn second_start_is_a_no_op() {
        let engine = ScriptedEngine::new();
        let mut platform = modern_platform();
        platform.expect_start_foreground_service().times(1).return_const(());
        platform.expect_start_foreground().times(1).returning(|_, _| Ok(()));

        let runner = runner(platform, ScriptedFactory::new(engine.clone()));
        assert_eq!(runner.start().await, StartOutcome::Started(LaunchMode::ForegroundService));
        assert_eq!(runner.start().await, StartOutcome::AlreadyRunning);
        assert_eq!(runner.state().await, RunnerState::Running);
        assert!(runner.session().await.is_some());
    }

    #[tokio::test]
    async fn old_platform_uses_plain_start_without_foreground() {
        let mut platform = MockPlatform::new();
        platform.expect_api_level().return_const(25u32);
        platform.expect_start_service().times(1).return_const(());
        platform.expect_start_foreground_service().times(0);
        platform.expect_start_foreground().times(0);

        let runner = runner(platform, ScriptedFactory::new(ScriptedEngine::new()));
        assert_eq!(runner.start().await, StartOutcome::Started(LaunchMode::Plain));
        assert_eq!(runner.state().await, RunnerState::Running);
    }

    #[tokio::test]
    async fn api_26_starts_plain_but_still_elevates() {
        let mut platform = MockPlatform::new();
        platform.expect_api_level().return_const(26u32);
        platform.expect_has_notification_channel().return_const(true);
        platform.expect_start_service().times(1).return_const(());
        platform.expect_start_foreground().times(1).returning(|_, _| Ok(()));

        let runner = runner(platform, ScriptedFactory::new(ScriptedEngine::new()));
        assert_eq!(runner.start().await, StartOutcome::Started(LaunchMode::Plain));
    }

    #[tokio::test]
    async fn elevation_failure_stops_and_resets_latch() {
        let engine = ScriptedEngine::new();
        let mut platform = modern_platform();
        platform.expect_start_foreground_service().times(2).return_const(());
        platform
            .expect_start_foreground()
            .times(2)
            .returning(|_, _| Err(ForegroundError::Failed("denied by test".to_string())));

        let runner = runner(platform, ScriptedFactory::new(engine.clone()));
        assert_eq!(runner.start().await, StartOutcome::StoppedSelf);
        assert_eq!(runner.state().await, RunnerState::Stopped);
        assert!(runner.session().await.is_none());
        assert_eq!(engine.release_count(), 1);

        // Not blocked by the failed attempt.
        assert_eq!(runner.start().await, StartOutcome::StoppedSelf);
    }

    #[tokio::test]
    async fn refused_refresh_posts_fallback_notification() {
        let engine = ScriptedEngine::new();
        let mut platform = modern_platform();
        let calls = AtomicUsize::new(0);
        platform.expect_start_foreground_service().return_const(());
        platform.expect_start_foreground().returning(move |_, _| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(())
            } else {
                Err(ForegroundError::NotAllowed)
            }
        });
        platform.expect_has_notification_permission().return_const(true);
        platform.expect_notify().times(1).return_const(());

        let runner = runner(platform, ScriptedFactory::new(engine.clone()));
        assert_eq!(runner.start().await, StartOutcome::Started(LaunchMode::ForegroundService));

        engine.emit(EngineEvent::IsPlayingChanged(true));
        tokio::time::sleep(Duration::from_millis(50)).await;
        runner.stop().await;
    }

    #[tokio::test]
    async fn engine_failure_still_runs_without_session() {
        let mut platform = modern_platform();
        platform.expect_start_foreground_service().return_const(());
        platform.expect_start_foreground().returning(|_, _| Ok(()));

        let runner = runner(platform, ScriptedFactory::failing());
        assert_eq!(runner.start().await, StartOutcome::Started(LaunchMode::ForegroundService));
        assert!(runner.session().await.is_none());
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let engine = ScriptedEngine::new();
        let mut platform = modern_platform();
        platform.expect_start_foreground_service().return_const(());
        platform.expect_start_foreground().returning(|_, _| Ok(()));

        let runner = runner(platform, ScriptedFactory::new(engine.clone()));
        runner.start().await;
        runner.stop().await;
        runner.stop().await;
        assert_eq!(runner.state().await, RunnerState::Stopped);
        assert_eq!(engine.release_count(), 1);
    }
}
