//! Mute strategies and their shared lifecycle hooks
//!
//! A strategy only implements the two required capabilities (`on_ad_start`,
//! `on_ad_stop`). The before/after hooks around them are shared behavior
//! supplied by [`StrategyHooks`] through delegation, so future strategies
//! (volume lowering, other audio backends) implement just the pair.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use crate::config::{EffectiveConfig, Mode};
use crate::mixer::{MuteCommandExecutor, MuteIntent};
use crate::notify::NotificationSender;

const NOTIFICATION_SUMMARY: &str = "Sound muted";
const NOTIFICATION_BODY: &str = "Advertisement detected, sound is now muted";
const NOTIFICATION_TIMEOUT_MS: i32 = 2000;

/// The capability set every mute strategy provides
#[async_trait]
pub trait MuteStrategy: Send {
    /// An advertisement track started playing
    async fn on_ad_start(&mut self);

    /// A non-advertisement track started playing
    async fn on_ad_stop(&mut self);
}

/// Strategy that fully mutes the master channel during advertisements
pub struct MutifyStrategy {
    executor: Box<dyn MuteCommandExecutor>,
}

impl MutifyStrategy {
    pub fn new(executor: Box<dyn MuteCommandExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl MuteStrategy for MutifyStrategy {
    async fn on_ad_start(&mut self) {
        self.executor.execute(MuteIntent::Mute);
    }

    async fn on_ad_stop(&mut self) {
        self.executor.execute(MuteIntent::Unmute);
    }
}

/// Build the strategy selected by the configured mode
pub fn build_strategy(mode: Mode, executor: Box<dyn MuteCommandExecutor>) -> Box<dyn MuteStrategy> {
    match mode {
        Mode::Mutify => Box::new(MutifyStrategy::new(executor)),
    }
}

/// Shared default hook behavior wrapped around a strategy
///
/// Owns the per-ad-block notification arming flag and the resolved
/// notification/delay settings. The transition engine drives the six hooks in
/// order; each hook completes before the next runs.
pub struct StrategyHooks {
    strategy: Box<dyn MuteStrategy>,
    notifier: Box<dyn NotificationSender>,
    show_notification: bool,
    wait_before_unmute: Duration,
    notification_armed: bool,
}

impl StrategyHooks {
    pub fn new(
        strategy: Box<dyn MuteStrategy>,
        notifier: Box<dyn NotificationSender>,
        config: &EffectiveConfig,
    ) -> Self {
        Self {
            strategy,
            notifier,
            show_notification: config.show_notification,
            wait_before_unmute: config.wait_duration(),
            notification_armed: config.show_notification,
        }
    }

    pub async fn on_ad_start_before(&mut self) {}

    pub async fn on_ad_start(&mut self) {
        self.strategy.on_ad_start().await;
    }

    /// Notify once per contiguous ad block, then disarm
    pub async fn on_ad_start_after(&mut self) {
        if self.notification_armed {
            self.notifier
                .notify(NOTIFICATION_SUMMARY, NOTIFICATION_BODY, NOTIFICATION_TIMEOUT_MS)
                .await;
            self.notification_armed = false;
        }
    }

    /// Delay the unmute if configured
    ///
    /// Suspends only the current transition sequence; the bus connection and
    /// the liveness poll run on their own tasks and are unaffected.
    pub async fn on_ad_stop_before(&mut self) {
        if !self.wait_before_unmute.is_zero() {
            debug!(
                "Waiting {:.1}s before unmuting",
                self.wait_before_unmute.as_secs_f64()
            );
            sleep(self.wait_before_unmute).await;
        }
    }

    pub async fn on_ad_stop(&mut self) {
        self.strategy.on_ad_stop().await;
    }

    /// Re-arm the notification for the next ad block
    pub async fn on_ad_stop_after(&mut self) {
        self.notification_armed = self.show_notification;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingExecutor {
        intents: Arc<Mutex<Vec<MuteIntent>>>,
    }

    impl MuteCommandExecutor for RecordingExecutor {
        fn execute(&self, intent: MuteIntent) {
            self.intents.lock().unwrap().push(intent);
        }
    }

    struct RecordingNotifier {
        summaries: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl NotificationSender for RecordingNotifier {
        async fn notify(&self, summary: &str, _body: &str, _timeout_ms: i32) {
            self.summaries.lock().unwrap().push(summary.to_string());
        }
    }

    fn hooks_with(
        config: &EffectiveConfig,
    ) -> (StrategyHooks, Arc<Mutex<Vec<MuteIntent>>>, Arc<Mutex<Vec<String>>>) {
        let intents = Arc::new(Mutex::new(Vec::new()));
        let summaries = Arc::new(Mutex::new(Vec::new()));
        let strategy = build_strategy(
            config.mode,
            Box::new(RecordingExecutor {
                intents: intents.clone(),
            }),
        );
        let notifier = Box::new(RecordingNotifier {
            summaries: summaries.clone(),
        });
        (StrategyHooks::new(strategy, notifier, config), intents, summaries)
    }

    fn config(show_notification: bool, wait_before_unmute: f64) -> EffectiveConfig {
        EffectiveConfig {
            mode: Mode::Mutify,
            show_notification,
            wait_before_unmute,
        }
    }

    #[tokio::test]
    async fn mutify_issues_mute_and_unmute_intents() {
        let (mut hooks, intents, _) = hooks_with(&config(false, 0.0));
        hooks.on_ad_start().await;
        hooks.on_ad_stop().await;
        assert_eq!(
            *intents.lock().unwrap(),
            vec![MuteIntent::Mute, MuteIntent::Unmute]
        );
    }

    #[tokio::test]
    async fn notification_sent_once_per_ad_block() {
        let (mut hooks, _, summaries) = hooks_with(&config(true, 0.0));
        hooks.on_ad_start_after().await;
        hooks.on_ad_start_after().await;
        assert_eq!(summaries.lock().unwrap().len(), 1);
        assert_eq!(summaries.lock().unwrap()[0], "Sound muted");

        // A completed stop sequence re-arms for the next block
        hooks.on_ad_stop_after().await;
        hooks.on_ad_start_after().await;
        assert_eq!(summaries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn disabled_notification_never_rearms() {
        let (mut hooks, _, summaries) = hooks_with(&config(false, 0.0));
        hooks.on_ad_start_after().await;
        hooks.on_ad_stop_after().await;
        hooks.on_ad_start_after().await;
        assert!(summaries.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_waits_the_configured_delay() {
        let (mut hooks, _, _) = hooks_with(&config(false, 1.5));
        let started = tokio::time::Instant::now();
        hooks.on_ad_stop_before().await;
        assert_eq!(started.elapsed(), Duration::from_secs_f64(1.5));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_wait_does_not_sleep() {
        let (mut hooks, _, _) = hooks_with(&config(false, 0.0));
        let started = tokio::time::Instant::now();
        hooks.on_ad_stop_before().await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
