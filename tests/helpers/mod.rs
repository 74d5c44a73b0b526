//! Shared test doubles for the side-effect seams

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use admute::mixer::{MuteCommandExecutor, MuteIntent};
use admute::notify::NotificationSender;

/// One recorded side effect, in invocation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Mixer(MuteIntent),
    Notification { summary: String, timeout_ms: i32 },
}

pub type SideEffectLog = Arc<Mutex<Vec<SideEffect>>>;

pub fn side_effect_log() -> SideEffectLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub struct RecordingExecutor {
    pub log: SideEffectLog,
}

impl MuteCommandExecutor for RecordingExecutor {
    fn execute(&self, intent: MuteIntent) {
        self.log.lock().unwrap().push(SideEffect::Mixer(intent));
    }
}

pub struct RecordingNotifier {
    pub log: SideEffectLog,
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn notify(&self, summary: &str, _body: &str, timeout_ms: i32) {
        self.log.lock().unwrap().push(SideEffect::Notification {
            summary: summary.to_string(),
            timeout_ms,
        });
    }
}
