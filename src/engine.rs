//! Track-transition state machine
//!
//! Turns the raw stream of track-id observations into exactly one ad-start or
//! ad-stop hook sequence per distinct track id. The event source re-emits the
//! same metadata on unrelated property changes, so consecutive duplicates are
//! suppressed here (the anti-flood contract).

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::strategy::StrategyHooks;

/// Prefix marking an advertisement track id
///
/// Spotify's convention; other players would inject their own marker through
/// [`TrackTransitionEngine::with_ad_marker`].
pub const AD_MARKER: &str = "spotify:ad";

/// Deduplicating ad/non-ad transition engine
///
/// Holds exactly one step of history (the previous track id) and the active
/// strategy's hook adapter. Observations are processed serially; each hook in
/// a sequence completes before the next runs.
pub struct TrackTransitionEngine {
    previous_track_id: Option<String>,
    ad_marker: String,
    hooks: StrategyHooks,
}

impl TrackTransitionEngine {
    pub fn new(hooks: StrategyHooks) -> Self {
        Self::with_ad_marker(hooks, AD_MARKER)
    }

    pub fn with_ad_marker(hooks: StrategyHooks, ad_marker: impl Into<String>) -> Self {
        Self {
            previous_track_id: None,
            ad_marker: ad_marker.into(),
            hooks,
        }
    }

    /// Process one track-id observation
    ///
    /// Repeats of the previous track id are ignored. A new ad-marked id runs
    /// the start hook sequence, any other new id runs the stop sequence.
    pub async fn observe(&mut self, track_id: &str) {
        if self.previous_track_id.as_deref() == Some(track_id) {
            return;
        }
        self.previous_track_id = Some(track_id.to_string());

        if track_id.starts_with(&self.ad_marker) {
            debug!("Advertisement started: {track_id}");
            self.hooks.on_ad_start_before().await;
            self.hooks.on_ad_start().await;
            self.hooks.on_ad_start_after().await;
        } else {
            debug!("Advertisement over, now playing: {track_id}");
            self.hooks.on_ad_stop_before().await;
            self.hooks.on_ad_stop().await;
            self.hooks.on_ad_stop_after().await;
        }
    }

    /// Consume the watcher's observation channel until it closes
    ///
    /// Observations arriving while a sequence is in flight (e.g. during the
    /// unmute delay) stay queued in the channel and are processed in order.
    pub async fn run(mut self, mut observations: mpsc::Receiver<String>) {
        while let Some(track_id) = observations.recv().await {
            self.observe(&track_id).await;
        }
        info!("Track observation stream closed");
    }
}
