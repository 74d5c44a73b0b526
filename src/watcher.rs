//! Playback signal watcher
//!
//! Subscribes to `PropertiesChanged` on the player's MPRIS object and
//! normalizes the noisy signal stream into bare track-id observations for the
//! transition engine. Notifications that don't carry a playing status plus a
//! string track id are expected noise and dropped without logging.

use std::collections::HashMap;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{info, trace};
use zbus::fdo::{DBusProxy, PropertiesChangedStream, PropertiesProxy};
use zbus::names::BusName;
use zbus::zvariant::Value;

use crate::error::{Error, Result};

/// Well-known bus name of the watched player
pub const PLAYER_BUS_NAME: &str = "org.mpris.MediaPlayer2.spotify";
/// MPRIS object path
pub const PLAYER_OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
/// Interface whose property changes carry playback state
pub const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

const PLAYBACK_STATUS: &str = "PlaybackStatus";
const METADATA: &str = "Metadata";
const TRACK_ID_KEY: &str = "mpris:trackid";
const PLAYING: &str = "Playing";

/// Subscribed property-change watcher
pub struct PlaybackSignalWatcher {
    changes: PropertiesChangedStream,
}

impl PlaybackSignalWatcher {
    /// Verify the player owns its bus name and subscribe to its property
    /// changes
    ///
    /// Any failure here is a fatal startup condition (the player service is
    /// unreachable), reported as [`Error::Subscription`].
    pub async fn connect(conn: &zbus::Connection) -> Result<Self> {
        let dbus = DBusProxy::new(conn)
            .await
            .map_err(|err| Error::Subscription(err.to_string()))?;
        let name = BusName::try_from(PLAYER_BUS_NAME)
            .map_err(|err| Error::Subscription(err.to_string()))?;
        let owned = dbus
            .name_has_owner(name)
            .await
            .map_err(|err| Error::Subscription(err.to_string()))?;
        if !owned {
            return Err(Error::Subscription(format!(
                "{PLAYER_BUS_NAME} has no owner on the session bus"
            )));
        }

        let properties = PropertiesProxy::builder(conn)
            .destination(PLAYER_BUS_NAME)
            .and_then(|builder| builder.path(PLAYER_OBJECT_PATH))
            .map_err(|err| Error::Subscription(err.to_string()))?
            .build()
            .await
            .map_err(|err| Error::Subscription(err.to_string()))?;
        let changes = properties
            .receive_properties_changed()
            .await
            .map_err(|err| Error::Subscription(err.to_string()))?;

        info!("Subscribed to property changes of {PLAYER_BUS_NAME}");
        Ok(Self { changes })
    }

    /// Forward normalized track-id observations until the stream or the
    /// receiving side goes away
    pub async fn watch(mut self, observations: mpsc::Sender<String>) {
        while let Some(signal) = self.changes.next().await {
            let Ok(args) = signal.args() else { continue };
            let Some(track_id) = track_change(args.interface_name().as_str(), args.changed_properties())
            else {
                trace!("Dropped property change without a playing track id");
                continue;
            };
            if observations.send(track_id).await.is_err() {
                break;
            }
        }
    }
}

/// The watcher's filter contract
///
/// Forwards a track id only when the change is on the player interface, both
/// `PlaybackStatus` and `Metadata` are present in the same notification, the
/// status is `Playing`, and the metadata carries a string-typed track id.
fn track_change(interface: &str, changed: &HashMap<&str, Value<'_>>) -> Option<String> {
    if interface != PLAYER_INTERFACE {
        return None;
    }
    let status = changed.get(PLAYBACK_STATUS)?;
    if !matches!(status, Value::Str(s) if s.as_str() == PLAYING) {
        return None;
    }
    let Value::Dict(metadata) = changed.get(METADATA)? else {
        return None;
    };
    // A non-string track id (e.g. an object path) is dropped
    let track_id = metadata.get::<&str, &str>(&TRACK_ID_KEY).ok().flatten()?;
    Some(track_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zbus::zvariant::ObjectPath;

    fn change_with_metadata<'a>(
        status: &'a str,
        track_value: Value<'a>,
    ) -> HashMap<&'a str, Value<'a>> {
        let mut metadata = HashMap::new();
        metadata.insert(TRACK_ID_KEY, track_value);

        let mut changed = HashMap::new();
        changed.insert(PLAYBACK_STATUS, Value::from(status));
        changed.insert(METADATA, Value::from(metadata));
        changed
    }

    #[test]
    fn playing_track_id_is_forwarded() {
        let changed = change_with_metadata(PLAYING, Value::from("spotify:ad:123"));
        assert_eq!(
            track_change(PLAYER_INTERFACE, &changed),
            Some("spotify:ad:123".to_string())
        );
    }

    #[test]
    fn other_interfaces_are_dropped() {
        let changed = change_with_metadata(PLAYING, Value::from("spotify:track:1"));
        assert_eq!(track_change("org.mpris.MediaPlayer2", &changed), None);
    }

    #[test]
    fn non_playing_status_is_dropped() {
        let changed = change_with_metadata("Paused", Value::from("spotify:track:1"));
        assert_eq!(track_change(PLAYER_INTERFACE, &changed), None);
    }

    #[test]
    fn change_without_both_fields_is_dropped() {
        let mut status_only = HashMap::new();
        status_only.insert(PLAYBACK_STATUS, Value::from(PLAYING));
        assert_eq!(track_change(PLAYER_INTERFACE, &status_only), None);

        let mut metadata = HashMap::new();
        metadata.insert(TRACK_ID_KEY, Value::from("spotify:track:1"));
        let mut metadata_only = HashMap::new();
        metadata_only.insert(METADATA, Value::from(metadata));
        assert_eq!(track_change(PLAYER_INTERFACE, &metadata_only), None);
    }

    #[test]
    fn non_string_track_id_is_dropped() {
        let path = ObjectPath::try_from("/org/mpris/track/1").unwrap();
        let changed = change_with_metadata(PLAYING, Value::from(path));
        assert_eq!(track_change(PLAYER_INTERFACE, &changed), None);
    }

    #[test]
    fn metadata_without_track_id_is_dropped() {
        let mut metadata = HashMap::new();
        metadata.insert("xesam:title", Value::from("Song"));
        let mut changed = HashMap::new();
        changed.insert(PLAYBACK_STATUS, Value::from(PLAYING));
        changed.insert(METADATA, Value::from(metadata));
        assert_eq!(track_change(PLAYER_INTERFACE, &changed), None);
    }
}
