//! Desktop notifications over the session bus
//!
//! Wraps `org.freedesktop.Notifications.Notify`. Send failures belong to the
//! runtime side-effect error class: logged at debug, never surfaced.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;
use zbus::zvariant::Value;

const APP_NAME: &str = "admute";
const APP_ICON: &str = "dialog-information";

/// Transient user notification sender
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn notify(&self, summary: &str, body: &str, timeout_ms: i32);
}

#[zbus::proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: HashMap<&str, &Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

/// Notification sender backed by the freedesktop notification daemon
pub struct DesktopNotifier {
    proxy: NotificationsProxy<'static>,
}

impl DesktopNotifier {
    pub async fn new(conn: &zbus::Connection) -> zbus::Result<Self> {
        Ok(Self {
            proxy: NotificationsProxy::new(conn).await?,
        })
    }
}

#[async_trait]
impl NotificationSender for DesktopNotifier {
    async fn notify(&self, summary: &str, body: &str, timeout_ms: i32) {
        let result = self
            .proxy
            .notify(
                APP_NAME,
                0,
                APP_ICON,
                summary,
                body,
                &[],
                HashMap::new(),
                timeout_ms,
            )
            .await;
        if let Err(err) = result {
            debug!("Desktop notification failed: {err}");
        }
    }
}
