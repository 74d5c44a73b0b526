//! Player process liveness poll
//!
//! The bus connection survives the player quitting, so a periodic process
//! check decides when the daemon should leave. Polls the process table every
//! few seconds and resolves once the player is gone; the binary then exits 0.

use std::ffi::OsStr;
use std::time::Duration;

use sysinfo::{ProcessesToUpdate, System};
use tokio::time;
use tracing::info;

/// Process name of the watched player
pub const PLAYER_PROCESS_NAME: &str = "spotify";

const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Resolves when no process with the given name is running anymore
pub async fn player_exited(process_name: &str) {
    let mut system = System::new();
    let mut interval = time::interval(POLL_INTERVAL);
    loop {
        interval.tick().await;
        system.refresh_processes(ProcessesToUpdate::All, true);
        let running = system
            .processes_by_exact_name(OsStr::new(process_name))
            .next()
            .is_some();
        if !running {
            info!("Player process \"{process_name}\" is no longer running");
            return;
        }
    }
}
