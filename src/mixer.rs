//! Mute command execution
//!
//! The engine never waits for the mixer: commands are spawned detached and
//! their outcome is not surfaced. A failed unmute therefore goes unnoticed by
//! design (see DESIGN.md open questions).

use tokio::process::Command;
use tracing::debug;

/// Requested mixer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteIntent {
    Mute,
    Unmute,
}

/// Fire-and-forget mute/unmute command executor
pub trait MuteCommandExecutor: Send + Sync {
    fn execute(&self, intent: MuteIntent);
}

const MUTE_COMMAND: &[&str] = &["amixer", "-q", "-D", "pulse", "sset", "Master", "mute"];
const UNMUTE_COMMAND: &[&str] = &["amixer", "-q", "-D", "pulse", "sset", "Master", "unmute"];

/// Executor driving the PulseAudio master channel through `amixer`
pub struct AmixerExecutor;

impl MuteCommandExecutor for AmixerExecutor {
    fn execute(&self, intent: MuteIntent) {
        let argv = match intent {
            MuteIntent::Mute => MUTE_COMMAND,
            MuteIntent::Unmute => UNMUTE_COMMAND,
        };
        // Detached: the child is never awaited
        match Command::new(argv[0]).args(&argv[1..]).spawn() {
            Ok(_child) => debug!("Spawned mixer command: {}", argv.join(" ")),
            Err(err) => debug!("Mixer command failed to spawn: {err}"),
        }
    }
}
