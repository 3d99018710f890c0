//! Process exit on SIGINT / SIGTERM.

use std::io;
use std::process;
use std::thread::{self, JoinHandle};

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::info;

/// Operator message for a handled signal, `None` for anything else.
pub fn shutdown_message(signal: i32) -> Option<&'static str> {
    match signal {
        SIGTERM => Some("received termination signal, shutting down"),
        SIGINT => Some("received interrupt signal, shutting down"),
        _ => None,
    }
}

/// Spawns the thread that exits the process with status 0 on SIGINT or
/// SIGTERM.
///
/// In-flight matches and unflushed progress are not drained.
pub fn install() -> io::Result<JoinHandle<()>> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    thread::Builder::new()
        .name("shutdown".into())
        .spawn(move || {
            for signal in signals.forever() {
                if let Some(message) = shutdown_message(signal) {
                    info!("{}", message);
                    process::exit(0);
                }
            }
        })
}
