// SPDX-License-Identifier: GPL-3.0-or-later
use std::io::BufRead;
use std::str::FromStr;
use std::sync::mpsc;
use std::thread;

use tracing::{debug, warn};

/// Requests typed by the user while the monitor is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Stop after the current frame.
    Quit,

    /// Save the current frame and show it in the capture window.
    Snapshot,
}

impl FromStr for Command {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.trim().to_ascii_lowercase() as &str {
            "q" | "quit" => Ok(Self::Quit),
            "p" | "snapshot" => Ok(Self::Snapshot),
            _ => Err("unknown command, use 'p' to take a snapshot or 'q' to quit"),
        }
    }
}

/// Read commands, one per line, on a background thread.
///
/// The thread exits when the input ends or the receiver is dropped. Blank lines are ignored.
pub(crate) fn spawn_reader<R>(input: R) -> std::io::Result<mpsc::Receiver<Command>>
where
    R: BufRead + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("command-reader".to_string())
        .spawn(move || {
            for line in input.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!(%err, "Unable to read command input");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        debug!(?command, "Received command");
                        if sender.send(command).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(input = %line.trim(), "{}", err),
                }
            }
            debug!("Command input closed");
        })?;
    Ok(receiver)
}
