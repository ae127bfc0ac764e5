use std::io::BufRead;
use std::thread;

use futures_channel::mpsc::{self, UnboundedReceiver};
use tracing::{debug, warn};

/// Reads stdin on a dedicated thread and forwards each line over a channel.
///
/// The channel closes when stdin reaches end of file or fails.
pub fn spawn_stdin_reader() -> std::io::Result<UnboundedReceiver<String>> {
    let (sender, receiver) = mpsc::unbounded();

    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if sender.unbounded_send(line).is_err() {
                            debug!("Shell stopped listening, closing stdin reader");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read from stdin: {}", e);
                        break;
                    }
                }
            }
        })?;

    Ok(receiver)
}
