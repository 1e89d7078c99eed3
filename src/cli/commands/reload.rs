//! Reload command - one-off `reload` notification.

use crate::config::Settings;
use crate::link::Message;
use crate::session::send_once;

/// Ask the companion to reload everything, then exit.
pub async fn run(settings: &Settings) {
    match send_once(&settings.link, &Message::Reload).await {
        Ok(ack) if ack.is_empty() => println!("Reload sent (no response)"),
        Ok(ack) => println!("Reload sent: {ack}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
