//! Wire messages sent to the companion application.
//!
//! One UTF-8 write per connection, no framing beyond the connection itself.

use std::fmt;
use std::path::PathBuf;

const FILE_PREFIX: &str = "file:";
const RELOAD: &str = "reload";

/// A notification for the companion application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A specific file changed: `file:<path>`.
    File(PathBuf),
    /// Resynchronize everything: `reload`.
    Reload,
}

impl Message {
    /// Bytes written to the socket.
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::File(path) => write!(f, "{FILE_PREFIX}{}", path.to_string_lossy()),
            Message::Reload => f.write_str(RELOAD),
        }
    }
}

/// The companion's response, kept verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Acknowledgement(String);

impl Acknowledgement {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Acknowledgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_message_keeps_given_path() {
        let message = Message::File(PathBuf::from("src/qml/Main.qml"));
        assert_eq!(message.to_string(), "file:src/qml/Main.qml");
        assert_eq!(message.encode(), b"file:src/qml/Main.qml".to_vec());
    }

    #[test]
    fn test_reload_message() {
        assert_eq!(Message::Reload.to_string(), "reload");
        assert_eq!(Message::Reload.encode(), b"reload".to_vec());
    }

    #[test]
    fn test_absolute_path_message() {
        let message = Message::File(PathBuf::from("/home/dev/wallet/src/qml/pages/Send.qml"));
        assert_eq!(
            message.to_string(),
            "file:/home/dev/wallet/src/qml/pages/Send.qml"
        );
    }

    #[test]
    fn test_acknowledgement_is_lossy_utf8() {
        let ack = Acknowledgement::from_bytes(b"reloaded");
        assert_eq!(ack.text(), "reloaded");

        let ack = Acknowledgement::from_bytes(&[b'o', b'k', 0xff]);
        assert_eq!(ack.text(), "ok\u{fffd}");
        assert!(Acknowledgement::from_bytes(b"").is_empty());
    }
}
