use std::fmt;
use std::str::FromStr;

/// Client → Server control commands, sent as text frames.
///
/// Snapshot data flows the other way on binary frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Subscribe,
    Unsubscribe,
}

impl ControlCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlCommand::Subscribe => "subscribe",
            ControlCommand::Unsubscribe => "unsubscribe",
        }
    }
}

impl FromStr for ControlCommand {
    type Err = ProtocolError;

    /// Exact, case-sensitive match on the literal command text
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "subscribe" => Ok(ControlCommand::Subscribe),
            "unsubscribe" => Ok(ControlCommand::Unsubscribe),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    UnknownCommand(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownCommand(text) => write!(f, "invalid command [{}]", text),
        }
    }
}

impl std::error::Error for ProtocolError {}
