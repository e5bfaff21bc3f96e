//! Talks to the game's HTTP API: polls `/state`, posts `/action` and checks
//! `/health`.

mod error;
mod http;

pub use error::GameClientError;
pub use http::HttpGameClient;
use packets::ActionPacket;
use serde_json::Value;

/// Outcome of one state poll that is not a transport failure.
#[derive(Clone, Debug, PartialEq)]
pub enum StatePoll {
    /// A game is running and the payload is the raw state object.
    Active(Value),
    /// The server answered but had nothing to report this tick.
    Empty,
    /// The server reported that no game is currently active.
    NotActive,
}

/// The state source and action sink of a running game.
pub trait GameServer {
    fn fetch_state(&self) -> Result<StatePoll, GameClientError>;
    fn send_action(&self, action: &ActionPacket) -> Result<(), GameClientError>;
    fn health(&self) -> Result<bool, GameClientError>;
}

/// Turns a successful `/state` body into a poll result. Blank bodies, `null`
/// and `{}` are empty polls.
pub fn parse_state_body(body: &str) -> Result<StatePoll, GameClientError> {
    if body.trim().is_empty() {
        return Ok(StatePoll::Empty);
    }
    let value: Value = serde_json::from_str(body)?;
    Ok(match value {
        Value::Null => StatePoll::Empty,
        Value::Object(ref fields) if fields.is_empty() => StatePoll::Empty,
        value => StatePoll::Active(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_and_null_bodies_are_empty_polls() {
        assert_eq!(parse_state_body("").unwrap(), StatePoll::Empty);
        assert_eq!(parse_state_body("  \n").unwrap(), StatePoll::Empty);
        assert_eq!(parse_state_body("null").unwrap(), StatePoll::Empty);
        assert_eq!(parse_state_body("{}").unwrap(), StatePoll::Empty);
    }

    #[test]
    fn state_objects_are_active() {
        let poll = parse_state_body(r#"{"frame": 3, "playerHp": 2}"#).unwrap();
        assert_eq!(poll, StatePoll::Active(json!({"frame": 3, "playerHp": 2})));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = parse_state_body("<html>").unwrap_err();
        assert!(matches!(err, GameClientError::Json(_)));
        assert!(!err.is_connection_failure());
    }
}
