use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameClientError {
    #[error("could not reach game server: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("HTTP request error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("{endpoint} answered with status {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GameClientError {
    /// Connection refused, reset or timed out before a response arrived.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<reqwest::Error> for GameClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Connection(err)
        } else {
            Self::Http(err)
        }
    }
}
