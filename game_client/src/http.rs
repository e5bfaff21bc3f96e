use crate::{parse_state_body, GameClientError, GameServer, StatePoll};
use packets::ActionPacket;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct HealthReply {
    #[serde(default)]
    ok: bool,
}

/// Blocking client for the game server. Every request is bounded by the
/// timeout given at construction.
pub struct HttpGameClient {
    client: Client,
    base_url: String,
}

impl HttpGameClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GameClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        tracing::debug!(base_url, ?timeout, "game client ready");
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl GameServer for HttpGameClient {
    fn fetch_state(&self) -> Result<StatePoll, GameClientError> {
        let response = self.client.get(self.endpoint("state")).send()?;
        match response.status() {
            StatusCode::SERVICE_UNAVAILABLE => Ok(StatePoll::NotActive),
            status if status.is_success() => parse_state_body(&response.text()?),
            status => Err(GameClientError::Status {
                endpoint: "state",
                status: status.as_u16(),
            }),
        }
    }

    fn send_action(&self, action: &ActionPacket) -> Result<(), GameClientError> {
        let response = self
            .client
            .post(self.endpoint("action"))
            .json(action)
            .send()?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(GameClientError::Status {
                endpoint: "action",
                status: status.as_u16(),
            })
        }
    }

    fn health(&self) -> Result<bool, GameClientError> {
        let response = self.client.get(self.endpoint("health")).send()?;
        if !response.status().is_success() {
            return Ok(false);
        }
        Ok(response.json::<HealthReply>()?.ok)
    }
}
