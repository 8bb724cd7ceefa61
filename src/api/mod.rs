pub mod client;
pub mod http;
pub mod types;

use thiserror::Error;

pub use client::ApiClient;
pub use http::{BaseUrl, TcpTransport};
pub use types::{LeaderboardEntry, PowerUp, UserPowerUp, UserProfile};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server returned {code} {reason}")]
    Status { code: u16, reason: String },
    #[error("not authorized")]
    Unauthorized,
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed request or response: {0}")]
    Malformed(String),
}
