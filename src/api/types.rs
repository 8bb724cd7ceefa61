use serde::{Deserialize, Serialize};

use crate::story::StoryId;

pub type PowerUpId = u64;
pub type UserPowerUpId = u64;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub highest_score: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Invite {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InviterScore {
    pub username: String,
    #[serde(default)]
    pub highest_score: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PowerUp {
    pub id: PowerUpId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub required_correct_answers: u32,
    #[serde(default)]
    pub story: Option<StoryId>,
}

/// A power-up held by the current user.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UserPowerUp {
    pub id: UserPowerUpId,
    pub power_up: PowerUp,
    #[serde(default)]
    pub is_used: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EarnRequest {
    pub power_up_id: PowerUpId,
}
