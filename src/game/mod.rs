pub mod outcome;
pub mod powerup;
pub mod progression;

pub use outcome::OutcomeKind;
pub use powerup::{AuthorizedPowerUps, EarnedPowerUp, PowerUpLedger};
pub use progression::{Game, GameError, GameRules, Phase, Progress, SideView, Signal};
