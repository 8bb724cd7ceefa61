//! Power-up eligibility: which reward, if any, a correct-answer count unlocks.

use log::{info, warn};
use std::collections::HashSet;

use crate::api::types::{PowerUpId, UserPowerUp};
use crate::api::{ApiClient, ApiError, PowerUp};

/// The earn half of the power-up round-trip.
pub trait PowerUpService {
    fn earn(&self, power_up: &PowerUp) -> Result<UserPowerUp, ApiError>;
}

/// [`ApiClient`] bound to the player's token.
#[derive(Debug)]
pub struct AuthorizedPowerUps<'a> {
    pub client: &'a ApiClient,
    pub token: &'a str,
}

impl PowerUpService for AuthorizedPowerUps<'_> {
    fn earn(&self, power_up: &PowerUp) -> Result<UserPowerUp, ApiError> {
        self.client.earn_power_up(power_up, self.token)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EarnedPowerUp {
    pub user_power_up_id: u64,
    pub power_up: PowerUp,
}

/// The most advanced power-up `correct_answers` qualifies for.
/// Equal thresholds resolve to the first one listed.
pub fn select_power_up(correct_answers: u32, power_ups: &[PowerUp]) -> Option<&PowerUp> {
    power_ups
        .iter()
        .filter(|p| correct_answers >= p.required_correct_answers)
        .reduce(|best, p| {
            if p.required_correct_answers > best.required_correct_answers {
                p
            } else {
                best
            }
        })
}

/// Select and earn at most one power-up.
///
/// `Ok(None)` when nothing qualifies. A service error means nothing was
/// earned; it is returned so the caller can react to a rejected session.
pub fn check_and_earn(
    service: &dyn PowerUpService,
    correct_answers: u32,
    power_ups: &[PowerUp],
) -> Result<Option<EarnedPowerUp>, ApiError> {
    let Some(candidate) = select_power_up(correct_answers, power_ups) else {
        return Ok(None);
    };
    let earned = service.earn(candidate).map_err(|e| {
        warn!("power-up earn failed for {}: {}", candidate.id, e);
        e
    })?;
    info!("earned power-up {}", earned.power_up.name);
    Ok(Some(EarnedPowerUp {
        user_power_up_id: earned.id,
        power_up: earned.power_up,
    }))
}

/// A story's power-ups plus the ones already earned this session.
///
/// A tier that was already granted is not requested again, and lower tiers
/// are never granted in its place.
#[derive(Debug, Default)]
pub struct PowerUpLedger {
    available: Vec<PowerUp>,
    earned: HashSet<PowerUpId>,
}

impl PowerUpLedger {
    pub fn new(available: Vec<PowerUp>) -> Self {
        PowerUpLedger {
            available,
            earned: HashSet::new(),
        }
    }

    /// `Ok(None)` when nothing new is due.
    pub fn check(
        &mut self,
        service: &dyn PowerUpService,
        correct_answers: u32,
    ) -> Result<Option<EarnedPowerUp>, ApiError> {
        let Some(candidate) = select_power_up(correct_answers, &self.available) else {
            return Ok(None);
        };
        if self.earned.contains(&candidate.id) {
            return Ok(None);
        }
        let earned = check_and_earn(service, correct_answers, std::slice::from_ref(candidate))?;
        if earned.is_some() {
            self.earned.insert(candidate.id);
        }
        Ok(earned)
    }
}
