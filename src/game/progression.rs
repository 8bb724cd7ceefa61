//! Level and scenario progression for a single play-through.
//!
//! [`Game`] owns the story, the active level's scenarios and the player's
//! [`Progress`]. It only changes in response to the operations below; data
//! fetching happens outside and is fed back in through [`Signal`]s.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::outcome::{self, Outcome};
use crate::story::{Action, ActionId, Level, LevelId, Scenario, Story};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    pub initial_lives: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules { initial_lives: 3 }
    }
}

/// Session counters. The current [`Phase`] is kept alongside in [`Game`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub score: u32,
    pub level: usize,
    pub scenario_index: usize,
    pub lives: u32,
    /// Correct answers this session, the input to power-up eligibility.
    #[serde(default)]
    pub correct_answers: u32,
}

impl Progress {
    pub fn new(rules: GameRules) -> Self {
        Progress {
            score: 0,
            level: 0,
            scenario_index: 0,
            lives: rules.initial_lives,
            correct_answers: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub action: Action,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Start,
    /// `selection` is set while the outcome of the chosen action is shown.
    Playing { selection: Option<Selection> },
    LevelIntro,
    /// `next` holds the following level's scenarios once they have been fetched.
    LevelComplete { next: Option<Vec<Scenario>> },
    End,
    GameOver,
    Leaderboard { origin: Box<Phase> },
    Profile { origin: Box<Phase> },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Playing { .. } => "playing",
            Phase::LevelIntro => "level-intro",
            Phase::LevelComplete { .. } => "level-complete",
            Phase::End => "end",
            Phase::GameOver => "gameover",
            Phase::Leaderboard { .. } => "leaderboard",
            Phase::Profile { .. } => "profile",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::End | Phase::GameOver)
    }
}

/// Work the caller must do on the game's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Fetch the story and its first level, then call [`Game::reload`].
    RequestInitialData,
    /// Fetch scenarios for `level_id`, then call [`Game::deliver_level_data`].
    RequestLevelData { level_index: usize, level_id: LevelId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideView {
    Leaderboard,
    Profile,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("cannot {op} during {phase}")]
    NotPossibleForState {
        op: &'static str,
        phase: &'static str,
    },
    #[error("an action is already selected")]
    AlreadySelected,
    #[error("no action selected")]
    NothingSelected,
    #[error("action {0} is not part of the active scenario")]
    UnknownAction(ActionId),
    #[error("level has no scenarios")]
    EmptyLevel,
    #[error("next level is still loading")]
    LevelDataPending,
    #[error("saved progress does not fit this story: {0}")]
    InvalidSnapshot(String),
}

#[derive(Debug, Clone)]
pub struct Game {
    rules: GameRules,
    story: Story,
    scenarios: Vec<Scenario>,
    progress: Progress,
    phase: Phase,
}

impl Game {
    pub fn new(story: Story, scenarios: Vec<Scenario>, rules: GameRules) -> Self {
        Game {
            rules,
            story,
            scenarios,
            progress: Progress::new(rules),
            phase: Phase::Start,
        }
    }

    /// Rehydrate saved progress, landing on the saved scenario with nothing selected.
    pub fn resume(
        story: Story,
        scenarios: Vec<Scenario>,
        rules: GameRules,
        progress: Progress,
    ) -> Result<Self, GameError> {
        if progress.level >= story.levels.len() {
            return Err(GameError::InvalidSnapshot(format!(
                "level {} of {}",
                progress.level,
                story.levels.len()
            )));
        }
        if progress.scenario_index >= scenarios.len() {
            return Err(GameError::InvalidSnapshot(format!(
                "scenario {} of {}",
                progress.scenario_index,
                scenarios.len()
            )));
        }
        if progress.lives == 0 || progress.lives > rules.initial_lives {
            return Err(GameError::InvalidSnapshot(format!(
                "{} lives",
                progress.lives
            )));
        }
        info!(
            "resuming story {} at level {} scenario {}",
            story.id, progress.level, progress.scenario_index
        );
        Ok(Game {
            rules,
            story,
            scenarios,
            progress,
            phase: Phase::Playing { selection: None },
        })
    }

    pub fn rules(&self) -> GameRules {
        self.rules
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn level(&self) -> Option<&Level> {
        self.story.level(self.progress.level)
    }

    /// The scenario being played, if any.
    pub fn scenario(&self) -> Option<&Scenario> {
        match self.phase {
            Phase::Playing { .. } => self.scenarios.get(self.progress.scenario_index),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        match &self.phase {
            Phase::Playing { selection } => selection.as_ref(),
            _ => None,
        }
    }

    /// Whether the next level's data has arrived (only meaningful in level-complete).
    pub fn next_level_ready(&self) -> bool {
        matches!(self.phase, Phase::LevelComplete { next: Some(_) })
    }

    fn not_possible(&self, op: &'static str) -> GameError {
        GameError::NotPossibleForState {
            op,
            phase: self.phase.name(),
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!("phase {} -> {}", self.phase.name(), phase.name());
        self.phase = phase;
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Start {
            return Err(self.not_possible("start"));
        }
        if self.scenarios.is_empty() {
            return Err(GameError::EmptyLevel);
        }
        info!("starting story {}", self.story.id);
        self.set_phase(Phase::Playing { selection: None });
        Ok(())
    }

    /// Score the chosen action and show its outcome. Negative point values
    /// count as zero.
    pub fn choose_action(&mut self, action_id: ActionId) -> Result<Outcome, GameError> {
        match &self.phase {
            Phase::Playing { selection: None } => {}
            Phase::Playing { selection: Some(_) } => return Err(GameError::AlreadySelected),
            _ => return Err(self.not_possible("choose an action")),
        }
        let scenario = self
            .scenarios
            .get(self.progress.scenario_index)
            .ok_or(GameError::EmptyLevel)?;
        let action = scenario
            .action(action_id)
            .ok_or(GameError::UnknownAction(action_id))?
            .clone();
        let outcome = outcome::present(&action, scenario.max_points());

        let awarded = action.points.max(0).unsigned_abs();
        self.progress.score = self.progress.score.saturating_add(awarded);
        if action.is_correct {
            self.progress.correct_answers += 1;
        }
        debug!(
            "scenario {} action {} -> {:?} (+{})",
            scenario.id, action.id, outcome.kind, awarded
        );

        self.set_phase(Phase::Playing {
            selection: Some(Selection {
                action,
                outcome: outcome.clone(),
            }),
        });
        Ok(outcome)
    }

    /// Dismiss the outcome and move on: next scenario, level-complete, end or
    /// game over.
    pub fn proceed(&mut self) -> Result<Option<Signal>, GameError> {
        let selection = match &mut self.phase {
            Phase::Playing { selection } => selection.take().ok_or(GameError::NothingSelected)?,
            _ => return Err(self.not_possible("proceed")),
        };

        if !selection.action.is_correct {
            self.progress.lives = self.progress.lives.saturating_sub(1);
            if self.progress.lives == 0 {
                info!("out of lives with score {}", self.progress.score);
                self.set_phase(Phase::GameOver);
                return Ok(None);
            }
        }
        Ok(self.advance())
    }

    fn advance(&mut self) -> Option<Signal> {
        if self.progress.scenario_index + 1 < self.scenarios.len() {
            self.progress.scenario_index += 1;
            self.set_phase(Phase::Playing { selection: None });
            return None;
        }

        let next_index = self.progress.level + 1;
        match self.story.level(next_index) {
            Some(next) => {
                let level_id = next.id;
                self.set_phase(Phase::LevelComplete { next: None });
                Some(Signal::RequestLevelData {
                    level_index: next_index,
                    level_id,
                })
            }
            None => {
                info!("story {} complete with score {}", self.story.id, self.progress.score);
                self.set_phase(Phase::End);
                None
            }
        }
    }

    pub fn deliver_level_data(&mut self, scenarios: Vec<Scenario>) -> Result<(), GameError> {
        match &mut self.phase {
            Phase::LevelComplete { next } => {
                if scenarios.is_empty() {
                    return Err(GameError::EmptyLevel);
                }
                *next = Some(scenarios);
                Ok(())
            }
            _ => Err(self.not_possible("accept level data")),
        }
    }

    pub fn continue_to_next_level(&mut self) -> Result<(), GameError> {
        let scenarios = match &mut self.phase {
            Phase::LevelComplete { next } => next.take().ok_or(GameError::LevelDataPending)?,
            _ => return Err(self.not_possible("continue")),
        };
        self.scenarios = scenarios;
        self.progress.level += 1;
        self.progress.scenario_index = 0;
        self.set_phase(Phase::LevelIntro);
        Ok(())
    }

    pub fn start_level(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::LevelIntro {
            return Err(self.not_possible("start the level"));
        }
        self.set_phase(Phase::Playing { selection: None });
        Ok(())
    }

    /// Back to the start screen with fresh counters. The caller refetches data.
    pub fn restart(&mut self) -> Signal {
        self.progress = Progress::new(self.rules);
        self.set_phase(Phase::Start);
        Signal::RequestInitialData
    }

    pub fn reload(&mut self, story: Story, scenarios: Vec<Scenario>) -> Result<(), GameError> {
        if self.phase != Phase::Start {
            return Err(self.not_possible("reload"));
        }
        self.story = story;
        self.scenarios = scenarios;
        Ok(())
    }

    pub fn open_side_view(&mut self, view: SideView) {
        let current = std::mem::replace(&mut self.phase, Phase::Start);
        let origin = match current {
            Phase::Leaderboard { origin } | Phase::Profile { origin } => origin,
            other => Box::new(other),
        };
        self.phase = match view {
            SideView::Leaderboard => Phase::Leaderboard { origin },
            SideView::Profile => Phase::Profile { origin },
        };
        debug!("opened {}", self.phase.name());
    }

    pub fn close_side_view(&mut self) -> Result<(), GameError> {
        let current = std::mem::replace(&mut self.phase, Phase::Start);
        match current {
            Phase::Leaderboard { origin } | Phase::Profile { origin } => {
                self.set_phase(*origin);
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.not_possible("close a side view"))
            }
        }
    }
}
