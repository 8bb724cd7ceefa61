//! Feedback shown after the player picks an action.

use crate::story::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Correct,
    /// Correct, but not the best-scoring choice.
    Partially,
    Wrong,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub headline: &'static str,
    pub explanation: String,
}

pub fn classify(action: &Action, max_points: i32) -> OutcomeKind {
    if !action.is_correct {
        OutcomeKind::Wrong
    } else if action.points >= max_points {
        OutcomeKind::Correct
    } else {
        OutcomeKind::Partially
    }
}

pub fn present(action: &Action, max_points: i32) -> Outcome {
    let kind = classify(action, max_points);
    let (headline, fallback) = match kind {
        OutcomeKind::Correct => ("Correct!", "That was the best call."),
        OutcomeKind::Partially => (
            "Partially correct",
            "Good instinct, but there was a stronger option.",
        ),
        OutcomeKind::Wrong => ("Not quite", "That choice let misinformation through."),
    };
    let explanation = action
        .outcome
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(fallback)
        .to_string();
    Outcome {
        kind,
        headline,
        explanation,
    }
}
