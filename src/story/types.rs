use serde::{Deserialize, Serialize};

pub type StoryId = u64;
pub type LevelId = u64;
pub type ScenarioId = u64;
pub type ActionId = u64;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl Story {
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Level {
    pub id: LevelId,
    pub title: String,
    #[serde(default)]
    pub intro_text: Option<String>,
    #[serde(default)]
    pub intro_image: Option<String>,
    #[serde(default)]
    pub order: u32,
    /// Owning story, by id only.
    #[serde(default)]
    pub story: Option<StoryId>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Scenario {
    pub id: ScenarioId,
    #[serde(default)]
    pub story: Option<StoryId>,
    #[serde(default)]
    pub level: Option<LevelId>,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Scenario {
    /// Highest point value among this scenario's actions, or 0 when it has none.
    pub fn max_points(&self) -> i32 {
        self.actions.iter().map(|a| a.points).max().unwrap_or(0)
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Action {
    pub id: ActionId,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub outcome: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(id: ActionId, is_correct: bool, points: i32) -> Action {
        Action {
            id,
            text: format!("action {id}"),
            is_correct,
            points,
            outcome: None,
        }
    }

    #[test]
    fn max_points_picks_highest_action() {
        let scenario = Scenario {
            id: 1,
            story: None,
            level: None,
            description: "A headline goes viral".into(),
            image: None,
            order: 0,
            actions: vec![action(1, false, 0), action(2, true, 3), action(3, true, 1)],
        };
        assert_eq!(scenario.max_points(), 3);
        assert_eq!(scenario.action(3).map(|a| a.points), Some(1));
        assert!(scenario.action(9).is_none());
    }

    #[test]
    fn story_deserializes_from_backend_json() {
        let json = r#"{
            "id": 7,
            "title": "The Viral Rumour",
            "description": "Track a story to its source.",
            "image": null,
            "levels": [
                {"id": 11, "title": "Headlines", "order": 1, "story": 7},
                {"id": 12, "title": "Sources", "intro_text": "Who said it?", "order": 2, "story": 7}
            ]
        }"#;
        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.levels.len(), 2);
        assert_eq!(story.levels[1].intro_text.as_deref(), Some("Who said it?"));
        assert_eq!(story.level(0).map(|l| l.id), Some(11));
        assert!(story.level(2).is_none());
    }
}
