pub mod loader;
pub mod types;

pub use loader::{load_level_scenarios, load_story};
pub use types::{Action, ActionId, Level, LevelId, Scenario, Story, StoryId};
