use anyhow::Result;
use std::path::PathBuf;

use crate::api::ApiClient;
use crate::story::{self, LevelId, Scenario, Story, StoryId};

/// Where story content comes from: the backend, or a story pack on disk.
pub trait StorySource {
    fn story(&self, id: StoryId) -> Result<Story>;
    fn scenarios(&self, story: StoryId, level: LevelId) -> Result<Vec<Scenario>>;
}

impl StorySource for ApiClient {
    fn story(&self, id: StoryId) -> Result<Story> {
        Ok(ApiClient::story(self, id)?)
    }

    fn scenarios(&self, story: StoryId, level: LevelId) -> Result<Vec<Scenario>> {
        Ok(self.level_scenarios(story, level)?)
    }
}

#[derive(Debug, Clone)]
pub struct StoryPack {
    pub dir: PathBuf,
}

impl StorySource for StoryPack {
    fn story(&self, _id: StoryId) -> Result<Story> {
        story::load_story(&self.dir)
    }

    fn scenarios(&self, story: StoryId, level: LevelId) -> Result<Vec<Scenario>> {
        story::load_level_scenarios(&self.dir, story, level)
    }
}

/// Fetch a story and the scenarios of its first level.
pub fn load_opening(source: &dyn StorySource, id: StoryId) -> Result<(Story, Vec<Scenario>)> {
    let story = source.story(id)?;
    let first = story
        .levels
        .first()
        .ok_or_else(|| anyhow::anyhow!("story {} has no levels", story.id))?;
    let scenarios = source.scenarios(story.id, first.id)?;
    Ok((story, scenarios))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::scripted;

    #[test]
    fn opening_fetches_story_then_first_level() {
        let (transport, client) = scripted();
        transport.reply(
            200,
            r#"{"id": 1, "title": "T", "levels": [{"id": 4, "title": "L1"}, {"id": 5, "title": "L2"}]}"#,
        );
        transport.reply(200, r#"[{"id": 9, "description": "S"}]"#);

        let (story, scenarios) = load_opening(&client, 1).unwrap();
        assert_eq!(story.levels.len(), 2);
        assert_eq!(scenarios[0].id, 9);
        assert_eq!(
            transport.requests.borrow()[1].path,
            "/stories/1/levels/4/scenarios"
        );
    }

    #[test]
    fn story_without_levels_fails() {
        let (transport, client) = scripted();
        transport.reply(200, r#"{"id": 1, "title": "Empty"}"#);

        assert!(load_opening(&client, 1).is_err());
    }

    #[test]
    fn bundled_story_pack_plays_through() {
        use crate::game::{Game, GameRules, Phase, Signal};

        let pack = StoryPack {
            dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("stories/viral_rumour"),
        };
        let (story, scenarios) = load_opening(&pack, 1).unwrap();
        let mut game = Game::new(story, scenarios, GameRules::default());
        game.start().unwrap();

        while !game.phase().is_terminal() {
            if let Phase::LevelIntro = game.phase() {
                game.start_level().unwrap();
                continue;
            }
            let best = game
                .scenario()
                .unwrap()
                .actions
                .iter()
                .max_by_key(|a| a.points)
                .unwrap()
                .id;
            game.choose_action(best).unwrap();
            if let Some(Signal::RequestLevelData { level_id, .. }) = game.proceed().unwrap() {
                let next = pack.scenarios(game.story().id, level_id).unwrap();
                game.deliver_level_data(next).unwrap();
                game.continue_to_next_level().unwrap();
            }
        }

        assert_eq!(*game.phase(), Phase::End);
        assert_eq!(game.progress().score, 9);
        assert_eq!(game.progress().lives, 3);
    }

    #[test]
    fn network_failure_propagates() {
        let (transport, client) = scripted();
        transport.fail();

        assert!(load_opening(&client, 1).is_err());
    }
}
