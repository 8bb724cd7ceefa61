use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::types::{LevelId, Scenario, Story, StoryId};

#[derive(Debug, Deserialize)]
struct LevelFile {
    level: LevelId,
    #[serde(default, rename = "scenario")]
    scenarios: Vec<Scenario>,
}

/// Story metadata from `story.toml` in a story pack directory.
pub fn load_story(dir: &Path) -> Result<Story> {
    let path = dir.join("story.toml");
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut story: Story =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    story.levels.sort_by_key(|l| l.order);
    Ok(story)
}

/// Scenarios for one level, looked up across the pack's `level_*.toml` files.
pub fn load_level_scenarios(dir: &Path, story: StoryId, level: LevelId) -> Result<Vec<Scenario>> {
    let pattern = dir.join("level_*.toml");
    let pattern = pattern.to_string_lossy();

    let mut paths: Vec<_> = glob::glob(&pattern)?.filter_map(|p| p.ok()).collect();
    // Sort by filename so level_01, level_02, level_03 are in order
    paths.sort();

    for path in paths {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file: LevelFile =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        if file.level != level {
            continue;
        }
        let mut scenarios = file.scenarios;
        for scenario in &mut scenarios {
            scenario.story.get_or_insert(story);
            scenario.level.get_or_insert(level);
        }
        scenarios.sort_by_key(|s| s.order);
        return Ok(scenarios);
    }

    bail!("no scenarios for level {} in {}", level, dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY: &str = r#"
id = 3
title = "Deepfake Week"
description = "Spot the fake before it spreads."

[[levels]]
id = 31
title = "Second"
order = 2

[[levels]]
id = 30
title = "First"
order = 1
"#;

    const LEVEL: &str = r#"
level = 30

[[scenario]]
id = 2
description = "A video of the mayor surfaces."
order = 2

[[scenario.actions]]
id = 20
text = "Share it"
points = 0

[[scenario]]
id = 1
description = "A screenshot of a tweet."
order = 1

[[scenario.actions]]
id = 10
text = "Search for the original"
is_correct = true
points = 3
"#;

    #[test]
    fn loads_story_with_levels_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("story.toml"), STORY).unwrap();

        let story = load_story(dir.path()).unwrap();
        assert_eq!(story.id, 3);
        let ids: Vec<_> = story.levels.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![30, 31]);
    }

    #[test]
    fn loads_scenarios_for_matching_level() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("level_01.toml"), LEVEL).unwrap();

        let scenarios = load_level_scenarios(dir.path(), 3, 30).unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].id, 1);
        assert_eq!(scenarios[0].story, Some(3));
        assert_eq!(scenarios[0].level, Some(30));
        assert!(scenarios[0].actions[0].is_correct);
    }

    #[test]
    fn missing_level_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("level_01.toml"), LEVEL).unwrap();

        assert!(load_level_scenarios(dir.path(), 3, 99).is_err());
    }
}
