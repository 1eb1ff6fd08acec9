//! Match settings resolved from command-line flags and an optional TOML file.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use tactics_arena_system_orchestrator::{GameSpeed, Pacing};
use tactics_arena_world::DEFAULT_SEED;

/// Round after which a headless match is abandoned when nothing else is configured.
pub(crate) const DEFAULT_MAX_ROUNDS: u32 = 200;

/// Settings that may be stored in a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) seed: Option<u64>,
    pub(crate) speed: Option<GameSpeed>,
    pub(crate) turn_delay_ms: Option<u64>,
    pub(crate) max_rounds: Option<u32>,
}

impl FileConfig {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }
}

/// Overrides supplied on the command line.
#[derive(Clone, Debug, Default)]
pub(crate) struct FlagOverrides {
    pub(crate) seed: Option<u64>,
    pub(crate) speed: Option<GameSpeed>,
    pub(crate) turn_delay_ms: Option<u64>,
    pub(crate) max_rounds: Option<u32>,
}

/// Fully resolved match settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct MatchSettings {
    pub(crate) seed: u64,
    pub(crate) pacing: Pacing,
    pub(crate) max_rounds: u32,
}

impl MatchSettings {
    /// Flags win over the file, and an explicit delay wins over a speed preset
    /// from the same source.
    pub(crate) fn resolve(flags: &FlagOverrides, file: &FileConfig) -> Self {
        let delay = flags
            .turn_delay_ms
            .map(Duration::from_millis)
            .or_else(|| flags.speed.map(GameSpeed::turn_delay))
            .or_else(|| file.turn_delay_ms.map(Duration::from_millis))
            .or_else(|| file.speed.map(GameSpeed::turn_delay))
            .unwrap_or_else(|| GameSpeed::default().turn_delay());

        Self {
            seed: flags.seed.or(file.seed).unwrap_or(DEFAULT_SEED),
            pacing: Pacing::from_turn_delay(delay),
            max_rounds: flags
                .max_rounds
                .or(file.max_rounds)
                .unwrap_or(DEFAULT_MAX_ROUNDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_supported_key() {
        let config = FileConfig::parse(
            r#"
            seed = 12
            speed = "ultra"
            turn_delay_ms = 90
            max_rounds = 30
            "#,
        )
        .expect("valid config");
        assert_eq!(
            config,
            FileConfig {
                seed: Some(12),
                speed: Some(GameSpeed::Ultra),
                turn_delay_ms: Some(90),
                max_rounds: Some(30),
            }
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(FileConfig::parse("difficulty = \"hard\"").is_err());
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let settings = MatchSettings::resolve(&FlagOverrides::default(), &FileConfig::default());
        assert_eq!(settings.seed, DEFAULT_SEED);
        assert_eq!(settings.pacing, Pacing::from(GameSpeed::Normal));
        assert_eq!(settings.max_rounds, DEFAULT_MAX_ROUNDS);
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileConfig {
            seed: Some(1),
            speed: Some(GameSpeed::Slow),
            turn_delay_ms: None,
            max_rounds: Some(10),
        };
        let flags = FlagOverrides {
            seed: Some(2),
            speed: Some(GameSpeed::Fast),
            ..FlagOverrides::default()
        };
        let settings = MatchSettings::resolve(&flags, &file);
        assert_eq!(settings.seed, 2);
        assert_eq!(settings.pacing, Pacing::from(GameSpeed::Fast));
        assert_eq!(settings.max_rounds, 10);
    }

    #[test]
    fn explicit_delay_beats_speed_preset() {
        let file = FileConfig {
            speed: Some(GameSpeed::Slow),
            turn_delay_ms: Some(0),
            ..FileConfig::default()
        };
        let settings = MatchSettings::resolve(&FlagOverrides::default(), &file);
        assert_eq!(settings.pacing, Pacing::instant());
    }
}
