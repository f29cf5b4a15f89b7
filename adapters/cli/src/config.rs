use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use last_protocol_core::Item;
use last_protocol_system_ambient::{self as ambient, DEFAULT_CROWD_ODDS, DEFAULT_PATROL_ODDS};
use last_protocol_system_hacking::{Hacking, UniformRoll};
use last_protocol_world::{Inventory, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing::info;

/// Optional session file; every key may be omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SessionConfig {
    seed: Option<u64>,
    player_name: Option<String>,
    inventory: Option<Vec<Item>>,
    #[serde(default)]
    ambient: AmbientSection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct AmbientSection {
    crowd_odds: u32,
    patrol_odds: u32,
}

impl Default for AmbientSection {
    fn default() -> Self {
        Self {
            crowd_odds: DEFAULT_CROWD_ODDS,
            patrol_odds: DEFAULT_PATROL_ODDS,
        }
    }
}

impl SessionConfig {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session config at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid session config at {}", path.display()))
    }

    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse session config toml contents")?;
        if let Some(name) = &config.player_name {
            if !is_valid_name(name) {
                bail!("player_name `{name}` must contain only letters and spaces");
            }
        }
        Ok(config)
    }
}

/// Fully resolved session parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    seed: u64,
    player_name: Option<String>,
    inventory: Vec<Item>,
    crowd_odds: u32,
    patrol_odds: u32,
}

impl Settings {
    /// Merges command-line overrides over the file configuration.
    pub(crate) fn resolve(
        seed: Option<u64>,
        player_name: Option<String>,
        file: SessionConfig,
    ) -> Self {
        let seed = seed.or(file.seed).unwrap_or_else(|| {
            let drawn = rand::random();
            info!(seed = drawn, "no seed configured; drew a fresh one");
            drawn
        });

        Self {
            seed,
            player_name: player_name.or(file.player_name),
            inventory: file
                .inventory
                .unwrap_or_else(|| Item::STARTING.to_vec()),
            crowd_odds: file.ambient.crowd_odds,
            patrol_odds: file.ambient.patrol_odds,
        }
    }

    pub(crate) const fn seed(&self) -> u64 {
        self.seed
    }

    pub(crate) fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    pub(crate) fn world(&self) -> World {
        World::with_inventory(Inventory::new(self.inventory.clone()))
    }

    /// Builds the hacking and ambient systems from independent seed streams.
    pub(crate) fn systems(&self) -> (Hacking<UniformRoll<ChaCha8Rng>>, ambient::Ambient) {
        let mut seeds = ChaCha8Rng::seed_from_u64(self.seed);
        let hacking_seed: u64 = seeds.gen();
        let ambient_seed: u64 = seeds.gen();
        (
            Hacking::new(UniformRoll::seeded(hacking_seed)),
            ambient::Ambient::new(ambient::Config::new(
                self.crowd_odds,
                self.patrol_odds,
                ambient_seed,
            )),
        )
    }
}

/// Names are non-empty and hold only ASCII letters and whitespace.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|symbol| symbol.is_ascii_alphabetic() || symbol.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = SessionConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, SessionConfig::default());

        let settings = Settings::resolve(Some(7), None, config);
        assert_eq!(settings.seed(), 7);
        assert_eq!(settings.player_name(), None);
        assert_eq!(settings.inventory, Item::STARTING.to_vec());
        assert_eq!(settings.crowd_odds, 3);
        assert_eq!(settings.patrol_odds, 5);
    }

    #[test]
    fn file_values_are_read() {
        let config = SessionConfig::from_toml_str(
            r#"
seed = 99
player_name = "Maya Shrestha"
inventory = ["vpn_app"]

[ambient]
crowd_odds = 0
"#,
        )
        .expect("config parses");

        let settings = Settings::resolve(None, None, config);
        assert_eq!(settings.seed(), 99);
        assert_eq!(settings.player_name(), Some("Maya Shrestha"));
        assert_eq!(settings.inventory, vec![Item::VpnApp]);
        assert_eq!(settings.crowd_odds, 0);
        assert_eq!(settings.patrol_odds, 5);
    }

    #[test]
    fn flags_override_file() {
        let config = SessionConfig::from_toml_str("seed = 1\nplayer_name = \"File\"")
            .expect("config parses");
        let settings = Settings::resolve(Some(2), Some("Flag".to_owned()), config);
        assert_eq!(settings.seed(), 2);
        assert_eq!(settings.player_name(), Some("Flag"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SessionConfig::from_toml_str("difficulty = \"hard\"").is_err());
        assert!(SessionConfig::from_toml_str("[ambient]\nswarm_odds = 2").is_err());
    }

    #[test]
    fn invalid_player_name_is_rejected() {
        let error = SessionConfig::from_toml_str("player_name = \"R2-D2\"")
            .expect_err("digits are not allowed");
        assert!(error.to_string().contains("letters and spaces"));
    }

    #[test]
    fn name_validation() {
        assert!(is_valid_name("Asha"));
        assert!(is_valid_name("  Bikash Rai "));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("   "));
        assert!(!is_valid_name("neo42"));
    }
}
