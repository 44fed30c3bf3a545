//! Background theme preference
//!
//! The clock model only stores which theme is selected; drawing it is up to
//! whatever renders the page.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{keys, ClockStore, ClockStoreExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Snow,
    Night,
    Interactive,
    Aurora,
    Breeze,
    Mist,
    Rain,
    Drift,
}

impl Theme {
    pub const ALL: [Theme; 8] = [
        Theme::Snow,
        Theme::Night,
        Theme::Interactive,
        Theme::Aurora,
        Theme::Breeze,
        Theme::Mist,
        Theme::Rain,
        Theme::Drift,
    ];

    /// Identifier persisted under `bgTheme`
    pub fn id(self) -> &'static str {
        match self {
            Theme::Snow => "snow",
            Theme::Night => "night",
            Theme::Interactive => "interactive",
            Theme::Aurora => "aurora",
            Theme::Breeze => "breeze",
            Theme::Mist => "mist",
            Theme::Rain => "rain",
            Theme::Drift => "drift",
        }
    }

    /// Human-readable name shown in the theme picker
    pub fn display_name(self) -> &'static str {
        match self {
            Theme::Snow => "Snowfall Serenity",
            Theme::Night => "Night Sky",
            Theme::Interactive => "Interactive Starfield",
            Theme::Aurora => "Aurora Waves",
            Theme::Breeze => "Breeze Flow",
            Theme::Mist => "Dream Mist",
            Theme::Rain => "Rainfall Rhythm",
            Theme::Drift => "Particle Drift",
        }
    }

    /// Read the saved theme, defaulting to snow when missing or unknown
    pub fn restore(store: &dyn ClockStore) -> Self {
        store
            .get(keys::BG_THEME)
            .and_then(|id| {
                id.parse().ok().or_else(|| {
                    debug!("Unknown saved theme {:?}, using default", id);
                    None
                })
            })
            .unwrap_or_default()
    }

    pub fn persist(self, store: &dyn ClockStore) {
        store.put(keys::BG_THEME, self.id());
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.id() == s.trim())
            .ok_or_else(|| format!("Unknown theme: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn ids_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(theme.id().parse::<Theme>().unwrap(), theme);
        }
        assert!("sunset".parse::<Theme>().is_err());
    }

    #[test]
    fn restore_defaults_to_snow() {
        assert_eq!(Theme::restore(&MemoryStore::new()), Theme::Snow);

        let store = MemoryStore::with_entries([(keys::BG_THEME, "sunset")]);
        assert_eq!(Theme::restore(&store), Theme::Snow);
    }

    #[test]
    fn persist_then_restore() {
        let store = MemoryStore::new();
        Theme::Rain.persist(&store);
        assert_eq!(store.get(keys::BG_THEME).as_deref(), Some("rain"));
        assert_eq!(Theme::restore(&store), Theme::Rain);
        assert_eq!(Theme::Rain.display_name(), "Rainfall Rhythm");
    }
}
