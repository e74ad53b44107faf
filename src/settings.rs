//! Player preferences
//!
//! Persisted as one JSON value in the same store as the inventory.

use serde::{Deserialize, Serialize};

use crate::persistence::{KvStore, StoreError, get_json, set_json};
use crate::sim::Difficulty;

/// How the player steers their paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlStyle {
    /// Hold on-screen arrows
    #[default]
    Arrows,
    /// Drag anywhere to place the paddle
    Drag,
}

impl ControlStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlStyle::Arrows => "arrows",
            ControlStyle::Drag => "drag",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arrows" | "arrow" => Some(ControlStyle::Arrows),
            "drag" | "touch" => Some(ControlStyle::Drag),
            _ => None,
        }
    }
}

/// Where the arrow buttons sit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ControlPosition {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
    /// Full-width bar under the court
    BottomBar,
}

impl ControlPosition {
    pub const ALL: [ControlPosition; 5] = [
        ControlPosition::BottomRight,
        ControlPosition::BottomLeft,
        ControlPosition::TopRight,
        ControlPosition::TopLeft,
        ControlPosition::BottomBar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlPosition::BottomRight => "bottom-right",
            ControlPosition::BottomLeft => "bottom-left",
            ControlPosition::TopRight => "top-right",
            ControlPosition::TopLeft => "top-left",
            ControlPosition::BottomBar => "bottom-bar",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub control_style: ControlStyle,
    pub control_position: ControlPosition,
    /// Preselected on the difficulty picker
    pub default_difficulty: Difficulty,
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            control_style: ControlStyle::Arrows,
            control_position: ControlPosition::BottomRight,
            default_difficulty: Difficulty::Easy,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "plinko_pong_settings";

    /// Load settings, falling back to defaults on any failure
    pub fn load<S: KvStore + ?Sized>(store: &S) -> Self {
        match get_json::<Settings, S>(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unreadable, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn save<S: KvStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        set_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
