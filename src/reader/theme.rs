//! Reader color themes.

use crate::db::{Database, PREF_READER_THEME};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cosmetic theme of the reading view.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark background, inverted document.
    #[default]
    Dark,
    /// Light background, document untouched.
    Light,
    /// Warm paper tones.
    Sepia,
}

/// Colors a theme applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Page background.
    pub background: &'static str,
    /// Navigation bar background.
    pub nav: &'static str,
    /// Text color.
    pub text: &'static str,
    /// Border color.
    pub border: &'static str,
    /// CSS filter applied over the rendered document.
    pub document_filter: &'static str,
}

impl Theme {
    /// All themes, in menu order.
    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Sepia, Theme::Light];

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Sepia => "sepia",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark Mode",
            Theme::Light => "Light Mode",
            Theme::Sepia => "Sepia Mode",
        }
    }

    /// Colors for this theme.
    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: "#121212",
                nav: "#1e1e1e",
                text: "#fff",
                border: "#333",
                document_filter: "invert(0.9) hue-rotate(180deg)",
            },
            Theme::Light => Palette {
                background: "#f5f5f5",
                nav: "#ffffff",
                text: "#333",
                border: "#ddd",
                document_filter: "none",
            },
            Theme::Sepia => Palette {
                background: "#f4ecd8",
                nav: "#e8ddc5",
                text: "#5b4636",
                border: "#d3c4a9",
                document_filter: "sepia(0.5) contrast(0.9)",
            },
        }
    }

    /// Load the saved theme, or `default` when none (or an unknown one) is stored.
    pub fn load(db: &Database, default: Theme) -> Result<Theme> {
        let Some(stored) = db.get_preference(PREF_READER_THEME)? else {
            return Ok(default);
        };

        Ok(stored.parse().unwrap_or_else(|_| {
            tracing::warn!(theme = %stored, "Unknown saved theme, using default");
            default
        }))
    }

    /// Remember this theme.
    pub fn save(&self, db: &Database) -> Result<()> {
        db.set_preference(PREF_READER_THEME, self.as_str())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            "sepia" => Ok(Theme::Sepia),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}
