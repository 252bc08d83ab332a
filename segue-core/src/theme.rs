//! Theme descriptors and the theme-definition table
//!
//! A theme names a composition file plus the transition metadata and base
//! volume the playback system needs when switching to it. Theme tables are
//! authored externally (TOML in this crate's loader) and keyed by a logical
//! string id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How a transition into a theme should be embellished, as authored in the
/// external theme definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEffect {
    /// Unrecognized value in the source data; treated as no embellishment.
    #[default]
    Unknown,
    None,
    Groove,
    Fill,
    Break,
    Intro,
    End,
    EndAndIntro,
}

/// The quantization boundary a transition waits for, as authored in the
/// external theme definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTiming {
    /// Unrecognized value in the source data; treated as measure-aligned.
    #[default]
    Unknown,
    Immediate,
    Beat,
    Measure,
}

/// A named musical composition descriptor.
///
/// Copied by value into the handoff mailbox, so the render thread never
/// dereferences control-thread-owned memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Composition file identifier, resolved by the segment store.
    pub file: String,
    /// Embellishment style for transitions into this theme.
    #[serde(default)]
    pub transition: TransitionEffect,
    /// Quantization boundary for transitions into this theme.
    #[serde(default)]
    pub timing: TransitionTiming,
    /// Base volume scalar, multiplied with the settings music volume.
    #[serde(default = "default_theme_volume")]
    pub volume: f32,
}

fn default_theme_volume() -> f32 {
    1.0
}

impl Theme {
    /// Theme with default transition metadata and full base volume.
    pub fn new(file: impl Into<String>) -> Theme {
        Theme {
            file: file.into(),
            transition: TransitionEffect::default(),
            timing: TransitionTiming::default(),
            volume: default_theme_volume(),
        }
    }
}

/// Theme definitions keyed by logical music id.
///
/// Lookups are case-insensitive; source data conventions for the ids vary
/// (script symbols are traditionally upper-case), so keys are normalized to
/// upper-case on insertion.
#[derive(Debug, Clone, Default)]
pub struct ThemeTable {
    themes: HashMap<String, Theme>,
}

#[derive(Deserialize)]
struct ThemeTableFile {
    #[serde(default)]
    themes: HashMap<String, Theme>,
}

impl ThemeTable {
    pub fn new() -> ThemeTable {
        ThemeTable::default()
    }

    /// Parse a table from TOML text of the form:
    ///
    /// ```toml
    /// [themes.SYS_LOADING]
    /// file = "sys_loading.sgt"
    /// transition = "intro"
    /// timing = "measure"
    /// volume = 0.8
    /// ```
    pub fn from_toml_str(text: &str) -> Result<ThemeTable, toml::de::Error> {
        let file: ThemeTableFile = toml::from_str(text)?;
        let mut table = ThemeTable::new();
        for (id, theme) in file.themes {
            table.insert(id, theme);
        }
        Ok(table)
    }

    pub fn insert(&mut self, id: impl Into<String>, theme: Theme) {
        self.themes.insert(id.into().to_uppercase(), theme);
    }

    pub fn get(&self, id: &str) -> Option<&Theme> {
        self.themes.get(&id.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}
