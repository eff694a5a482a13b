//! Appearance preferences persisted as a two-entry JSON file:
//! `{"theme": "...", "primaryColor": {...}}`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{HrmError, Result};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    /// Follow the viewer's platform setting.
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CssVars {
    pub primary: String,
    pub primary_foreground: String,
    pub primary_hover: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryColor {
    #[schema(example = "blue")]
    pub name: String,
    #[schema(example = "hsl(221, 83%, 53%)")]
    pub value: String,
    pub css_vars: CssVars,
}

fn color(name: &str, hsl: (u16, u8, u8), foreground: &str, hover_lightness: u8) -> PrimaryColor {
    let (h, s, l) = hsl;
    PrimaryColor {
        name: name.to_string(),
        value: format!("hsl({h}, {s}%, {l}%)"),
        css_vars: CssVars {
            primary: format!("{h} {s}% {l}%"),
            primary_foreground: foreground.to_string(),
            primary_hover: format!("{h} {s}% {hover_lightness}%"),
        },
    }
}

/// Selectable primary colors. The first one is the default.
pub static PALETTE: Lazy<Vec<PrimaryColor>> = Lazy::new(|| {
    const LIGHT_TEXT: &str = "210 40% 98%";
    vec![
        color("blue", (221, 83, 53), LIGHT_TEXT, 45),
        color("green", (142, 76, 36), "355 100% 97%", 30),
        color("purple", (262, 83, 58), LIGHT_TEXT, 50),
        color("red", (0, 84, 60), LIGHT_TEXT, 52),
        color("orange", (25, 95, 53), LIGHT_TEXT, 45),
        color("pink", (330, 81, 60), LIGHT_TEXT, 52),
    ]
});

pub fn palette_color(name: &str) -> Option<&'static PrimaryColor> {
    PALETTE.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Preferences {
    pub theme: ThemeMode,
    #[serde(rename = "primaryColor")]
    pub primary_color: PrimaryColor,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            primary_color: PALETTE[0].clone(),
        }
    }
}

/// Partial update. Colors are chosen from [`PALETTE`] by name.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub theme: Option<ThemeMode>,
    #[schema(example = "green")]
    pub primary_color: Option<String>,
}

/// Preferences held in memory and written through to a file on every change.
pub struct PreferenceStore {
    path: PathBuf,
    current: RwLock<Preferences>,
}

impl PreferenceStore {
    /// Loads `path`. A missing or unreadable file yields the defaults; the
    /// file is only created on the first save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match load(&path) {
            Ok(Some(prefs)) => prefs,
            Ok(None) => Preferences::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable preferences");
                Preferences::default()
            }
        };
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn get(&self) -> Preferences {
        match self.current.read() {
            Ok(prefs) => prefs.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, update: PreferencesUpdate) -> Result<Preferences> {
        let color = match update.primary_color.as_deref() {
            Some(name) => Some(
                palette_color(name)
                    .ok_or_else(|| HrmError::validation(format!("unknown primary color `{name}`")))?
                    .clone(),
            ),
            None => None,
        };

        let mut current = self
            .current
            .write()
            .map_err(|_| HrmError::Preferences("preference lock poisoned".into()))?;
        let mut next = current.clone();
        if let Some(theme) = update.theme {
            next.theme = theme;
        }
        if let Some(color) = color {
            next.primary_color = color;
        }

        save(&self.path, &next)?;
        info!(theme = %next.theme, color = %next.primary_color.name, "Preferences saved");
        *current = next.clone();
        Ok(next)
    }
}

fn load(path: &Path) -> Result<Option<Preferences>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(HrmError::Preferences(e.to_string())),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| HrmError::Preferences(e.to_string()))
}

fn save(path: &Path, prefs: &Preferences) -> Result<()> {
    let text =
        serde_json::to_string_pretty(prefs).map_err(|e| HrmError::Preferences(e.to_string()))?;
    fs::write(path, text).map_err(|e| HrmError::Preferences(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("prefs.json"));

        let prefs = store.get();

        assert_eq!(prefs.theme, ThemeMode::Light);
        assert_eq!(prefs.primary_color.name, "blue");
        assert_eq!(prefs.primary_color.css_vars.primary_hover, "221 83% 45%");
    }

    #[test]
    fn update_persists_two_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let store = PreferenceStore::open(&path);

        store
            .update(PreferencesUpdate {
                theme: Some(ThemeMode::Dark),
                primary_color: Some("Green".into()),
            })
            .unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let object = raw.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["theme"], "dark");
        assert_eq!(object["primaryColor"]["name"], "green");
        assert_eq!(object["primaryColor"]["cssVars"]["primaryForeground"], "355 100% 97%");

        let reopened = PreferenceStore::open(&path);
        assert_eq!(reopened.get().theme, ThemeMode::Dark);
    }

    #[test]
    fn unknown_color_is_rejected_and_nothing_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let store = PreferenceStore::open(&path);

        let err = store
            .update(PreferencesUpdate {
                theme: Some(ThemeMode::System),
                primary_color: Some("teal".into()),
            })
            .unwrap_err();

        assert!(matches!(err, HrmError::Validation(_)));
        assert!(!path.exists());
        assert_eq!(store.get().theme, ThemeMode::Light);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").unwrap();

        assert_eq!(PreferenceStore::open(&path).get(), Preferences::default());
    }
}
