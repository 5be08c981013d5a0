use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use crate::timer::error::MAX_MINUTES;

const MIN_TICK_INTERVAL_MS: u64 = 10;
const MAX_TICK_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimerSettings {
    pub default_minutes: u32,
    pub tick_interval_ms: u64,
    pub haptics_enabled: bool,
    pub reward_per_minute: u64,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            default_minutes: 25,
            tick_interval_ms: 100,
            haptics_enabled: true,
            reward_per_minute: 1,
        }
    }
}

impl TimerSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_minutes == 0 || self.default_minutes > MAX_MINUTES {
            bail!(
                "default_minutes must be between 1 and {MAX_MINUTES}, got {}",
                self.default_minutes
            );
        }
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&self.tick_interval_ms) {
            bail!(
                "tick_interval_ms must be between {MIN_TICK_INTERVAL_MS} and {MAX_TICK_INTERVAL_MS}, got {}",
                self.tick_interval_ms
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    timer: TimerSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    /// Loads settings from `path`. A missing file is created with defaults;
    /// an invalid one is logged and left alone while defaults are used.
    pub fn new(path: PathBuf) -> Result<Self> {
        let existed = path.exists();
        let data = if existed {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str::<UserSettings>(&contents) {
                Ok(data) if data.timer.validate().is_ok() => data,
                Ok(_) | Err(_) => {
                    warn!("Ignoring invalid settings at {}", path.display());
                    UserSettings::default()
                }
            }
        } else {
            UserSettings::default()
        };

        let store = Self {
            path,
            data: RwLock::new(data),
        };
        if !existed {
            store.persist(&store.read())?;
        }
        Ok(store)
    }

    pub fn timer(&self) -> TimerSettings {
        self.read().timer.clone()
    }

    pub fn update_timer(&self, settings: TimerSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self.write();
        let mut updated = guard.clone();
        updated.timer = settings;
        self.persist(&updated)?;
        *guard = updated;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("ringfocus-settings-{}", Uuid::new_v4()))
            .join("settings.json")
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let path = temp_path();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.timer(), TimerSettings::default());
        assert_eq!(store.timer().tick_interval(), Duration::from_millis(100));

        let written: UserSettings =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.timer, TimerSettings::default());
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let path = temp_path();
        let store = SettingsStore::new(path.clone()).unwrap();
        let settings = TimerSettings {
            default_minutes: 50,
            tick_interval_ms: 250,
            haptics_enabled: false,
            reward_per_minute: 3,
        };
        store.update_timer(settings.clone()).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.timer(), settings);
    }

    #[test]
    fn test_invalid_update_is_rejected() {
        let store = SettingsStore::new(temp_path()).unwrap();
        let bad = TimerSettings {
            default_minutes: 0,
            ..TimerSettings::default()
        };
        assert!(store.update_timer(bad).is_err());

        let bad_tick = TimerSettings {
            tick_interval_ms: 5_000,
            ..TimerSettings::default()
        };
        assert!(store.update_timer(bad_tick).is_err());
        assert_eq!(store.timer(), TimerSettings::default());
    }

    #[test]
    fn test_partial_and_malformed_files() {
        let path = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        fs::write(&path, r#"{ "timer": { "default_minutes": 45 } }"#).unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.timer().default_minutes, 45);
        assert_eq!(store.timer().tick_interval_ms, 100);

        fs::write(&path, "not json").unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.timer(), TimerSettings::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }
}
