//! File-backed profile store with file locking.
//!
//! All profiles live in one JSON document keyed by email. Writers hold an
//! exclusive lock on `<file>.lock` for the whole load-modify-save, and each
//! save goes to a temp file that is synced and renamed over the old file.
//! A profile file that no longer parses is moved aside as
//! `<file>.<timestamp>.corrupt` before a writer starts a fresh one.

use crate::sync::{ProfileSync, ProfileUpdate};
use crate::{Error, Result};
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Dashboard profile fields touched by the workout core
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub email: String,
    #[serde(default)]
    pub daily_calories: f64,
    #[serde(default)]
    pub calories_burned: f64,
    #[serde(default)]
    pub recent_workout: String,
    #[serde(default)]
    pub progress: f64,
    /// Body weight in kg, used as the default for calorie estimates
    #[serde(default)]
    pub weight: Option<f64>,
}

impl Profile {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Overwrite every field present in `update`
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(v) = update.daily_calories {
            self.daily_calories = v;
        }
        if let Some(v) = update.calories_burned {
            self.calories_burned = v;
        }
        if let Some(v) = &update.recent_workout {
            self.recent_workout = v.clone();
        }
        if let Some(v) = update.progress {
            self.progress = v;
        }
    }

    /// Stored weight, if it is usable for calorie estimates
    pub fn weight_kg(&self) -> Option<f64> {
        self.weight.filter(|w| w.is_finite() && *w > 0.0)
    }
}

/// Every stored profile
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileBook {
    pub profiles: BTreeMap<String, Profile>,
}

impl ProfileBook {
    /// Read profiles from a file with shared locking
    ///
    /// A missing file is an empty book. I/O failures are returned as
    /// `Error::Io` and malformed contents as `Error::Parse`.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No profile file found, starting empty");
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let book: ProfileBook = serde_json::from_str(&contents)
            .map_err(|e| Error::Parse(format!("profile file {:?}: {}", path, e)))?;
        tracing::debug!("Loaded {} profiles from {:?}", book.profiles.len(), path);
        Ok(book)
    }

    /// Read profiles for display
    ///
    /// Any failure logs a warning and yields an empty book. Never use the
    /// result as the base of a write.
    pub fn load(path: &Path) -> Self {
        Self::read(path).unwrap_or_else(|e| {
            tracing::warn!("Unable to read profile file {:?}: {}. Showing no profiles.", path, e);
            Self::default()
        })
    }

    /// Save profiles atomically
    ///
    /// Concurrent writers must be serialized by the caller; [`ProfileStore`]
    /// does this with its lock file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = parent_dir(path);
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} profiles to {:?}", self.profiles.len(), path);
        Ok(())
    }

    /// Insert or update the profile for `email`
    pub fn upsert(&mut self, email: &str, update: &ProfileUpdate) -> &Profile {
        let profile = self
            .profiles
            .entry(email.to_string())
            .or_insert_with(|| Profile::new(email));
        profile.apply(update);
        profile
    }

    pub fn get(&self, email: &str) -> Option<&Profile> {
        self.profiles.get(email)
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Path next to `path` with `suffix` appended to the file name
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "profiles".into());
    path.with_file_name(format!("{}.{}", name, suffix))
}

/// [`ProfileSync`] backed by a [`ProfileBook`] file
#[derive(Clone, Debug)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Profile for `email`; an unreadable file reads as no profile
    pub fn load(&self, email: &str) -> Result<Option<Profile>> {
        Ok(ProfileBook::load(&self.path).profiles.remove(email))
    }

    fn lock_path(&self) -> PathBuf {
        sibling(&self.path, "lock")
    }

    /// Take the writer lock, blocking until other writers are done
    fn lock_writers(&self) -> Result<File> {
        std::fs::create_dir_all(parent_dir(&self.path))?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    /// Move an unparseable profile file out of the way
    fn set_aside(&self) -> Result<PathBuf> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.f");
        let target = sibling(&self.path, &format!("{}.corrupt", stamp));
        std::fs::rename(&self.path, &target)?;
        Ok(target)
    }
}

impl ProfileSync for ProfileStore {
    fn update_profile(&mut self, email: &str, update: &ProfileUpdate) -> Result<()> {
        if email.trim().is_empty() {
            return Err(Error::InvalidInput("profile email is required".into()));
        }

        let lock = self.lock_writers()?;

        let mut book = match ProfileBook::read(&self.path) {
            Ok(book) => book,
            Err(Error::Parse(msg)) => {
                let moved = self.set_aside()?;
                tracing::warn!("{}. Moved it to {:?} and started a new file.", msg, moved);
                ProfileBook::default()
            }
            Err(e) => return Err(e),
        };
        book.upsert(email, update);
        book.save(&self.path)?;

        lock.unlock()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_creates_then_merges() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = ProfileStore::new(temp_dir.path().join("profiles.json"));

        store
            .update_profile(
                "sam@example.com",
                &ProfileUpdate {
                    daily_calories: Some(2200.0),
                    progress: Some(40.0),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();
        store
            .update_profile(
                "sam@example.com",
                &ProfileUpdate {
                    calories_burned: Some(310.0),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();

        let profile = store.load("sam@example.com").unwrap().unwrap();
        assert_eq!(profile.daily_calories, 2200.0);
        assert_eq!(profile.progress, 40.0);
        assert_eq!(profile.calories_burned, 310.0);
    }

    #[test]
    fn test_last_write_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = ProfileStore::new(temp_dir.path().join("profiles.json"));

        for burned in [100.0, 50.0] {
            store
                .update_profile(
                    "kim@example.com",
                    &ProfileUpdate {
                        calories_burned: Some(burned),
                        ..ProfileUpdate::default()
                    },
                )
                .unwrap();
        }
        let profile = store.load("kim@example.com").unwrap().unwrap();
        assert_eq!(profile.calories_burned, 50.0);
    }

    #[test]
    fn test_profiles_are_isolated_by_email() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = ProfileStore::new(temp_dir.path().join("profiles.json"));
        let update = ProfileUpdate {
            progress: Some(10.0),
            ..ProfileUpdate::default()
        };
        store.update_profile("a@example.com", &update).unwrap();

        assert!(store.load("b@example.com").unwrap().is_none());
        assert!(store.update_profile("  ", &update).is_err());
    }

    fn corrupt_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|x| x == "corrupt"))
            .collect()
    }

    #[test]
    fn test_corrupted_file_reads_empty_for_display() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profiles.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        assert!(matches!(ProfileBook::read(&path), Err(Error::Parse(_))));
        assert!(ProfileBook::load(&path).profiles.is_empty());
        assert!(ProfileStore::new(&path).load("a@example.com").unwrap().is_none());
    }

    #[test]
    fn test_update_sets_corrupted_file_aside() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profiles.json");
        let original = r#"{"profiles":{
            "a@x.com":{"email":"a@x.com","progress":25.0},
            "b@x.com":{"email":"b@x.com","progress":"half"}
        }}"#;
        std::fs::write(&path, original).unwrap();

        let mut store = ProfileStore::new(&path);
        store
            .update_profile(
                "c@x.com",
                &ProfileUpdate {
                    progress: Some(5.0),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();

        // The unreadable book is kept intact for recovery
        let aside = corrupt_files(temp_dir.path());
        assert_eq!(aside.len(), 1);
        assert_eq!(std::fs::read_to_string(&aside[0]).unwrap(), original);

        let book = ProfileBook::read(&path).unwrap();
        assert_eq!(book.profiles.keys().collect::<Vec<_>>(), vec!["c@x.com"]);
    }

    #[test]
    fn test_update_fails_on_unreadable_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profiles.json");
        std::fs::create_dir(&path).unwrap();

        let mut store = ProfileStore::new(&path);
        let result = store.update_profile("a@x.com", &ProfileUpdate::default());

        assert!(matches!(result, Err(Error::Io(_))));
        assert!(path.is_dir());
        assert!(corrupt_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_concurrent_updates_keep_every_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profiles.json");

        std::thread::scope(|scope| {
            for i in 0..4 {
                let path = path.clone();
                scope.spawn(move || {
                    let mut store = ProfileStore::new(path);
                    let email = format!("user{}@example.com", i);
                    for round in 1..=20 {
                        let update = ProfileUpdate {
                            progress: Some(round as f64),
                            ..ProfileUpdate::default()
                        };
                        store.update_profile(&email, &update).unwrap();
                    }
                });
            }
        });

        let book = ProfileBook::read(&path).unwrap();
        assert_eq!(book.profiles.len(), 4);
        assert!(book.profiles.values().all(|p| p.progress == 20.0));
    }

    #[test]
    fn test_weight_kg_ignores_unusable_values() {
        let mut profile = Profile::new("a@x.com");
        assert_eq!(profile.weight_kg(), None);
        profile.weight = Some(0.0);
        assert_eq!(profile.weight_kg(), None);
        profile.weight = Some(82.5);
        assert_eq!(profile.weight_kg(), Some(82.5));
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profiles.json");

        ProfileBook::default().save(&path).unwrap();

        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "profiles.json")
            .collect();
        assert!(extras.is_empty(), "Expected only profiles.json, found extras: {:?}", extras);
    }
}
