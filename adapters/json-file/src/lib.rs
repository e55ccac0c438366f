//! json-file-adapter — flat-file JSON implementation of the store ports.
//!
//! Purpose
//! - Persist the user store as a pretty-printed JSON object mapping
//!   username to password hash.
//! - Persist the response store as a pretty-printed JSON array of
//!   submissions, plus the derived plain-text report.
//! - Implements the `UserStore` and `ResponseStore` traits from the
//!   `domain` crate.
//!
//! Notes
//! - Every `load` reads the whole file and every `save` rewrites it; an
//!   absent file reads as an empty store.
//! - Writes go straight to the target path (no temp-file-and-rename): a
//!   crash mid-write can truncate a store, and two concurrent writers race
//!   last-writer-wins. Both are part of the store contract.
//! - All files are UTF-8; non-ASCII text in answers survives round-trips
//!   unescaped beyond JSON string rules.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use domain::{CoreError, PasswordHash, ResponseStore, Submission, UserStore};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// File names within the data directory.
const USERS_FILE: &str = "users.json";
const RESPONSES_FILE: &str = "responses.json";
const REPORT_FILE: &str = "responses_report.txt";

/// Flat-file store rooted at a data directory.
pub struct JsonFileStore {
    users_path: PathBuf,
    responses_path: PathBuf,
    report_path: PathBuf,
}

impl JsonFileStore {
    /// Root the store at the given directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self, CoreError> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir).map_err(map_ioerr)?;
        Ok(Self {
            users_path: dir.join(USERS_FILE),
            responses_path: dir.join(RESPONSES_FILE),
            report_path: dir.join(REPORT_FILE),
        })
    }

    /// Construct from env var `DATA_DIR` (defaults to `./data`).
    pub fn from_env() -> Result<Self, CoreError> {
        let dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());
        Self::new(dir)
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    pub fn responses_path(&self) -> &Path {
        &self.responses_path
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }
}

fn map_ioerr(e: std::io::Error) -> CoreError {
    CoreError::Store(format!("io error: {e}"))
}

fn map_serr(e: serde_json::Error) -> CoreError {
    CoreError::Store(format!("json error: {e}"))
}

/// Read a whole snapshot file; an absent file reads as the default value.
fn read_snapshot<T: DeserializeOwned + Default>(path: &Path) -> Result<T, CoreError> {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).map_err(map_serr),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(map_ioerr(e)),
    }
}

/// Rewrite a whole snapshot file, pretty-printed.
fn write_snapshot<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    let text = serde_json::to_string_pretty(value).map_err(map_serr)?;
    fs::write(path, text).map_err(map_ioerr)
}

impl UserStore for JsonFileStore {
    fn load(&self) -> Result<BTreeMap<String, PasswordHash>, CoreError> {
        read_snapshot(&self.users_path)
    }

    fn save(&self, users: &BTreeMap<String, PasswordHash>) -> Result<(), CoreError> {
        write_snapshot(&self.users_path, users)
    }
}

impl ResponseStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Submission>, CoreError> {
        read_snapshot(&self.responses_path)
    }

    fn save(&self, submissions: &[Submission]) -> Result<(), CoreError> {
        write_snapshot(&self.responses_path, &submissions)
    }

    fn save_report(&self, report: &str) -> Result<(), CoreError> {
        fs::write(&self.report_path, report).map_err(map_ioerr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Answer;
    use tempfile::tempdir;

    #[test]
    fn absent_files_load_as_empty_stores() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        assert!(UserStore::load(&store).unwrap().is_empty());
        assert!(ResponseStore::load(&store).unwrap().is_empty());
    }

    #[test]
    fn user_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let mut users = BTreeMap::new();
        users.insert("mario".to_string(), PasswordHash::digest("Abcdefg1!"));
        users.insert("anna".to_string(), PasswordHash::digest("Xyzabcd2?"));

        UserStore::save(&store, &users).unwrap();
        let loaded = UserStore::load(&store).unwrap();
        assert_eq!(loaded, users);
    }

    #[test]
    fn users_persist_as_a_json_object_of_hex_digests() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let mut users = BTreeMap::new();
        users.insert("mario".to_string(), PasswordHash::digest("password"));
        UserStore::save(&store, &users).unwrap();

        let raw = fs::read_to_string(store.users_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value["mario"],
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn response_store_round_trip_preserves_non_ascii() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let subs = vec![Submission::new(
            "lucia".into(),
            vec![
                Answer {
                    question: "Come ti chiami?".into(),
                    answer: "Lucìa".into(),
                },
                Answer {
                    question: "Città preferita?".into(),
                    answer: "Forlì è perfetta ✓".into(),
                },
            ],
        )];

        ResponseStore::save(&store, &subs).unwrap();
        let loaded = ResponseStore::load(&store).unwrap();
        assert_eq!(loaded, subs);
        assert_eq!(loaded[0].display_name, "Lucìa");
    }

    #[test]
    fn save_rewrites_the_whole_snapshot() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let first = vec![Submission::new(
            "mario".into(),
            vec![Answer {
                question: "Q".into(),
                answer: "Mario".into(),
            }],
        )];
        ResponseStore::save(&store, &first).unwrap();

        // A later save with a different snapshot fully replaces the file.
        let second = vec![Submission::new(
            "anna".into(),
            vec![Answer {
                question: "Q".into(),
                answer: "Anna".into(),
            }],
        )];
        ResponseStore::save(&store, &second).unwrap();

        let loaded = ResponseStore::load(&store).unwrap();
        assert_eq!(loaded, second);
    }

    #[test]
    fn report_is_written_verbatim() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        store.save_report("REPORT\nbody è\n").unwrap();
        let text = fs::read_to_string(store.report_path()).unwrap();
        assert_eq!(text, "REPORT\nbody è\n");
    }
}
