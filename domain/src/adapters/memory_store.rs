use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{CoreError, PasswordHash, ResponseStore, Submission, UserStore};

/// In-memory implementation of both store ports, for tests and the
/// `memory` storage provider. The mutexes only guard the maps; the
/// load-mutate-save cycle above them races exactly like the file store.
pub struct MemoryStore {
    users: Mutex<BTreeMap<String, PasswordHash>>,
    submissions: Mutex<Vec<Submission>>,
    report: Mutex<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(BTreeMap::new()),
            submissions: Mutex::new(Vec::new()),
            report: Mutex::new(String::new()),
        }
    }

    /// Last saved report text (test hook).
    pub fn report(&self) -> Result<String, CoreError> {
        let report = self
            .report
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        Ok(report.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for MemoryStore {
    fn load(&self) -> Result<BTreeMap<String, PasswordHash>, CoreError> {
        let users = self
            .users
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        Ok(users.clone())
    }

    fn save(&self, snapshot: &BTreeMap<String, PasswordHash>) -> Result<(), CoreError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        *users = snapshot.clone();
        Ok(())
    }
}

impl ResponseStore for MemoryStore {
    fn load(&self) -> Result<Vec<Submission>, CoreError> {
        let submissions = self
            .submissions
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        Ok(submissions.clone())
    }

    fn save(&self, snapshot: &[Submission]) -> Result<(), CoreError> {
        let mut submissions = self
            .submissions
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        *submissions = snapshot.to_vec();
        Ok(())
    }

    fn save_report(&self, text: &str) -> Result<(), CoreError> {
        let mut report = self
            .report
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        *report = text.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Answer;

    #[test]
    fn user_snapshot_round_trip() {
        let store = MemoryStore::new();
        let mut users = BTreeMap::new();
        users.insert("mario".to_string(), PasswordHash::digest("Abcdefg1!"));

        UserStore::save(&store, &users).unwrap();
        let loaded = UserStore::load(&store).unwrap();
        assert_eq!(loaded, users);
    }

    #[test]
    fn response_snapshot_round_trip() {
        let store = MemoryStore::new();
        let subs = vec![Submission::new(
            "mario".into(),
            vec![Answer {
                question: "Come ti chiami?".into(),
                answer: "Mario".into(),
            }],
        )];

        ResponseStore::save(&store, &subs).unwrap();
        let loaded = ResponseStore::load(&store).unwrap();
        assert_eq!(loaded, subs);
    }

    #[test]
    fn fresh_store_loads_empty() {
        let store = MemoryStore::new();
        assert!(UserStore::load(&store).unwrap().is_empty());
        assert!(ResponseStore::load(&store).unwrap().is_empty());
    }
}
