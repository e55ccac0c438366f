//! Domain library for the survey backend.
//!
//! This crate holds the domain types, ports (traits), and error definitions.
//! Keep adapters and IO concerns out of this crate.
//!
//! The stores follow a load, mutate, save cycle: every operation reads the
//! full snapshot from durable storage and every mutation rewrites it in
//! full. Two concurrent writers both load the old snapshot and the later
//! save wins; the earlier write is silently lost. The stores add no locking
//! of their own: this lost-update anomaly is part of the contract.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use policy::PasswordWeakness;

/// A registered account name: the unique, case-sensitive key of the user
/// store. Surrounding whitespace is trimmed on construction.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username(String);

impl Username {
    pub fn new<S: Into<String>>(s: S) -> Result<Self, CoreError> {
        let val = s.into().trim().to_string();
        if val.is_empty() {
            return Err(CoreError::MissingCredentials);
        }
        Ok(Self(val))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 hex digest of a password. 64 lowercase hex characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Digest a (normalized) password.
    pub fn digest(password: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(password.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One question/answer pair of a questionnaire submission. Order matters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

/// A questionnaire submission tied to a username. At most one per username
/// exists in the response store. The username is a raw string here: it is
/// not required to exist in the user store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub username: String,
    pub display_name: String,
    pub answers: Vec<Answer>,
}

impl Submission {
    /// Build a submission, deriving the display name from the first
    /// answer's `answer` field ("Unknown" when absent or blank).
    pub fn new(username: String, answers: Vec<Answer>) -> Self {
        let display_name = answers
            .first()
            .map(|a| a.answer.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown")
            .to_string();
        Self {
            username,
            display_name,
            answers,
        }
    }
}

/// Port for the user store: a durable mapping from username to password
/// hash, read and rewritten whole.
pub trait UserStore: Send + Sync {
    /// Full snapshot; an absent store reads as empty.
    fn load(&self) -> Result<BTreeMap<String, PasswordHash>, CoreError>;
    /// Overwrite durable storage with the full mapping.
    fn save(&self, users: &BTreeMap<String, PasswordHash>) -> Result<(), CoreError>;
}

/// Port for the response store: a durable sequence of submissions plus a
/// derived plain-text report, both rewritten whole.
pub trait ResponseStore: Send + Sync {
    /// Full snapshot in insertion order; an absent store reads as empty.
    fn load(&self) -> Result<Vec<Submission>, CoreError>;
    /// Overwrite durable storage with the full sequence.
    fn save(&self, submissions: &[Submission]) -> Result<(), CoreError>;
    /// Overwrite the derived human-readable report.
    fn save_report(&self, report: &str) -> Result<(), CoreError>;
}

impl<S: UserStore + ?Sized> UserStore for std::sync::Arc<S> {
    fn load(&self) -> Result<BTreeMap<String, PasswordHash>, CoreError> {
        (**self).load()
    }

    fn save(&self, users: &BTreeMap<String, PasswordHash>) -> Result<(), CoreError> {
        (**self).save(users)
    }
}

impl<S: ResponseStore + ?Sized> ResponseStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Vec<Submission>, CoreError> {
        (**self).load()
    }

    fn save(&self, submissions: &[Submission]) -> Result<(), CoreError> {
        (**self).save(submissions)
    }

    fn save_report(&self, report: &str) -> Result<(), CoreError> {
        (**self).save_report(report)
    }
}

/// Core domain errors (no external error crates to keep deps light).
///
/// The `Display` strings double as the user-facing messages surfaced in
/// JSON error bodies.
#[derive(Debug)]
pub enum CoreError {
    MissingCredentials,
    DuplicateUser,
    WeakPassword(PasswordWeakness),
    UnknownUser,
    WrongPassword,
    IncompleteData,
    AlreadySubmitted,
    Store(String),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::MissingCredentials => write!(f, "username and password are required"),
            CoreError::DuplicateUser => write!(f, "this username is already registered"),
            CoreError::WeakPassword(w) => write!(f, "{}", w),
            CoreError::UnknownUser => write!(f, "username not found"),
            CoreError::WrongPassword => write!(f, "wrong password"),
            CoreError::IncompleteData => write!(f, "username and answers are required"),
            CoreError::AlreadySubmitted => {
                write!(f, "a response for this username already exists")
            }
            CoreError::Store(msg) => write!(f, "store error: {}", msg),
        }
    }
}

impl Error for CoreError {}

pub mod adapters;
pub mod policy;
pub mod report;
pub mod service;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_trims_surrounding_whitespace() {
        let u = Username::new("  mario  ").expect("valid username");
        assert_eq!(u.as_str(), "mario");
    }

    #[test]
    fn username_rejects_blank() {
        let err = Username::new("   ").unwrap_err();
        assert!(matches!(err, CoreError::MissingCredentials));
    }

    #[test]
    fn password_hash_is_sha256_hex() {
        let h = PasswordHash::digest("password");
        assert_eq!(
            h.as_str(),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
        assert_eq!(h.as_str().len(), 64);
    }

    #[test]
    fn display_name_comes_from_first_answer() {
        let sub = Submission::new(
            "mario".into(),
            vec![
                Answer {
                    question: "What is your name?".into(),
                    answer: "Mario Rossi".into(),
                },
                Answer {
                    question: "Favourite colour?".into(),
                    answer: "blu".into(),
                },
            ],
        );
        assert_eq!(sub.display_name, "Mario Rossi");
    }

    #[test]
    fn display_name_defaults_to_unknown() {
        let sub = Submission::new(
            "mario".into(),
            vec![Answer {
                question: "What is your name?".into(),
                answer: "   ".into(),
            }],
        );
        assert_eq!(sub.display_name, "Unknown");
    }
}
