use crate::{policy, report, Answer, CoreError, PasswordHash, ResponseStore, Submission, UserStore};

/// Normalize a raw password: trim surrounding whitespace and drop interior
/// spaces. Registration and login apply the same normalization so a
/// password typed with stray spaces matches its stored digest.
fn normalize_password(raw: &str) -> String {
    raw.trim().replace(' ', "")
}

/// Application service for account registration and login.
///
/// Generic over the user store port so it runs against the in-memory
/// adapter in tests and the file-backed adapter in the server. Every
/// operation is a single load-mutate-save cycle with no cross-call memory.
pub struct AccountService<S: UserStore> {
    store: S,
}

impl<S: UserStore> AccountService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Register a new account: validate inputs, enforce the password
    /// policy, store the digest, and rewrite the whole user file.
    pub fn register(&self, username: &str, password: &str) -> Result<crate::Username, CoreError> {
        let username = crate::Username::new(username)?;
        let password = normalize_password(password);
        if password.is_empty() {
            return Err(CoreError::MissingCredentials);
        }

        let mut users = self.store.load()?;
        if users.contains_key(username.as_str()) {
            return Err(CoreError::DuplicateUser);
        }
        policy::validate(&password).map_err(CoreError::WeakPassword)?;

        users.insert(username.as_str().to_string(), PasswordHash::digest(&password));
        self.store.save(&users)?;
        Ok(username)
    }

    /// Check credentials against the stored digest.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<crate::Username, CoreError> {
        let username = crate::Username::new(username)?;
        let password = normalize_password(password);
        if password.is_empty() {
            return Err(CoreError::MissingCredentials);
        }

        let users = self.store.load()?;
        match users.get(username.as_str()) {
            None => Err(CoreError::UnknownUser),
            Some(stored) if *stored == PasswordHash::digest(&password) => Ok(username),
            Some(_) => Err(CoreError::WrongPassword),
        }
    }
}

/// Application service for questionnaire submissions.
///
/// Enforces the one-submission-per-username invariant by scanning the
/// loaded snapshot; the check and the save are not atomic (see the crate
/// docs on the lost-update race).
pub struct SurveyService<S: ResponseStore> {
    store: S,
}

impl<S: ResponseStore> SurveyService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append a submission and rewrite both the JSON snapshot and the
    /// derived text report. The username is not checked against the user
    /// store.
    pub fn submit(&self, username: &str, answers: Vec<Answer>) -> Result<Submission, CoreError> {
        let username = username.trim();
        if username.is_empty() || answers.is_empty() {
            return Err(CoreError::IncompleteData);
        }

        let mut submissions = self.store.load()?;
        if submissions.iter().any(|s| s.username == username) {
            return Err(CoreError::AlreadySubmitted);
        }

        let submission = Submission::new(username.to_string(), answers);
        submissions.push(submission.clone());
        self.store.save(&submissions)?;
        self.store.save_report(&report::render(&submissions))?;
        Ok(submission)
    }

    /// Whether a submission with this username exists.
    pub fn has_submitted(&self, username: &str) -> Result<bool, CoreError> {
        let username = username.trim();
        let submissions = self.store.load()?;
        Ok(submissions.iter().any(|s| s.username == username))
    }

    /// Full snapshot in insertion order (supervisor view).
    pub fn list_all(&self) -> Result<Vec<Submission>, CoreError> {
        self.store.load()
    }
}
