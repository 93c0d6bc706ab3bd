//! Account store: salted password verification and insurer provisioning.
//!
//! Accounts are looked up by email or username, case-insensitively. An
//! account without a password hash exists for lookups only and cannot sign in.

use rand::Rng;
use sha2::{Digest, Sha256};
use solvency::directory;
use solvency::login::digest_eq;
use solvency::model::{Role, User};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("unknown account")]
    UnknownAccount,
    #[error("invalid password")]
    InvalidPassword,
    #[error("account already exists")]
    AlreadyExists,
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[must_use]
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    to_hex(&bytes)
}

#[must_use]
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    salt: String,
    password_hash: Option<String>,
}

impl Account {
    fn new(user: User, password: Option<&str>) -> Self {
        let salt = generate_salt();
        let password_hash = password.map(|p| hash_password(&salt, p));
        Self { user, salt, password_hash }
    }

    fn matches_login(&self, login: &str) -> bool {
        self.user.username.eq_ignore_ascii_case(login)
            || self.user.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(login))
    }

    fn verify(&self, password: &str) -> bool {
        self.password_hash
            .as_deref()
            .is_some_and(|stored| digest_eq(stored, &hash_password(&self.salt, password)))
    }
}

#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: Vec<Account>,
}

impl AccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the predefined directory accounts, all sharing
    /// `seed_password` when given.
    #[must_use]
    pub fn seeded(seed_password: Option<&str>) -> Self {
        let accounts = directory::mock_users()
            .into_iter()
            .map(|user| Account::new(user, seed_password))
            .collect();
        Self { accounts }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    #[must_use]
    pub fn find(&self, login: &str) -> Option<&Account> {
        let login = login.trim();
        self.accounts.iter().find(|a| a.matches_login(login))
    }

    /// Add an account.
    pub fn insert(&mut self, user: User, password: &str) -> Result<&Account, AccountError> {
        let taken = self.find(&user.username).is_some()
            || user.email.as_deref().is_some_and(|e| self.find(e).is_some());
        if taken {
            return Err(AccountError::AlreadyExists);
        }
        self.accounts.push(Account::new(user, Some(password)));
        Ok(&self.accounts[self.accounts.len() - 1])
    }

    /// Verify a login (email or username) and password.
    pub fn verify(&self, login: &str, password: &str) -> Result<User, AccountError> {
        let account = self.find(login).ok_or(AccountError::UnknownAccount)?;
        if !account.verify(password) {
            return Err(AccountError::InvalidPassword);
        }
        Ok(account.user.clone())
    }

    /// Create an insurer account for an unknown email; username is the
    /// email's local part.
    pub fn provision_insurer(&mut self, email: &str, password: &str) -> Result<User, AccountError> {
        let email = email.trim();
        let username = email.split('@').next().unwrap_or(email);
        let mut user = User::new(Uuid::new_v4().to_string(), username, Role::Insurer);
        user.email = Some(email.to_owned());
        let account = self.insert(user, password)?;
        tracing::info!(username = %account.user.username, "provisioned insurer account");
        Ok(account.user.clone())
    }
}

#[cfg(test)]
#[path = "accounts_test.rs"]
mod tests;
