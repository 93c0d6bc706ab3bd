use super::*;

// =============================================================================
// hashing
// =============================================================================

#[test]
fn salts_are_random_hex() {
    let a = generate_salt();
    let b = generate_salt();
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
}

#[test]
fn hash_depends_on_salt_and_password() {
    let base = hash_password("salt", "pw");
    assert_eq!(base, hash_password("salt", "pw"));
    assert_ne!(base, hash_password("salt2", "pw"));
    assert_ne!(base, hash_password("salt", "pw2"));
    assert_eq!(base.len(), 64);
}

// =============================================================================
// AccountStore
// =============================================================================

#[test]
fn seeded_store_holds_directory_accounts() {
    let store = AccountStore::seeded(Some("password123"));
    assert_eq!(store.len(), 3);
    assert!(store.find("cfo@maisha.co.ke").is_some());
    assert!(store.find("REGULATOR_MAIN").is_some());
}

#[test]
fn seeded_accounts_verify_with_seed_password() {
    let store = AccountStore::seeded(Some("password123"));
    let user = store.verify("cfo@maisha.co.ke", "password123").unwrap();
    assert_eq!(user.role, Role::Insurer);
    assert_eq!(store.verify("maisha_insurance", "nope"), Err(AccountError::InvalidPassword));
}

#[test]
fn seeded_accounts_without_password_cannot_sign_in() {
    let store = AccountStore::seeded(None);
    assert_eq!(store.verify("cfo@maisha.co.ke", ""), Err(AccountError::InvalidPassword));
    assert_eq!(store.verify("cfo@maisha.co.ke", "anything"), Err(AccountError::InvalidPassword));
}

#[test]
fn unknown_login_is_reported() {
    let store = AccountStore::new();
    assert!(store.is_empty());
    assert_eq!(store.verify("x@y.com", "pw"), Err(AccountError::UnknownAccount));
}

#[test]
fn insert_rejects_duplicate_username_or_email() {
    let mut store = AccountStore::seeded(None);
    let dup_name = User::new("9", "Maisha_Insurance", Role::Insurer);
    assert_eq!(store.insert(dup_name, "pw").map(|_| ()), Err(AccountError::AlreadyExists));

    let mut dup_email = User::new("10", "someone_else", Role::Insurer);
    dup_email.email = Some("CFO@maisha.co.ke".into());
    assert_eq!(store.insert(dup_email, "pw").map(|_| ()), Err(AccountError::AlreadyExists));
}

#[test]
fn provision_insurer_creates_verifiable_account() {
    let mut store = AccountStore::new();
    let user = store.provision_insurer("cfo@acme.co.ke", "pw").unwrap();
    assert_eq!(user.username, "cfo");
    assert_eq!(user.role, Role::Insurer);
    assert_eq!(user.email.as_deref(), Some("cfo@acme.co.ke"));

    let verified = store.verify("cfo@acme.co.ke", "pw").unwrap();
    assert_eq!(verified.id, user.id);
}

#[test]
fn password_check_compares_whole_digest() {
    let mut store = AccountStore::new();
    let mut user = User::new("9", "acme", Role::Insurer);
    user.email = Some("cfo@acme.co.ke".into());
    store.insert(user, "correct horse").unwrap();

    assert!(store.verify("acme", "correct horse").is_ok());
    assert_eq!(store.verify("acme", "correct hors"), Err(AccountError::InvalidPassword));
    assert_eq!(store.verify("acme", "correct horsf"), Err(AccountError::InvalidPassword));
    assert_eq!(store.verify("acme", "correct horse "), Err(AccountError::InvalidPassword));
}
