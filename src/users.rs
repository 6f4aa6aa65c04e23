// 👤 User store - accounts for the administration panel
// SQLite-backed; passwords are salted and stretched SHA-256, never stored in clear.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Normal,
    Admin,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Normal => "normal",
            AccessLevel::Admin => "admin",
        }
    }
}

impl FromStr for AccessLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(AccessLevel::Normal),
            "admin" => Ok(AccessLevel::Admin),
            other => bail!("Unknown access level: {} (expected normal or admin)", other),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub level: AccessLevel,
    pub full_name: String,
    pub email: String,
    pub last_access: Option<DateTime<Utc>>,
    pub active: bool,
}

/// Input for [`CredentialStore::create_user`]
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub level: AccessLevel,
    pub full_name: String,
    pub email: String,
}

pub trait CredentialStore {
    fn create_user(&self, new_user: &NewUser) -> Result<User>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn change_password(&self, username: &str, new_password: &str) -> Result<()>;
    fn delete_user(&self, username: &str) -> Result<()>;

    /// False for unknown users, inactive users and wrong passwords alike
    fn verify_password(&self, username: &str, password: &str) -> Result<bool>;
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// SHA-256 rounds applied to new password hashes
pub const DEFAULT_HASH_ROUNDS: u32 = 100_000;

const HASH_SCHEME: &str = "sha256";

pub struct SqliteUserStore {
    conn: Connection,
    rounds: u32,
}

impl SqliteUserStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open user database: {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_users_table(&conn)?;
        Ok(SqliteUserStore {
            conn,
            rounds: DEFAULT_HASH_ROUNDS,
        })
    }

    /// Rounds for hashes written from now on. Stored hashes keep their own count.
    pub fn with_hash_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds.max(1);
        self
    }

    /// Stamp a successful login
    pub fn record_access(&self, username: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE users SET last_access = ?1 WHERE username = ?2",
            params![Utc::now().to_rfc3339(), username],
        )?;
        if updated == 0 {
            bail!("User '{}' not found", username);
        }
        Ok(())
    }

    pub fn set_active(&self, username: &str, active: bool) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE users SET active = ?1 WHERE username = ?2",
            params![active, username],
        )?;
        if updated == 0 {
            bail!("User '{}' not found", username);
        }
        Ok(())
    }

    fn exists(&self, username: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn setup_users_table(conn: &Connection) -> Result<()> {
    // In-memory databases answer "memory" instead of "wal"
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            salt TEXT NOT NULL,
            level TEXT NOT NULL DEFAULT 'normal',
            full_name TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            last_access TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create users table")?;

    Ok(())
}

/// "sha256$<rounds>$<hex>"
fn hash_password(salt: &str, password: &str, rounds: u32) -> String {
    format!("{}${}${}", HASH_SCHEME, rounds, stretch(salt, password, rounds))
}

/// Salted digest fed back through SHA-256; one round is the plain salted hash
fn stretch(salt: &str, password: &str, rounds: u32) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt)
        .chain_update(password)
        .finalize();
    for _ in 1..rounds {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(password)
            .finalize();
    }
    format!("{:x}", digest)
}

fn password_matches(stored: &str, salt: &str, password: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    match parts.as_slice() {
        [HASH_SCHEME, rounds, hex] => rounds
            .parse::<u32>()
            .map_or(false, |rounds| rounds > 0 && stretch(salt, password, rounds) == *hex),
        // Bare hex from single-pass stores
        [hex] => stretch(salt, password, 1) == *hex,
        _ => false,
    }
}

fn new_salt() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl CredentialStore for SqliteUserStore {
    fn create_user(&self, new_user: &NewUser) -> Result<User> {
        let username = new_user.username.trim();
        if username.is_empty() || new_user.password.is_empty() {
            bail!("Username and password are required");
        }
        if self.exists(username)? {
            bail!("User '{}' already exists", username);
        }

        let salt = new_salt();
        self.conn
            .execute(
                "INSERT INTO users (username, password_hash, salt, level, full_name, email, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
                params![
                    username,
                    hash_password(&salt, &new_user.password, self.rounds),
                    salt,
                    new_user.level.as_str(),
                    new_user.full_name.trim(),
                    new_user.email.trim(),
                ],
            )
            .with_context(|| format!("Failed to create user '{}'", username))?;

        tracing::info!(username, level = %new_user.level, "user created");

        Ok(User {
            username: username.to_string(),
            level: new_user.level,
            full_name: new_user.full_name.trim().to_string(),
            email: new_user.email.trim().to_string(),
            last_access: None,
            active: true,
        })
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT username, level, full_name, email, last_access, active
             FROM users
             ORDER BY username",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, bool>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(username, level, full_name, email, last_access, active)| {
                let level = level
                    .parse::<AccessLevel>()
                    .with_context(|| format!("Corrupt level for user '{}'", username))?;
                let last_access = last_access
                    .map(|ts| DateTime::parse_from_rfc3339(&ts).map(|dt| dt.with_timezone(&Utc)))
                    .transpose()
                    .with_context(|| format!("Corrupt last access for user '{}'", username))?;

                Ok(User {
                    username,
                    level,
                    full_name,
                    email,
                    last_access,
                    active,
                })
            })
            .collect()
    }

    fn change_password(&self, username: &str, new_password: &str) -> Result<()> {
        if new_password.is_empty() {
            bail!("Password is required");
        }

        let salt = new_salt();
        let updated = self.conn.execute(
            "UPDATE users SET password_hash = ?1, salt = ?2 WHERE username = ?3",
            params![hash_password(&salt, new_password, self.rounds), salt, username],
        )?;
        if updated == 0 {
            bail!("User '{}' not found", username);
        }

        tracing::info!(username, "password changed");
        Ok(())
    }

    fn delete_user(&self, username: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE username = ?1", [username])?;
        if deleted == 0 {
            bail!("User '{}' not found", username);
        }

        tracing::info!(username, "user deleted");
        Ok(())
    }

    fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        let stored: Option<(String, String, bool)> = self
            .conn
            .query_row(
                "SELECT password_hash, salt, active FROM users WHERE username = ?1",
                [username],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        Ok(match stored {
            Some((hash, salt, active)) => active && password_matches(&hash, &salt, password),
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteUserStore {
        SqliteUserStore::open_in_memory().unwrap().with_hash_rounds(16)
    }

    fn new_user(username: &str, password: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: password.to_string(),
            level: AccessLevel::Normal,
            full_name: "Ana Pérez".to_string(),
            email: "ana@tribunal.gob.ar".to_string(),
        }
    }

    #[test]
    fn test_create_and_list() {
        let store = store();

        let mut admin = new_user("mesa", "s3creta");
        admin.level = AccessLevel::Admin;
        store.create_user(&admin).unwrap();
        store.create_user(&new_user("ana", "clave")).unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "ana");
        assert_eq!(users[0].level, AccessLevel::Normal);
        assert_eq!(users[1].level, AccessLevel::Admin);
        assert!(users.iter().all(|u| u.active && u.last_access.is_none()));
    }

    #[test]
    fn test_required_fields_and_duplicates() {
        let store = store();

        assert!(store.create_user(&new_user("", "clave")).is_err());
        assert!(store.create_user(&new_user("ana", "")).is_err());

        store.create_user(&new_user("ana", "clave")).unwrap();
        let err = store.create_user(&new_user("ana", "otra")).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_passwords_are_salted() {
        let store = store();
        store.create_user(&new_user("ana", "clave")).unwrap();
        store.create_user(&new_user("beto", "clave")).unwrap();

        let hashes: Vec<String> = store
            .conn
            .prepare("SELECT password_hash FROM users")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_ne!(hashes[0], hashes[1]);
        assert!(hashes
            .iter()
            .all(|h| h.starts_with("sha256$16$") && h.len() == "sha256$16$".len() + 64));
    }

    #[test]
    fn test_hashes_are_stretched() {
        assert_eq!(SqliteUserStore::open_in_memory().unwrap().rounds, DEFAULT_HASH_ROUNDS);
        assert_eq!(store().with_hash_rounds(0).rounds, 1);

        assert_ne!(stretch("sal", "clave", 1), stretch("sal", "clave", 2));
        assert_eq!(
            hash_password("sal", "clave", 3),
            format!("sha256$3${}", stretch("sal", "clave", 3))
        );
        assert!(password_matches(&hash_password("sal", "clave", 3), "sal", "clave"));
        assert!(!password_matches(&hash_password("sal", "clave", 3), "otra", "clave"));
        assert!(!password_matches("sha256$0$abc", "sal", "clave"));
        assert!(!password_matches("md5$3$abc", "sal", "clave"));
    }

    #[test]
    fn test_single_pass_hashes_still_verify() {
        let store = store();
        let legacy = format!("{:x}", Sha256::digest(b"salvieja"));
        assert_eq!(legacy, stretch("sal", "vieja", 1));

        store
            .conn
            .execute(
                "INSERT INTO users (username, password_hash, salt) VALUES ('beto', ?1, 'sal')",
                [&legacy],
            )
            .unwrap();
        assert!(store.verify_password("beto", "vieja").unwrap());
        assert!(!store.verify_password("beto", "otra").unwrap());

        // A password change upgrades the row to the stretched form
        store.change_password("beto", "nueva").unwrap();
        let hash: String = store
            .conn
            .query_row("SELECT password_hash FROM users WHERE username = 'beto'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(hash.starts_with("sha256$16$"));
        assert!(store.verify_password("beto", "nueva").unwrap());
    }

    #[test]
    fn test_verify_and_change_password() {
        let store = store();
        store.create_user(&new_user("ana", "clave")).unwrap();

        assert!(store.verify_password("ana", "clave").unwrap());
        assert!(!store.verify_password("ana", "CLAVE").unwrap());
        assert!(!store.verify_password("nadie", "clave").unwrap());

        store.change_password("ana", "nueva").unwrap();
        assert!(store.verify_password("ana", "nueva").unwrap());
        assert!(!store.verify_password("ana", "clave").unwrap());

        assert!(store.change_password("nadie", "x").is_err());
        assert!(store.change_password("ana", "").is_err());
    }

    #[test]
    fn test_inactive_users_cannot_verify() {
        let store = store();
        store.create_user(&new_user("ana", "clave")).unwrap();

        store.set_active("ana", false).unwrap();
        assert!(!store.verify_password("ana", "clave").unwrap());
        assert!(!store.list_users().unwrap()[0].active);
    }

    #[test]
    fn test_delete_user() {
        let store = store();
        store.create_user(&new_user("ana", "clave")).unwrap();

        store.delete_user("ana").unwrap();
        assert!(store.list_users().unwrap().is_empty());
        assert!(store.delete_user("ana").is_err());
    }

    #[test]
    fn test_record_access() {
        let store = store();
        store.create_user(&new_user("ana", "clave")).unwrap();

        store.record_access("ana").unwrap();
        assert!(store.list_users().unwrap()[0].last_access.is_some());
        assert!(store.record_access("nadie").is_err());
    }

    #[test]
    fn test_open_on_disk_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("usuarios.db");

        {
            let store = SqliteUserStore::open(&path).unwrap().with_hash_rounds(16);
            store.create_user(&new_user("ana", "clave")).unwrap();
        }

        let store = SqliteUserStore::open(&path).unwrap().with_hash_rounds(16);
        assert!(store.verify_password("ana", "clave").unwrap());
    }

    #[test]
    fn test_access_level_parsing() {
        assert_eq!("Admin".parse::<AccessLevel>().unwrap(), AccessLevel::Admin);
        assert_eq!("normal".parse::<AccessLevel>().unwrap(), AccessLevel::Normal);
        assert!("root".parse::<AccessLevel>().is_err());
    }
}
