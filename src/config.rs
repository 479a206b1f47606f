use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use zeroize::Zeroizing;

use crate::error::FixError;

pub const DEFAULT_DB_PATH: &str = "SharingMezzi.Api/sharingmezzi.db";
pub const DEFAULT_LOG_PATH: &str = "fix_passwords.log";

// Accounts reset when no table file is configured.
const DEFAULT_TABLE: [(&str, &str); 3] = [
    ("admin@test.com", "admin123"),
    ("mario@test.com", "password123"),
    ("lucia@test.com", "password123"),
];

/// A lookup key and the plaintext secret its record should end up with.
/// The secret is wiped from memory when the pair is dropped.
#[derive(Clone)]
pub struct CredentialPair {
    pub key: String,
    pub secret: Zeroizing<Vec<u8>>,
}

impl CredentialPair {
    pub fn new(key: impl Into<String>, secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.into(),
            secret: Zeroizing::new(secret.as_ref().to_vec()),
        }
    }
}

// Never print the secret.
impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    /// `None` disables the audit log.
    pub audit_log_path: Option<PathBuf>,
    pub pairs: Vec<CredentialPair>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            audit_log_path: Some(PathBuf::from(DEFAULT_LOG_PATH)),
            pairs: default_pairs(),
        }
    }
}

impl Config {
    /// Build the configuration from the process environment.
    /// `.env` is expected to be loaded by the caller.
    pub fn from_env() -> Result<Self, FixError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    // Same as `from_env` with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FixError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("FIX_PASSWORDS_DB").filter(|v| !v.trim().is_empty()) {
            cfg.database_path = PathBuf::from(v);
        }

        match lookup("FIX_PASSWORDS_LOG") {
            Some(v) if v.trim().is_empty() => cfg.audit_log_path = None,
            Some(v) => cfg.audit_log_path = Some(PathBuf::from(v)),
            None => {}
        }

        if let Some(path) = lookup("FIX_PASSWORDS_TABLE").filter(|v| !v.trim().is_empty()) {
            let raw = fs::read(&path)
                .map_err(|e| FixError::Config(format!("cannot read credential table {path}: {e}")))?;
            cfg.pairs = parse_table(&raw)?;
        }

        Ok(cfg)
    }
}

pub fn default_pairs() -> Vec<CredentialPair> {
    DEFAULT_TABLE
        .iter()
        .map(|(key, secret)| CredentialPair::new(*key, secret))
        .collect()
}

/// Parse a credential table: one `key=secret` per line.
/// Blank lines and lines starting with `#` are skipped; only the first `=` splits.
/// The key is trimmed but the secret is taken verbatim up to the end of the line
/// (a trailing `\r` aside): `key = secret` stores `" secret"`, leading space included.
/// Secrets stay raw bytes so non-UTF-8 input is caught when it is hashed.
pub fn parse_table(raw: &[u8]) -> Result<Vec<CredentialPair>, FixError> {
    let mut pairs = Vec::new();

    for (idx, line) in raw.split(|b| *b == b'\n').enumerate() {
        let line_no = idx + 1;
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        let trimmed_start = line.trim_ascii_start();
        if trimmed_start.is_empty() || trimmed_start.starts_with(b"#") {
            continue;
        }

        let Some(eq) = line.iter().position(|b| *b == b'=') else {
            return Err(FixError::Config(format!("line {line_no}: expected key=secret")));
        };
        let (key_raw, secret) = (&line[..eq], &line[eq + 1..]);

        let key = std::str::from_utf8(key_raw)
            .map_err(|_| FixError::Config(format!("line {line_no}: key is not valid UTF-8")))?
            .trim();
        if key.is_empty() {
            return Err(FixError::Config(format!("line {line_no}: empty key")));
        }

        pairs.push(CredentialPair::new(key, secret));
    }

    Ok(pairs)
}
