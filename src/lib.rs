pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod normalizer;
pub mod ui;

pub use config::{Config, CredentialPair};
pub use db::{CredentialStore, IdentityRecord, SqliteStore};
pub use error::FixError;
pub use normalizer::{check_credentials, normalize_credentials, Conformance, NormalizeReport, PairOutcome};
