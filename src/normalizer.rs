//! Bring stored credentials in line with the plaintext secrets they should encode.

use std::collections::HashMap;

use crate::auth;
use crate::config::CredentialPair;
use crate::db::CredentialStore;
use crate::error::FixError;
use crate::logger::{self, AuditEvent, AuditLog};

/// What happened to one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    Updated { rows: usize, credential: String },
    /// The lookup key matched no record. Not an error; the run continues.
    NoMatch,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    pub outcomes: Vec<(String, PairOutcome)>,
}

impl NormalizeReport {
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PairOutcome::Updated { .. }))
            .count()
    }

    pub fn no_match(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == PairOutcome::NoMatch).count()
    }

    pub fn no_match_keys(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == PairOutcome::NoMatch)
            .map(|(k, _)| k.as_str())
    }
}

/// Rewrite the stored credential of every record named in `pairs`, in order.
///
/// Each successful update is committed before the next pair is processed, so an
/// encoding or storage error aborts the remaining pairs but leaves earlier
/// updates in place.
pub fn normalize_credentials<S: CredentialStore>(
    store: &mut S,
    pairs: &[CredentialPair],
    audit: Option<&AuditLog>,
) -> Result<NormalizeReport, FixError> {
    let mut report = NormalizeReport::default();

    for pair in pairs {
        match normalize_pair(store, pair) {
            Ok(PairOutcome::Updated { rows, credential }) => {
                println!("Updated password for {}: {}", pair.key, credential);
                logger::log_event(audit, &pair.key, AuditEvent::Updated, &credential);
                report.outcomes.push((pair.key.clone(), PairOutcome::Updated { rows, credential }));
            }
            Ok(PairOutcome::NoMatch) => {
                eprintln!("No user found for {}; skipped.", pair.key);
                logger::log_event(audit, &pair.key, AuditEvent::NoMatch, "0 rows affected");
                report.outcomes.push((pair.key.clone(), PairOutcome::NoMatch));
            }
            Err(e) => {
                logger::log_event(audit, &pair.key, AuditEvent::Failed, &e.to_string());
                return Err(e);
            }
        }
    }

    Ok(report)
}

fn normalize_pair<S: CredentialStore>(store: &mut S, pair: &CredentialPair) -> Result<PairOutcome, FixError> {
    let credential = auth::hash_secret_bytes(&pair.key, &pair.secret)?;
    let rows = store.update_credential(&pair.key, &credential)?;
    if rows == 0 {
        return Ok(PairOutcome::NoMatch);
    }
    store.commit()?;
    Ok(PairOutcome::Updated { rows, credential })
}

/*------------------------ Conformance check ---------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conformance {
    Ok,
    Mismatch,
    Missing,
}

// Compare each pair with the store without writing anything.
pub fn check_credentials<S: CredentialStore>(
    store: &mut S,
    pairs: &[CredentialPair],
    audit: Option<&AuditLog>,
) -> Result<Vec<(String, Conformance)>, FixError> {
    let stored: HashMap<String, String> = store
        .find_all()?
        .into_iter()
        .map(|r| (r.email, r.password))
        .collect();

    let mut results = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let status = match stored.get(&pair.key) {
            None => Conformance::Missing,
            Some(current) if auth::verify_secret_bytes(&pair.secret, current) => Conformance::Ok,
            Some(_) => Conformance::Mismatch,
        };
        let event = match status {
            Conformance::Ok => AuditEvent::CheckOk,
            Conformance::Mismatch => AuditEvent::CheckMismatch,
            Conformance::Missing => AuditEvent::CheckMissing,
        };
        logger::log_event(audit, &pair.key, event, "");
        results.push((pair.key.clone(), status));
    }
    Ok(results)
}
