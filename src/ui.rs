use colored::*;
use std::path::Path;

use crate::db::IdentityRecord;
use crate::normalizer::{Conformance, NormalizeReport};

pub fn banner_ui(database: &str) {
    let bar = "=".repeat(60);
    println!("{}", bar.color(Color::BrightBlue));
    println!("{}", " PASSWORD FIX UTILITY ".color(Color::BrightYellow).bold());
    println!(" Database: {}", database.color(Color::Cyan));
    println!("{}", bar.color(Color::BrightBlue));
}

/// Print every user row as a fixed-width table.
pub fn users_table_ui(title: &str, users: &[IdentityRecord]) {
    println!("\n===== {} =====", title.bold());
    if users.is_empty() {
        println!("{}", "(no users)".dimmed());
        return;
    }
    println!("{:<5} {:<30} {:<46}", "ID", "Email", "Password");
    println!("{}", "-".repeat(83));
    for u in users {
        println!("{:<5} {:<30} {:<46}", u.id, u.email, u.password);
    }
}

pub fn report_ui(report: &NormalizeReport) {
    println!();
    if report.no_match() == 0 {
        println!("{}", "Passwords updated successfully!".green().bold());
    } else {
        println!(
            "{} updated, {} skipped (no matching user: {})",
            report.updated().to_string().green().bold(),
            report.no_match().to_string().yellow().bold(),
            report.no_match_keys().collect::<Vec<_>>().join(", ")
        );
    }
}

pub fn check_ui(results: &[(String, Conformance)]) {
    println!("\n===== Credential Check =====");
    for (key, status) in results {
        let label = match status {
            Conformance::Ok => "OK".green().bold(),
            Conformance::Mismatch => "MISMATCH".red().bold(),
            Conformance::Missing => "MISSING".yellow().bold(),
        };
        println!("{:<30} {}", key, label);
    }
}

pub fn usage_ui(program: &str) {
    println!("Usage:");
    println!("  {program}          reset the configured accounts' passwords");
    println!("  {program} check    report which accounts do not match their configured password");
    println!("  {program} hash     print the stored form of a password typed at the prompt");
}

// Shell command that applies a stored credential by hand to the configured database.
pub fn manual_update_command(database: &Path, credential: &str) -> String {
    format!(
        "sqlite3 {} \"UPDATE Utenti SET Password = '{}' WHERE Email = '<email>';\"",
        database.display(),
        credential
    )
}
