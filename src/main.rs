use anyhow::{bail, Context, Result};
use rpassword::read_password;
use std::io::{self, Write};
use zeroize::Zeroize;

use fix_passwords::logger::AuditLog;
use fix_passwords::{auth, ui, Conformance, Config, CredentialStore, SqliteStore};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "fix_passwords".to_string());

    match args.next().as_deref() {
        None => run_fix(),
        Some("check") => run_check(),
        Some("hash") => run_hash(),
        Some("help" | "-h" | "--help") => {
            ui::usage_ui(&program);
            Ok(())
        }
        Some(other) => {
            ui::usage_ui(&program);
            bail!("unknown command '{other}'")
        }
    }
}

fn load_config() -> Result<(Config, Option<AuditLog>)> {
    let cfg = Config::from_env().context("Failed to load configuration")?;
    let audit = cfg.audit_log_path.clone().map(AuditLog::new);
    Ok((cfg, audit))
}

fn open_store(cfg: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&cfg.database_path)
        .with_context(|| format!("Failed to open database {}", cfg.database_path.display()))
}

// The listing is diagnostic only; a failure here must not stop or fail the fix.
fn show_users(store: &mut SqliteStore, title: &str) {
    match store.find_all() {
        Ok(users) => ui::users_table_ui(title, &users),
        Err(e) => eprintln!("Could not list users ({title}): {e}"),
    }
}

// === default: rewrite the configured accounts ===
fn run_fix() -> Result<()> {
    let (cfg, audit) = load_config()?;
    ui::banner_ui(&cfg.database_path.display().to_string());

    let mut store = open_store(&cfg)?;

    show_users(&mut store, "Current users");
    println!();

    let report = fix_passwords::normalize_credentials(&mut store, &cfg.pairs, audit.as_ref())
        .context("Password update aborted")?;

    store.commit().context("Failed to commit password updates")?;

    show_users(&mut store, "Updated users");
    ui::report_ui(&report);

    store.close().context("Failed to close database")?;
    Ok(())
}

// === check: compare without writing ===
fn run_check() -> Result<()> {
    let (cfg, audit) = load_config()?;
    let mut store = open_store(&cfg)?;

    let results = fix_passwords::check_credentials(&mut store, &cfg.pairs, audit.as_ref())
        .context("Credential check failed")?;
    ui::check_ui(&results);
    store.close().context("Failed to close database")?;

    let bad = results.iter().filter(|(_, s)| *s != Conformance::Ok).count();
    if bad > 0 {
        bail!("{bad} account(s) do not match their configured password");
    }
    Ok(())
}

// === hash: one-off stored credential generator ===
fn run_hash() -> Result<()> {
    let cfg = Config::from_env().context("Failed to load configuration")?;

    println!("=== Password Hash Generator ===");
    print!("Enter the password to hash: ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut password = read_password().context("Failed to read password input")?;
    let hashed = auth::hash_password(password.trim_end_matches(['\r', '\n']));
    password.zeroize();

    println!("\nStored credential:");
    println!("{hashed}");
    println!("\nTo apply it by hand, run:");
    println!("{}", ui::manual_update_command(&cfg.database_path, &hashed));
    Ok(())
}
