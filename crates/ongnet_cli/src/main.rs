//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `ongnet_core` linkage without an embedding application.
//! - Optionally open a database and report schema version and user count.

use ongnet_core::db::migrations::current_user_version;
use ongnet_core::db::open_db;
use ongnet_core::{AccountRepository, CoreConfig, SqliteAccountRepository};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("ongnet_core ping={}", ongnet_core::ping());
    println!("ongnet_core version={}", ongnet_core::core_version());

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = config.log_dir.as_ref().and_then(|dir| dir.to_str()) {
        if let Err(err) = ongnet_core::init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let db_path = std::env::args().nth(1).map(PathBuf::from).or(config.db_path);
    let Some(db_path) = db_path else {
        return ExitCode::SUCCESS;
    };

    match report_database(&db_path) {
        Ok((version, users)) => {
            println!("db path={}", db_path.display());
            println!("db schema_version={version}");
            println!("db users={users}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("db error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn report_database(path: &Path) -> Result<(u32, u64), Box<dyn std::error::Error>> {
    let conn = open_db(path)?;
    let version = current_user_version(&conn)?;
    let users = SqliteAccountRepository::try_new(&conn)?.count_users()?;
    Ok((version, users))
}
