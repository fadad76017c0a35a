use std::env;
use std::path::PathBuf;

/// Prefix of every generated review meeting number (`RM-YYYYMMDD-NNN`)
pub const MEETING_NO_PREFIX: &str = "RM";

/// File name of the SQLite database inside the Reqhub directory
pub const DATABASE_FILE_NAME: &str = "reqhub.db";

/// Get the path to the Reqhub directory (~/.reqhub)
pub fn reqhub_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".reqhub")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".reqhub")
    }
}

/// Get the default database path (~/.reqhub/reqhub.db)
pub fn default_database_path() -> PathBuf {
    reqhub_dir().join(DATABASE_FILE_NAME)
}
