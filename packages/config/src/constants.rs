// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Reqhub

// Server Configuration
pub const REQHUB_API_HOST: &str = "REQHUB_API_HOST";
pub const REQHUB_API_PORT: &str = "REQHUB_API_PORT";
pub const PORT: &str = "PORT"; // Legacy

// CORS Configuration
pub const REQHUB_CORS_ORIGIN: &str = "REQHUB_CORS_ORIGIN";

// Database Configuration
pub const REQHUB_DATABASE_PATH: &str = "REQHUB_DATABASE_PATH";
pub const REQHUB_DB_MAX_CONNECTIONS: &str = "REQHUB_DB_MAX_CONNECTIONS";
pub const REQHUB_DB_BUSY_TIMEOUT_SECS: &str = "REQHUB_DB_BUSY_TIMEOUT_SECS";

// Defaults
pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_PORT: u16 = 4100;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DB_BUSY_TIMEOUT_SECS: u64 = 30;
