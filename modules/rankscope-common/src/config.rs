use std::env;

/// Application configuration loaded from environment variables.
/// Constructed once in `main` and passed into constructors; nothing else
/// reads the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    // DataForSEO
    pub dataforseo_login: String,
    pub dataforseo_password: String,

    // Web server
    pub api_host: String,
    pub api_port: u16,

    // Export
    pub results_dir: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            dataforseo_login: required_env("DATAFORSEO_LOGIN"),
            dataforseo_password: required_env("DATAFORSEO_PASSWORD"),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("API_PORT must be a number"),
            results_dir: env::var("RESULTS_DIR").unwrap_or_else(|_| "results".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
