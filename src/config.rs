use std::env;

/// Default namespace prefix for generated license codes.
pub const DEFAULT_CODE_PREFIX: &str = "Wind-Banner";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Namespace prefix stamped on every generated code
    pub code_prefix: String,
    /// Shared bearer token the interaction surface must present (None = open)
    pub service_token: Option<String>,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("WIND_BANNER_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let code_prefix = env::var("LICENSE_CODE_PREFIX")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_CODE_PREFIX.to_string());

        let service_token = env::var("SERVICE_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "licenses.db".to_string()),
            code_prefix,
            service_token,
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
