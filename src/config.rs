use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub csrf: CsrfConfig,
    pub max_body_size: usize,
    pub images_dir: PathBuf,
    pub reset_ttl_minutes: i64,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Master secret for the private cookie key. At least 32 bytes.
    pub key: String,
    /// Sets the `Secure` flag on the CSRF and session cookies.
    pub secure: bool,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let csrf_key = env_required("CSRF_KEY")?;
        if csrf_key.len() < 32 {
            return Err("CSRF_KEY must be at least 32 bytes".to_string());
        }
        let csrf = CsrfConfig {
            key: csrf_key,
            secure: env_or("CSRF_SECURE", "false") == "true",
        };

        let host: IpAddr = env_or("PICTUREBOOK_HOST", "127.0.0.1")
            .parse()
            .map_err(|e| format!("Invalid PICTUREBOOK_HOST: {e}"))?;

        let port: u16 = env_or("PICTUREBOOK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PICTUREBOOK_PORT: {e}"))?;

        let base_url = env_or("PICTUREBOOK_BASE_URL", &format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let max_body_size: usize = env_or("PICTUREBOOK_MAX_BODY_SIZE", "10485760")
            .parse()
            .map_err(|e| format!("Invalid PICTUREBOOK_MAX_BODY_SIZE: {e}"))?;

        let images_dir = PathBuf::from(env_or("PICTUREBOOK_IMAGES_DIR", "images"));

        let reset_ttl_minutes: i64 = env_or("PICTUREBOOK_RESET_TTL_MINUTES", "60")
            .parse()
            .map_err(|e| format!("Invalid PICTUREBOOK_RESET_TTL_MINUTES: {e}"))?;

        let log_level = env_or("PICTUREBOOK_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("SMTP_HOST").ok(),
            std::env::var("SMTP_PORT").ok(),
            std::env::var("SMTP_USERNAME").ok(),
            std::env::var("SMTP_PASSWORD").ok(),
        ) {
            (Some(host), Some(port), Some(username), Some(password)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid SMTP_PORT: {e}"))?,
                username,
                password,
                from: std::env::var("SMTP_FROM").ok().filter(|s| !s.is_empty()),
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            base_url,
            csrf,
            max_body_size,
            images_dir,
            reset_ttl_minutes,
            log_level,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
