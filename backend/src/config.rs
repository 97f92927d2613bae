use tracing::warn;

pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 3;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Total tries for a version-checked write before the conflict is surfaced.
    pub max_write_attempts: u32,
    /// The single origin granted credentialed CORS.
    pub allowed_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl AppConfig {
    /// Builds the config from a secret lookup; missing or bad values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("MAX_WRITE_ATTEMPTS") {
            match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => config.max_write_attempts = n,
                _ => warn!("Ignoring invalid MAX_WRITE_ATTEMPTS value {:?}", raw),
            }
        }

        if let Some(origin) = lookup("ALLOWED_ORIGIN") {
            if origin.trim().is_empty() {
                warn!("ALLOWED_ORIGIN is empty, keeping {}", config.allowed_origin);
            } else {
                config.allowed_origin = origin.trim().to_string();
            }
        }

        config
    }
}
