use anyhow::{Context, Result};

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| split_origins(&raw))
            .unwrap_or_else(|_| vec![DEFAULT_CORS_ORIGIN.to_string()]);

        let max_upload_bytes = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid MAX_UPLOAD_BYTES {raw:?}"))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            cors_allowed_origins,
            max_upload_bytes,
        })
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
