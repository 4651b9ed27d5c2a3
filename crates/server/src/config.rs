use std::path::PathBuf;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub port: u16,
    pub base_url: String,
    pub jwt_secret: String,
    pub registration_open: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|s| !s.is_empty());

        let data_dir = var("FAMSHARE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        let port = match var("PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                tracing::warn!("ignoring invalid PORT: {e}");
                3000
            }
            None => 3000,
        };
        let base_url = var("BASE_URL").unwrap_or_else(|| format!("http://localhost:{port}"));

        let jwt_secret = var("JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() {
            tracing::warn!(
                "JWT_SECRET not set; signup, login and authenticated routes are disabled"
            );
        }

        let registration_open = var("FAMSHARE_REGISTRATION").as_deref() != Some("closed");

        Self {
            data_dir,
            port,
            base_url,
            jwt_secret,
            registration_open,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("famshare.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.base_url, "http://localhost:3000");
        assert!(cfg.jwt_secret.is_empty());
        assert!(cfg.registration_open);
        assert_eq!(cfg.db_path(), PathBuf::from("data/famshare.db"));
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("FAMSHARE_DATA_DIR", "/var/lib/famshare"),
            ("PORT", "8080"),
            ("JWT_SECRET", "s3cret"),
            ("FAMSHARE_REGISTRATION", "closed"),
        ]);
        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/famshare"));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.base_url, "http://localhost:8080");
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert!(!cfg.registration_open);
    }

    #[test]
    fn invalid_port_falls_back() {
        assert_eq!(config(&[("PORT", "http")]).port, 3000);
    }
}
