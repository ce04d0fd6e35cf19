use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Optional on-disk configuration, merged below environment variables.
pub const CONFIG_FILE: &str = "cibil.toml";

/// Process-wide configuration loaded on first access.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|e| panic!("FATAL: invalid configuration: {e}"))
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_retries: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:cibil.sqlite".to_string(),
            max_connections: 5,
            connect_retries: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_all_origins: bool,
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_all_origins: false,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: false,
        }
    }
}

impl Config {
    /// Defaults, then `cibil.toml`, then `CIBIL_*` environment variables.
    ///
    /// Nested keys use `__`, e.g. `CIBIL_DATABASE__URL=sqlite:/var/lib/cibil.sqlite`.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment(CONFIG_FILE).extract()
    }

    pub fn figment(toml_path: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed("CIBIL_").split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CIBIL_DATABASE__URL", "sqlite:other.sqlite");
            jail.set_env("CIBIL_CORS__ALLOW_ALL_ORIGINS", "true");
            let cfg: Config = Config::figment("missing.toml").extract()?;
            assert_eq!(cfg.database.url, "sqlite:other.sqlite");
            assert!(cfg.cors.allow_all_origins);
            assert_eq!(cfg.basic.listen_addr, "0.0.0.0:8000");
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_merged_below_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "cibil.toml",
                r#"
                [basic]
                loglevel = "debug"

                [database]
                max_connections = 9
                "#,
            )?;
            jail.set_env("CIBIL_BASIC__LOGLEVEL", "warn");
            let cfg: Config = Config::figment("cibil.toml").extract()?;
            assert_eq!(cfg.basic.loglevel, "warn");
            assert_eq!(cfg.database.max_connections, 9);
            Ok(())
        });
    }
}
