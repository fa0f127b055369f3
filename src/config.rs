use crate::error::ConfigError;
use crate::types::Target;
use config as config_crate;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Configuração operacional do sistema.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Alvos monitorados.
    pub targets: Vec<TargetConfig>,
    /// Credenciais do canal de notificação.
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub url: String,
    /// Intervalo entre checagens em milissegundos.
    pub poll_interval_ms: u64,
    /// Timeout de cada checagem em milissegundos.
    pub check_timeout_ms: u64,
    /// Texto incluído no alerta.
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    pub bot_token: String,
    pub chat_id: i64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Config {
    /// Carrega `config.{json,toml,yaml}` do diretório atual, sobrescrito por
    /// variáveis `SENTINELA_*` (ex.: `SENTINELA_NOTIFIER__BOT_TOKEN`).
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config_crate::Config::builder()
            .add_source(config_crate::File::with_name("config"))
            .add_source(
                config_crate::Environment::with_prefix("SENTINELA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = config_crate::Config::builder()
            .add_source(config_crate::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Validação dos valores carregados.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            parse_url(&target.url)?;
            if target.poll_interval_ms == 0 {
                return Err(ConfigError::ZeroDuration {
                    url: target.url.clone(),
                    field: "poll_interval_ms",
                });
            }
            if target.check_timeout_ms == 0 {
                return Err(ConfigError::ZeroDuration {
                    url: target.url.clone(),
                    field: "check_timeout_ms",
                });
            }
            if !seen.insert(target.url.as_str()) {
                return Err(ConfigError::DuplicateTarget(target.url.clone()));
            }
        }

        if self.notifier.bot_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        parse_url(&self.notifier.api_base_url)?;
        Ok(())
    }

    /// Converte os alvos configurados no modelo imutável usado pelo scheduler.
    pub fn targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .map(|t| {
                Target::new(
                    t.url.clone(),
                    Duration::from_millis(t.poll_interval_ms),
                    Duration::from_millis(t.check_timeout_ms),
                    t.message.clone(),
                )
            })
            .collect()
    }
}

fn parse_url(url: &str) -> Result<reqwest::Url, ConfigError> {
    reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
