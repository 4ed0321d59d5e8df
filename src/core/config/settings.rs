//! Resolution of the on-disk config, environment and keyring into the
//! immutable settings a chat session runs with.

use std::fmt;

use crate::core::config::data::{Config, DEFAULT_USER_ID};
use crate::core::persona::{Persona, PersonaProfile, PersonaTable};
use crate::core::session::StaleReplyPolicy;

pub const ENV_API_URL: &str = "BEAUTYDESK_API_URL";
pub const ENV_ACCESS_TOKEN: &str = "BEAUTYDESK_ACCESS_TOKEN";
pub const ENV_BOT_ID_BASIC: &str = "BEAUTYDESK_BOT_ID_BASIC";
pub const ENV_BOT_ID_CUTIE: &str = "BEAUTYDESK_BOT_ID_CUTIE";
pub const ENV_USER: &str = "BEAUTYDESK_USER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub token: String,
    pub bot_id_basic: String,
    pub bot_id_cutie: String,
    pub user_id: String,
    pub welcome_basic: Option<String>,
    pub welcome_cutie: Option<String>,
    pub default_persona: Persona,
    pub stale_replies: StaleReplyPolicy,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    Missing {
        key: &'static str,
        env_var: &'static str,
    },
}

/// Config-file spelling of a `beautydesk set` key.
pub fn file_key(cli_key: &str) -> String {
    cli_key.replace('-', "_")
}

impl SettingsError {
    /// Suggested commands that would fix the problem.
    pub fn quick_fixes(&self) -> Vec<String> {
        match self {
            SettingsError::Missing { key, env_var } if *key == "token" => vec![
                "beautydesk auth".to_string(),
                format!("export {env_var}=<token>"),
            ],
            SettingsError::Missing { key, env_var } => vec![
                format!("beautydesk set {key} <value>"),
                format!("export {env_var}=<value>"),
            ],
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Missing { key, env_var } => write!(
                f,
                "❌ Missing required setting '{}' in the config file (or run `beautydesk set {key}`, or set {env_var})",
                file_key(key)
            ),
        }
    }
}

impl std::error::Error for SettingsError {}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    /// Merge sources. Environment wins over everything; the keyring token
    /// wins over a token stored in the config file.
    pub fn resolve<F>(
        config: &Config,
        env: F,
        keyring_token: Option<String>,
    ) -> Result<Settings, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |env_var: &'static str,
                    key: &'static str,
                    file_value: &Option<String>|
         -> Result<String, SettingsError> {
            non_blank(env(env_var))
                .or_else(|| non_blank(file_value.clone()))
                .ok_or(SettingsError::Missing { key, env_var })
        };

        let endpoint = pick(ENV_API_URL, "endpoint", &config.endpoint)?;
        let token = non_blank(env(ENV_ACCESS_TOKEN))
            .or_else(|| non_blank(keyring_token))
            .or_else(|| non_blank(config.token.clone()))
            .ok_or(SettingsError::Missing {
                key: "token",
                env_var: ENV_ACCESS_TOKEN,
            })?;
        let bot_id_basic = pick(ENV_BOT_ID_BASIC, "bot-id-basic", &config.bot_id_basic)?;
        let bot_id_cutie = pick(ENV_BOT_ID_CUTIE, "bot-id-cutie", &config.bot_id_cutie)?;
        let user_id = non_blank(env(ENV_USER))
            .or_else(|| non_blank(config.user_id.clone()))
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        Ok(Settings {
            endpoint,
            token,
            bot_id_basic,
            bot_id_cutie,
            user_id,
            welcome_basic: non_blank(config.welcome_basic.clone()),
            welcome_cutie: non_blank(config.welcome_cutie.clone()),
            default_persona: config.default_persona.unwrap_or_default(),
            stale_replies: config.stale_replies.unwrap_or_default(),
            request_timeout_secs: config.request_timeout_secs,
        })
    }

    /// Convenience for callers that read the real process environment.
    pub fn resolve_from_process_env(
        config: &Config,
        keyring_token: Option<String>,
    ) -> Result<Settings, SettingsError> {
        Self::resolve(config, |name| std::env::var(name).ok(), keyring_token)
    }

    pub fn persona_table(&self) -> PersonaTable {
        PersonaTable::new(
            PersonaProfile::new(
                Persona::Basic,
                self.bot_id_basic.clone(),
                self.welcome_basic.clone(),
            ),
            PersonaProfile::new(
                Persona::Cutie,
                self.bot_id_cutie.clone(),
                self.welcome_cutie.clone(),
            ),
        )
    }
}
