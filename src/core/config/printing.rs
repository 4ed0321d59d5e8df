use crate::core::config::data::{Config, DEFAULT_USER_ID};
use crate::core::config::settings::file_key;

/// Hide all but the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

impl Config {
    pub fn render_summary(&self) -> String {
        fn line(key: &str, value: Option<&str>) -> String {
            format!("  {}: {}\n", file_key(key), value.unwrap_or("(unset)"))
        }

        let mut out = String::from("Current configuration:\n");
        out.push_str(&line("endpoint", self.endpoint.as_deref()));
        out.push_str(&line(
            "token",
            self.token.as_deref().map(mask_secret).as_deref(),
        ));
        out.push_str(&line("bot-id-basic", self.bot_id_basic.as_deref()));
        out.push_str(&line("bot-id-cutie", self.bot_id_cutie.as_deref()));
        out.push_str(&line(
            "user-id",
            Some(self.user_id.as_deref().unwrap_or(DEFAULT_USER_ID)),
        ));
        out.push_str(&line("welcome-basic", self.welcome_basic.as_deref()));
        out.push_str(&line("welcome-cutie", self.welcome_cutie.as_deref()));
        out.push_str(&line(
            "default-persona",
            Some(&self.default_persona.unwrap_or_default().to_string()),
        ));
        out.push_str(&line(
            "stale-replies",
            Some(match self.stale_replies.unwrap_or_default() {
                crate::core::session::StaleReplyPolicy::Discard => "discard",
                crate::core::session::StaleReplyPolicy::Append => "append",
            }),
        ));
        let timeout = self.request_timeout_secs.map(|secs| secs.to_string());
        out.push_str(&line(
            "request-timeout-secs",
            Some(timeout.as_deref().unwrap_or("(none)")),
        ));
        out.push_str("\nChange a value with `beautydesk set <key> <value>`, using dashes (e.g. bot-id-basic).\n");
        out
    }

    pub fn print_all(&self) {
        print!("{}", self.render_summary());
    }
}
