#[cfg(test)]
use crate::core::answer::AnswerFetcher;
#[cfg(test)]
use crate::core::app::App;
#[cfg(test)]
use crate::core::config::Settings;
#[cfg(test)]
use crate::core::persona::Persona;
#[cfg(test)]
use crate::core::session::StaleReplyPolicy;
#[cfg(test)]
use crate::utils::logging::LoggingState;
#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
pub fn create_test_settings() -> Settings {
    Settings {
        endpoint: "http://127.0.0.1:9/open_api/v2/chat".to_string(),
        token: "test-token".to_string(),
        bot_id_basic: "bot-basic".to_string(),
        bot_id_cutie: "bot-cutie".to_string(),
        user_id: "web_user_001".to_string(),
        welcome_basic: None,
        welcome_cutie: None,
        default_persona: Persona::Basic,
        stale_replies: StaleReplyPolicy::Discard,
        request_timeout_secs: None,
    }
}

/// Answers every query with the same canned text.
#[cfg(test)]
pub struct StaticFetcher(pub String);

#[cfg(test)]
#[async_trait]
impl AnswerFetcher for StaticFetcher {
    async fn fetch_answer(&self, _bot_id: &str, _query: &str) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
pub fn create_test_app() -> App {
    create_test_app_with(create_test_settings())
}

#[cfg(test)]
pub fn create_test_app_with(settings: Settings) -> App {
    App::with_fetcher(
        settings,
        LoggingState::new(None).unwrap(),
        Arc::new(StaticFetcher("canned".to_string())),
    )
}

#[cfg(test)]
pub const SAMPLE_MARKDOWN_REPLY: &str = "## 双眼皮手术\n\n价格区间为**5000-15000元**，具体取决于：\n\n- 手术方式（埋线或全切）\n- 医生资历\n\n详情请见[官网](https://example.com)。";
