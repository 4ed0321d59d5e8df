//! Wire payloads exchanged with the bot-routing chat endpoint.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AnswerRequest {
    pub bot_id: String,
    pub user: String,
    pub query: String,
}

/// One entry of the backend's `messages` list. Besides the answer the
/// backend also returns follow-up suggestions and verbose traces, so only
/// the fields needed to tell them apart are required.
#[derive(Deserialize, Debug, Clone)]
pub struct ResponseMessage {
    pub role: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl ResponseMessage {
    pub fn is_answer(&self) -> bool {
        self.role == "assistant" && self.kind == "answer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_backend_field_names() {
        let request = AnswerRequest {
            bot_id: "b1".into(),
            user: "web_user_001".into(),
            query: "hello".into(),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"bot_id": "b1", "user": "web_user_001", "query": "hello"})
        );
    }

    #[test]
    fn response_message_reads_type_field() {
        let msg: ResponseMessage = serde_json::from_str(
            r#"{"role":"assistant","type":"follow_up","content":"more?","content_type":"text"}"#,
        )
        .expect("parse");
        assert_eq!(msg.kind, "follow_up");
        assert!(!msg.is_answer());
    }

    #[test]
    fn unknown_fields_do_not_reject_an_answer() {
        let msg: ResponseMessage = serde_json::from_str(
            r#"{"role":"assistant","type":"answer","content":"X","content_type":null,"extra":{"a":1}}"#,
        )
        .expect("parse");
        assert!(msg.is_answer());
        assert_eq!(msg.content, "X");
    }
}
