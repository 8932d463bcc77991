//! HTTP JSON bodies exchanged with the bar backend.
//!
//! Both directions derive `Serialize` and `Deserialize` so test servers can
//! reuse them.

use serde::{Deserialize, Serialize};

/// Replies given to the bouncer so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingContextDto {
    pub responses: Vec<String>,
}

/// `POST /api/onboard` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardRequestDto {
    pub anonymous_id: String,
    /// Always serialized; `null` on the opening turn.
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<OnboardingContextDto>,
}

/// `POST /api/onboard` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardResponseDto {
    pub message: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub continue_onboarding: bool,
}

/// `POST /session/start` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStartRequestDto {
    pub anonymous_id: String,
}

/// `POST /session/start` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStartResponseDto {
    pub session_id: String,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub available_agents: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `POST /message` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRequestDto {
    pub session_id: String,
    pub content: String,
    /// Always serialized; `null` when no persona is selected.
    pub selected_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_context: Option<OnboardingContextDto>,
}

/// `POST /message` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponseDto {
    pub agent: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub agents_available: Vec<String>,
    #[serde(default)]
    pub agents_muted: Vec<String>,
    #[serde(default = "default_session_status")]
    pub session_status: String,
    pub message_count: u32,
    #[serde(default)]
    pub message_limit: Option<u32>,
}

fn default_session_status() -> String {
    "active".to_string()
}

/// Error body returned with a non-success status.
///
/// `detail` is usually a string but validation errors carry a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorResponseDto {
    /// Human-readable detail, if any.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_onboard_request_sends_null_message_without_context() {
        // テスト項目: 最初のオンボーディングリクエストは message=null で context を含まない
        // given (前提条件):
        let dto = OnboardRequestDto {
            anonymous_id: "visitor-1".to_string(),
            message: None,
            context: None,
        };

        // when (操作):
        let json = serde_json::to_value(&dto).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({"anonymous_id": "visitor-1", "message": null})
        );
    }

    #[test]
    fn test_message_request_keeps_null_selected_agent() {
        // テスト項目: selected_agent は未選択でも null として送信される
        // given (前提条件):
        let dto = MessageRequestDto {
            session_id: "s-1".to_string(),
            content: "hi".to_string(),
            selected_agent: None,
            onboarding_context: None,
        };

        // when (操作):
        let json = serde_json::to_value(&dto).unwrap();

        // then (期待する結果):
        assert_eq!(json["selected_agent"], serde_json::Value::Null);
        assert!(json.get("onboarding_context").is_none());
    }

    #[test]
    fn test_message_response_tolerates_missing_optional_fields() {
        // テスト項目: 省略可能なフィールドがないレスポンスもデシリアライズできる
        // given (前提条件):
        let body = r#"{"agent":"bart","message":"Evening.","message_count":1}"#;

        // when (操作):
        let dto: MessageResponseDto = serde_json::from_str(body).unwrap();

        // then (期待する結果):
        assert_eq!(dto.session_status, "active");
        assert!(dto.agents_muted.is_empty());
        assert_eq!(dto.message_limit, None);
    }

    #[test]
    fn test_error_detail_text_for_string_and_list() {
        // テスト項目: 文字列の detail はそのまま、リストの detail は JSON 文字列になる
        // given (前提条件):
        let string_detail: ErrorResponseDto =
            serde_json::from_str(r#"{"detail":"Session not found"}"#).unwrap();
        let list_detail: ErrorResponseDto =
            serde_json::from_str(r#"{"detail":[{"msg":"too long"}]}"#).unwrap();
        let no_detail: ErrorResponseDto = serde_json::from_str("{}").unwrap();

        // when (操作):

        // then (期待する結果):
        assert_eq!(
            string_detail.detail_text(),
            Some("Session not found".to_string())
        );
        assert!(list_detail.detail_text().unwrap().contains("too long"));
        assert_eq!(no_detail.detail_text(), None);
    }
}
