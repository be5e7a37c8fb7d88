//! chat completions 호출/응답 해석 공용 함수.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::domain::review::TokenUsage;

const ERROR_BODY_LIMIT: usize = 300;

pub(super) fn build_api_client() -> Client {
    // TLS 초기화에 실패하면 기본 클라이언트를 쓴다.
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// 요청을 보내 JSON 본문을 돌려받는다.
/// 실패 응답은 `error.message`(없으면 본문 앞부분)를 담은 오류가 된다.
pub(super) async fn send_json(
    provider_name: &str,
    action: &str,
    request: RequestBuilder,
) -> Result<Value> {
    let response = request
        .send()
        .await
        .with_context(|| format!("{provider_name}: failed to {action}"))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("{provider_name}: failed to read {action} response body"))?;

    if !status.is_success() {
        bail!(
            "{provider_name}: {action} failed ({status}): {}",
            api_error_message(&body)
        );
    }

    serde_json::from_str(&body)
        .with_context(|| format!("{provider_name}: invalid JSON response while {action}"))
}

fn api_error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    if let Some(message) = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/message"))
        .and_then(Value::as_str)
    {
        return message.to_string();
    }
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

/// 첫 번째 choice의 assistant 메시지 본문.
/// `content`가 문자열이거나 `{type: "text", text}` 파트 배열인 경우를 모두 받는다.
pub(super) fn first_choice_text(value: &Value) -> String {
    let Some(content) = value.pointer("/choices/0/message/content") else {
        return String::new();
    };

    match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}

/// `usage` 객체에서 토큰 수를 읽는다. total이 없으면 합으로 채운다.
pub(super) fn parse_usage(value: &Value) -> TokenUsage {
    let Some(usage) = value.get("usage") else {
        return TokenUsage::default();
    };

    let prompt = usage.get("prompt_tokens").and_then(Value::as_u64);
    let completion = usage.get("completion_tokens").and_then(Value::as_u64);
    let total = usage
        .get("total_tokens")
        .and_then(Value::as_u64)
        .or(match (prompt, completion) {
            (Some(p), Some(c)) => Some(p + c),
            _ => None,
        });

    TokenUsage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_is_read_from_first_choice() {
        let plain = json!({
            "choices": [{ "message": { "role": "assistant", "content": "[]" } }]
        });
        assert_eq!(first_choice_text(&plain), "[]");

        let parts = json!({
            "choices": [{ "message": { "content": [
                { "type": "text", "text": "[{\"line\": 3" },
                { "type": "text", "text": "}]" }
            ] } }]
        });
        assert_eq!(first_choice_text(&parts), "[{\"line\": 3}]");
        assert_eq!(first_choice_text(&json!({ "choices": [] })), "");
    }

    #[test]
    fn error_message_prefers_api_error_field() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Incorrect API key provided");
        assert_eq!(api_error_message("bad gateway"), "bad gateway");
        assert_eq!(api_error_message(&"x".repeat(1000)).len(), ERROR_BODY_LIMIT);
    }

    #[test]
    fn usage_total_falls_back_to_sum() {
        let usage = parse_usage(&json!({ "usage": { "prompt_tokens": 7, "completion_tokens": 5 } }));
        assert_eq!(usage.total_tokens, Some(12));
        assert_eq!(parse_usage(&json!({})), TokenUsage::default());
    }
}
