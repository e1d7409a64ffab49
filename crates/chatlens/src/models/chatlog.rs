use std::cmp::Ordering;

use serde_json::{Map, Value};
use time::OffsetDateTime;

pub const UNKNOWN: &str = "Unknown";

pub const CHAT_HISTORY_KEY: &str = "chat_history";
pub const CHAT_DATA_KEY: &str = "chat_data";

/// One loaded input file: its parsed JSON and the file name it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source_file: String,
    pub content: Value,
}

impl Document {
    #[must_use]
    pub fn new(source_file: impl Into<String>, content: Value) -> Self {
        Self {
            source_file: source_file.into(),
            content,
        }
    }

    /// Sessions under `chat_history`; empty when the key is absent or not a list.
    #[must_use]
    pub fn sessions(&self) -> Vec<ChatSession> {
        array_field(self.content.as_object(), CHAT_HISTORY_KEY)
            .iter()
            .map(ChatSession::from_value)
            .collect()
    }
}

/// Sort key for a session id. Ids written as JSON numbers order by value and
/// come before ids written as text.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionKey {
    Number(f64),
    Text(String),
}

impl SessionKey {
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(number)) => number
                .as_f64()
                .map_or_else(|| Self::Text(number.to_string()), Self::Number),
            Some(Value::String(text)) => Self::Text(text.clone()),
            _ => Self::Text(UNKNOWN.to_string()),
        }
    }

    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub user_id: String,
    pub project_id: String,
    pub session_id: String,
    pub session_key: SessionKey,
    pub datetime: String,
    pub session_total_tokens: f64,
    pub turns: Vec<ChatTurn>,
}

impl ChatSession {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let object = value.as_object();
        Self {
            user_id: id_field(object, "user_id"),
            project_id: id_field(object, "project_id"),
            session_id: id_field(object, "session_id"),
            session_key: SessionKey::from_value(object.and_then(|object| object.get("session_id"))),
            datetime: timestamp_field(object, "datetime"),
            session_total_tokens: token_field(object, "session_total_tokens"),
            turns: array_field(object, CHAT_DATA_KEY)
                .iter()
                .map(ChatTurn::from_value)
                .collect(),
        }
    }
}

/// Token counts keep the number as written, including negative and
/// fractional values; only a missing or non-numeric count reads as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub input_prompt: String,
    pub output_response: String,
    pub timestamp: String,
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub total_tokens: f64,
}

impl ChatTurn {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let object = value.as_object();
        Self {
            input_prompt: text_field(object, "input_prompt"),
            output_response: text_field(object, "output_response"),
            timestamp: timestamp_field(object, "timestamp"),
            input_tokens: token_field(object, "input_tokens"),
            output_tokens: token_field(object, "output_tokens"),
            total_tokens: token_field(object, "total_tokens"),
        }
    }
}

/// A chat turn joined with its session and source file, timestamps unparsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub user_id: String,
    pub project_id: String,
    pub session_id: String,
    pub session_key: SessionKey,
    pub session_datetime: String,
    pub session_total_tokens: f64,
    pub source_file: String,
    pub input_prompt: String,
    pub output_response: String,
    pub timestamp: String,
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub total_tokens: f64,
}

impl RawRecord {
    #[must_use]
    pub fn from_turn(source_file: &str, session: &ChatSession, turn: &ChatTurn) -> Self {
        Self {
            user_id: session.user_id.clone(),
            project_id: session.project_id.clone(),
            session_id: session.session_id.clone(),
            session_key: session.session_key.clone(),
            session_datetime: session.datetime.clone(),
            session_total_tokens: session.session_total_tokens,
            source_file: source_file.to_string(),
            input_prompt: turn.input_prompt.clone(),
            output_response: turn.output_response.clone(),
            timestamp: turn.timestamp.clone(),
            input_tokens: turn.input_tokens,
            output_tokens: turn.output_tokens,
            total_tokens: turn.total_tokens,
        }
    }
}

/// A table row. `timestamp` and `session_datetime` are `None` when the input
/// left them empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    pub user_id: String,
    pub project_id: String,
    pub session_id: String,
    pub session_key: SessionKey,
    pub session_datetime: Option<OffsetDateTime>,
    pub session_total_tokens: f64,
    pub source_file: String,
    pub input_prompt: String,
    pub output_response: String,
    pub timestamp: Option<OffsetDateTime>,
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub total_tokens: f64,
}

impl FlatRecord {
    #[must_use]
    pub fn hour(&self) -> Option<u8> {
        self.timestamp.map(|timestamp| timestamp.hour())
    }

    #[must_use]
    pub fn response_length(&self) -> usize {
        self.output_response.chars().count()
    }
}

fn array_field<'a>(object: Option<&'a Map<String, Value>>, key: &str) -> &'a [Value] {
    object
        .and_then(|object| object.get(key))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn id_field(object: Option<&Map<String, Value>>, key: &str) -> String {
    match object.and_then(|object| object.get(key)) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn text_field(object: Option<&Map<String, Value>>, key: &str) -> String {
    match object.and_then(|object| object.get(key)) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

fn timestamp_field(object: Option<&Map<String, Value>>, key: &str) -> String {
    match object.and_then(|object| object.get(key)) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

fn token_field(object: Option<&Map<String, Value>>, key: &str) -> f64 {
    object
        .and_then(|object| object.get(key))
        .and_then(Value::as_f64)
        .filter(|count| count.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::{ChatSession, ChatTurn, Document, SessionKey, UNKNOWN};
    use serde_json::json;

    #[test]
    fn session_defaults_missing_fields() {
        let session = ChatSession::from_value(&json!({"chat_data": [{}]}));

        assert_eq!(session.user_id, UNKNOWN);
        assert_eq!(session.project_id, UNKNOWN);
        assert_eq!(session.session_id, UNKNOWN);
        assert_eq!(session.datetime, "");
        assert_eq!(session.session_key, SessionKey::Text(UNKNOWN.to_string()));
        assert_eq!(session.session_total_tokens, 0.0);
        assert_eq!(session.turns.len(), 1);
        assert_eq!(session.turns[0].input_prompt, "");
        assert_eq!(session.turns[0].total_tokens, 0.0);
    }

    #[test]
    fn numeric_ids_are_stringified_and_float_tokens_kept() {
        let session = ChatSession::from_value(&json!({
            "session_id": 7,
            "user_id": "u-1",
            "session_total_tokens": 41.9,
            "chat_data": "not a list"
        }));

        assert_eq!(session.session_id, "7");
        assert_eq!(session.session_key, SessionKey::Number(7.0));
        assert_eq!(session.user_id, "u-1");
        assert_eq!(session.session_total_tokens, 41.9);
        assert!(session.turns.is_empty());
    }

    #[test]
    fn turn_keeps_negative_tokens_and_zeroes_non_numeric_ones() {
        let turn = ChatTurn::from_value(&json!({
            "input_tokens": -3,
            "output_tokens": "12",
            "total_tokens": 9,
            "timestamp": 1704099600
        }));

        assert_eq!(turn.input_tokens, -3.0);
        assert_eq!(turn.output_tokens, 0.0);
        assert_eq!(turn.total_tokens, 9.0);
        assert_eq!(turn.timestamp, "1704099600");
    }

    #[test]
    fn numeric_session_keys_order_by_value_before_text() {
        let nine = SessionKey::Number(9.0);
        let ten = SessionKey::Number(10.0);
        let text = SessionKey::Text("10".to_string());

        assert_eq!(nine.compare(&ten), Ordering::Less);
        assert_eq!(ten.compare(&text), Ordering::Less);
        assert_eq!(
            SessionKey::Text("10".to_string()).compare(&SessionKey::Text("9".to_string())),
            Ordering::Less
        );
    }

    #[test]
    fn document_without_chat_history_has_no_sessions() {
        assert!(Document::new("a.json", json!({"other": 1})).sessions().is_empty());
        assert!(Document::new("b.json", json!([1, 2, 3])).sessions().is_empty());
    }
}
