use serde::{Deserialize, Serialize};

/// Outcome marker carried by every JSON response.
///
/// `Error` is a request or validation problem; `Fail` is an
/// operation-specific failure whose details live in `data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Success,
    Error,
    Fail,
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResultKind::Success => "success",
            ResultKind::Error => "error",
            ResultKind::Fail => "fail",
        };
        f.write_str(s)
    }
}

/// Error returned when reading the payload of an envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("envelope has no data")]
    MissingData,
}

/// Envelope for all JSON responses.
///
/// `data` is kept as a `RawValue` so each endpoint decides its own type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub result: ResultKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<serde_json::value::RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<serde_json::Value>,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.result == ResultKind::Success
    }

    /// Deserializes `data` into the given type.
    pub fn parse_data<T: for<'de> Deserialize<'de>>(&self) -> Result<Option<T>, serde_json::Error> {
        match &self.data {
            Some(raw) => Ok(Some(serde_json::from_str(raw.get())?)),
            None => Ok(None),
        }
    }

    /// Like [`parse_data`](Self::parse_data) but treats a missing payload as an error.
    pub fn require_data<T: for<'de> Deserialize<'de>>(&self) -> Result<T, EnvelopeError> {
        self.parse_data()?.ok_or(EnvelopeError::MissingData)
    }

    /// Human-readable failure description.
    ///
    /// `error` envelopes carry it in `message`, `fail` envelopes in `data`.
    /// Lists of strings are joined with `", "`.
    pub fn failure_message(&self) -> String {
        let value = match self.result {
            ResultKind::Fail => self
                .data
                .as_ref()
                .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw.get()).ok())
                .or_else(|| self.message.clone()),
            _ => self.message.clone(),
        };
        value.map(|v| render_message(&v)).unwrap_or_default()
    }
}

fn render_message(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(render_message)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
