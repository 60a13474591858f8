#![forbid(unsafe_code)]

//! JSON bridge for browser keyboard events.
//!
//! A JS host forwards `keydown` / `keyup` listeners on `document` as small
//! JSON objects:
//!
//! ```json
//! {"type": "keydown", "code": "KeyA", "key": "a", "repeat": false}
//! ```
//!
//! [`parse_dom_key_event`] turns one of those into a [`RawKeyEvent`] that can
//! be fed to [`InputHub::dispatch`](crate::source::InputHub::dispatch) or
//! [`KeyRecorder::handle`](crate::recorder::KeyRecorder::handle).
//!
//! `code` identifies the physical key. Some browsers and virtual keyboards
//! leave it empty, in which case `key` is used instead. `repeat` and any other
//! field is ignored; the recorder suppresses repeated key-downs itself.

use serde::Deserialize;

use crate::event::RawKeyEvent;

/// Errors from parsing an encoded browser key event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomInputError {
    /// Malformed JSON.
    #[error("JSON parse error: {0}")]
    Json(String),
    /// Neither `code` nor `key` carried a key identity.
    #[error("key event has no code or key")]
    MissingKey,
}

#[derive(Debug, Deserialize)]
struct RawDomKey {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    key: Option<String>,
}

/// Parse one JSON-encoded `KeyboardEvent`.
///
/// Returns `Ok(None)` for event types other than `keydown` / `keyup`
/// (`keypress`, composition events, ...).
///
/// ```
/// use rtkeys_core::dom_input::parse_dom_key_event;
/// use rtkeys_core::event::RawKeyEvent;
///
/// let event = parse_dom_key_event(r#"{"type":"keyup","code":"Space"}"#).unwrap();
/// assert_eq!(event, Some(RawKeyEvent::up("Space")));
/// ```
pub fn parse_dom_key_event(json: &str) -> Result<Option<RawKeyEvent>, DomInputError> {
    let raw: RawDomKey =
        serde_json::from_str(json).map_err(|e| DomInputError::Json(e.to_string()))?;

    let is_down = match raw.kind.as_str() {
        "keydown" => true,
        "keyup" => false,
        _ => return Ok(None),
    };

    let code = [raw.code, raw.key]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .ok_or(DomInputError::MissingKey)?;

    Ok(Some(if is_down {
        RawKeyEvent::Down { code }
    } else {
        RawKeyEvent::Up { code }
    }))
}
