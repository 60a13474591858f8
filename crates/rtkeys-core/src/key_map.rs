#![forbid(unsafe_code)]

//! Canonical key-name resolution.
//!
//! Hosts report physical key identifiers (`KeyboardEvent.code` in browsers:
//! `KeyA`, `ArrowLeft`, `Numpad3`, ...). Experiment scripts filter on a
//! layout-independent canonical vocabulary instead (`a`, `left`, `num_3`).
//! [`KeyNameResolver`] is the seam between the two; [`DomKeyMap`] is the
//! default table.
//!
//! Resolution never fails. Codes with no canonical name map to
//! [`UNKNOWN_KEY_NAME`] and are still recorded.

use std::borrow::Cow;

/// Canonical name assigned to codes the resolver does not recognise.
pub const UNKNOWN_KEY_NAME: &str = "N/A";

/// Translates a physical key code into its canonical name.
pub trait KeyNameResolver {
    /// Resolve `code`. Must be pure: the same code always yields the same name.
    fn resolve(&self, code: &str) -> Cow<'static, str>;
}

impl<F> KeyNameResolver for F
where
    F: Fn(&str) -> String,
{
    fn resolve(&self, code: &str) -> Cow<'static, str> {
        Cow::Owned(self(code))
    }
}

/// Fixed `(code, name)` pairs that cannot be derived from a prefix rule.
const NAMED_KEYS: &[(&str, &str)] = &[
    ("Space", "space"),
    ("Enter", "return"),
    ("Escape", "escape"),
    ("Backspace", "backspace"),
    ("Tab", "tab"),
    ("CapsLock", "capslock"),
    ("Delete", "delete"),
    ("Insert", "insert"),
    ("Home", "home"),
    ("End", "end"),
    ("PageUp", "pageup"),
    ("PageDown", "pagedown"),
    ("ArrowUp", "up"),
    ("ArrowDown", "down"),
    ("ArrowLeft", "left"),
    ("ArrowRight", "right"),
    ("ShiftLeft", "lshift"),
    ("ShiftRight", "rshift"),
    ("ControlLeft", "lctrl"),
    ("ControlRight", "rctrl"),
    ("AltLeft", "lalt"),
    ("AltRight", "ralt"),
    ("MetaLeft", "lmeta"),
    ("MetaRight", "rmeta"),
    ("ContextMenu", "menu"),
    ("Backquote", "grave"),
    ("Minus", "minus"),
    ("Equal", "equal"),
    ("BracketLeft", "bracketleft"),
    ("BracketRight", "bracketright"),
    ("Backslash", "backslash"),
    ("IntlBackslash", "backslash"),
    ("Semicolon", "semicolon"),
    ("Quote", "apostrophe"),
    ("Comma", "comma"),
    ("Period", "period"),
    ("Slash", "slash"),
    ("NumLock", "num_lock"),
    ("NumpadAdd", "num_add"),
    ("NumpadSubtract", "num_subtract"),
    ("NumpadMultiply", "num_multiply"),
    ("NumpadDivide", "num_divide"),
    ("NumpadDecimal", "num_decimal"),
    ("NumpadEnter", "num_enter"),
    ("NumpadEqual", "num_equal"),
    ("PrintScreen", "print"),
    ("ScrollLock", "scrolllock"),
    ("Pause", "pause"),
];

/// Maps W3C `KeyboardEvent.code` values to canonical key names.
///
/// ```
/// use rtkeys_core::key_map::{DomKeyMap, KeyNameResolver, UNKNOWN_KEY_NAME};
///
/// let map = DomKeyMap;
/// assert_eq!(map.resolve("KeyQ"), "q");
/// assert_eq!(map.resolve("Numpad7"), "num_7");
/// assert_eq!(map.resolve("ArrowLeft"), "left");
/// assert_eq!(map.resolve("LaunchMail"), UNKNOWN_KEY_NAME);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DomKeyMap;

impl DomKeyMap {
    /// Reverse lookup: the W3C code that produces `name`, if any.
    ///
    /// Names shared by several codes (`backslash`) return the first entry.
    #[must_use]
    pub fn code_for(&self, name: &str) -> Option<Cow<'static, str>> {
        if let Some(&(code, _)) = NAMED_KEYS.iter().find(|(_, n)| *n == name) {
            return Some(Cow::Borrowed(code));
        }

        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_lowercase() {
                return Some(Cow::Owned(format!("Key{}", c.to_ascii_uppercase())));
            }
            if c.is_ascii_digit() {
                return Some(Cow::Owned(format!("Digit{c}")));
            }
        }

        if let Some(tail) = name.strip_prefix("num_")
            && is_single_digit(tail)
        {
            return Some(Cow::Owned(format!("Numpad{tail}")));
        }

        if let Some(n) = name.strip_prefix('f').and_then(parse_function_index) {
            return Some(Cow::Owned(format!("F{n}")));
        }

        None
    }
}

impl KeyNameResolver for DomKeyMap {
    fn resolve(&self, code: &str) -> Cow<'static, str> {
        if let Some(&(_, name)) = NAMED_KEYS.iter().find(|(c, _)| *c == code) {
            return Cow::Borrowed(name);
        }

        // KeyA..KeyZ
        if let Some(tail) = code.strip_prefix("Key") {
            let mut chars = tail.chars();
            if let (Some(c), None) = (chars.next(), chars.next())
                && c.is_ascii_alphabetic()
            {
                return Cow::Owned(c.to_ascii_lowercase().to_string());
            }
        }

        // Digit0..Digit9
        if let Some(tail) = code.strip_prefix("Digit")
            && is_single_digit(tail)
        {
            return Cow::Owned(tail.to_owned());
        }

        // Numpad0..Numpad9
        if let Some(tail) = code.strip_prefix("Numpad")
            && is_single_digit(tail)
        {
            return Cow::Owned(format!("num_{tail}"));
        }

        // F1..F24
        if let Some(n) = code.strip_prefix('F').and_then(parse_function_index) {
            return Cow::Owned(format!("f{n}"));
        }

        Cow::Borrowed(UNKNOWN_KEY_NAME)
    }
}

fn is_single_digit(s: &str) -> bool {
    s.len() == 1 && s.as_bytes()[0].is_ascii_digit()
}

fn parse_function_index(s: &str) -> Option<u8> {
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u8>().ok().filter(|n| (1..=24).contains(n))
}
