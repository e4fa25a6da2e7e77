use crate::stimulus::ResponseKey;

/// Normalized keyboard key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    /// Printable key, always lowercase
    Char(char),
    Other(String),
}

impl Key {
    /// Normalizes a textual key identifier such as `" "`, `"ArrowLeft"` or `"B"`.
    pub fn from_identifier(id: &str) -> Self {
        if id == " " {
            return Key::Space;
        }
        match id.to_ascii_lowercase().as_str() {
            "space" | "spacebar" => Key::Space,
            "arrowleft" | "left" => Key::ArrowLeft,
            "arrowright" | "right" => Key::ArrowRight,
            lower => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(id.to_string()),
                }
            }
        }
    }

    pub fn from_char(c: char) -> Self {
        if c == ' ' {
            Key::Space
        } else {
            Key::Char(c.to_ascii_lowercase())
        }
    }

    /// Accepted response, if this is one of the two response keys
    pub fn response(&self) -> Option<ResponseKey> {
        match self {
            Key::Char(c) => ResponseKey::from_char(*c),
            _ => None,
        }
    }
}

/// Key press stamped by the input layer with the session timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub timestamp_ns: u64,
}

impl KeyEvent {
    pub fn new(key: Key, timestamp_ns: u64) -> Self {
        Self { key, timestamp_ns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_normalize() {
        assert_eq!(Key::from_identifier(" "), Key::Space);
        assert_eq!(Key::from_identifier("ArrowLeft"), Key::ArrowLeft);
        assert_eq!(Key::from_identifier("ArrowRight"), Key::ArrowRight);
        assert_eq!(Key::from_identifier("B"), Key::Char('b'));
        assert_eq!(Key::from_identifier("Shift"), Key::Other("Shift".into()));
    }

    #[test]
    fn only_b_and_n_are_responses() {
        assert_eq!(Key::Char('b').response(), Some(ResponseKey::Left));
        assert_eq!(Key::from_identifier("N").response(), Some(ResponseKey::Right));
        assert_eq!(Key::Space.response(), None);
        assert_eq!(Key::Char('q').response(), None);
    }
}
