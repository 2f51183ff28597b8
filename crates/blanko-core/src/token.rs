//! Callback token codec.
//!
//! Menu buttons carry an opaque payload that must round-trip through the
//! chat frontend unchanged. Two token kinds exist: [`MenuToken`] encodes a
//! navigation target (depth level plus the selected category/document), and
//! [`FillToken`] marks the one-way transition from browsing into the fill
//! dialogue.
//!
//! Wire format is `<prefix>:<field>:...` with `0` standing in for an absent
//! field, so a menu payload always decodes to exactly three fields after the
//! prefix. Field values must not contain the separator character; the
//! catalog loader rejects such names and `encode` refuses them as well.

use crate::error::{BlankoError, Result};

const MENU_PREFIX: &str = "menu";
const FILL_PREFIX: &str = "fill";

/// Separator between payload fields. Category and document names must never
/// contain this character.
pub const TOKEN_SEPARATOR: char = ':';

/// Placeholder for an absent category/document field.
const EMPTY_FIELD: &str = "0";

/// Navigation target carried by a menu button.
///
/// Invariants, enforced by the constructors and re-checked on decode:
/// level 0 has neither category nor document, level 1 has only the
/// category, level 2 has both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuToken {
    pub level: u8,
    pub category: String,
    pub document: String,
}

impl MenuToken {
    /// Token for the main menu (level 0).
    pub fn main() -> Self {
        Self {
            level: 0,
            category: String::new(),
            document: String::new(),
        }
    }

    /// Token for a category's document list (level 1).
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            level: 1,
            category: category.into(),
            document: String::new(),
        }
    }

    /// Token for a single document's page (level 2).
    pub fn document(category: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            level: 2,
            category: category.into(),
            document: document.into(),
        }
    }

    /// Serializes the token into an opaque button payload.
    pub fn encode(&self) -> Result<String> {
        Ok(format!(
            "{}{sep}{}{sep}{}{sep}{}",
            MENU_PREFIX,
            self.level,
            wire_field(&self.category)?,
            wire_field(&self.document)?,
            sep = TOKEN_SEPARATOR,
        ))
    }

    fn from_fields(payload: &str, level: &str, category: &str, document: &str) -> Result<Self> {
        let level: u8 = level
            .parse()
            .map_err(|_| BlankoError::malformed_token(payload))?;

        let category = parse_field(category);
        let document = parse_field(document);

        // Depth and selection must agree; a mismatch means the payload was
        // not produced by this codec.
        let consistent = match level {
            0 => category.is_empty() && document.is_empty(),
            1 => !category.is_empty() && document.is_empty(),
            2 => !category.is_empty() && !document.is_empty(),
            _ => false,
        };
        if !consistent {
            return Err(BlankoError::malformed_token(payload));
        }

        Ok(Self {
            level,
            category: category.to_string(),
            document: document.to_string(),
        })
    }
}

/// Transition from browsing into the fill dialogue.
///
/// Only honored while the conversation has no active session; a duplicate
/// press while a fill is in progress stays inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillToken {
    pub category: String,
    pub document: String,
}

impl FillToken {
    pub fn new(category: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            document: document.into(),
        }
    }

    /// Serializes the token into an opaque button payload.
    pub fn encode(&self) -> Result<String> {
        Ok(format!(
            "{}{sep}{}{sep}{}",
            FILL_PREFIX,
            wire_field(&self.category)?,
            wire_field(&self.document)?,
            sep = TOKEN_SEPARATOR,
        ))
    }
}

/// A decoded button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Menu(MenuToken),
    Fill(FillToken),
}

impl Callback {
    /// Decodes an opaque button payload.
    ///
    /// Fails with [`BlankoError::MalformedToken`] on an unknown prefix,
    /// wrong field count, non-numeric or out-of-range level, or a payload
    /// whose fields disagree with its level.
    pub fn decode(payload: &str) -> Result<Self> {
        let parts: Vec<&str> = payload.split(TOKEN_SEPARATOR).collect();
        match parts.as_slice() {
            [MENU_PREFIX, level, category, document] => {
                MenuToken::from_fields(payload, level, category, document).map(Self::Menu)
            }
            [FILL_PREFIX, category, document] => {
                let category = parse_field(category);
                let document = parse_field(document);
                if category.is_empty() || document.is_empty() {
                    return Err(BlankoError::malformed_token(payload));
                }
                Ok(Self::Fill(FillToken::new(category, document)))
            }
            _ => Err(BlankoError::malformed_token(payload)),
        }
    }
}

fn wire_field(value: &str) -> Result<&str> {
    if value.contains(TOKEN_SEPARATOR) {
        return Err(BlankoError::malformed_token(value));
    }
    if value.is_empty() {
        Ok(EMPTY_FIELD)
    } else {
        Ok(value)
    }
}

fn parse_field(raw: &str) -> &str {
    if raw == EMPTY_FIELD {
        ""
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_tokens_round_trip_at_every_level() {
        let tokens = [
            MenuToken::main(),
            MenuToken::category("Category 2"),
            MenuToken::document("Category 2", "only_text"),
        ];

        for token in tokens {
            let payload = token.encode().unwrap();
            assert_eq!(Callback::decode(&payload).unwrap(), Callback::Menu(token));
        }
    }

    #[test]
    fn fill_token_round_trips() {
        let token = FillToken::new("Category 1", "diploma_cover");
        let payload = token.encode().unwrap();
        assert_eq!(payload, "fill:Category 1:diploma_cover");
        assert_eq!(Callback::decode(&payload).unwrap(), Callback::Fill(token));
    }

    #[test]
    fn distinct_tokens_encode_to_distinct_payloads() {
        let payloads = [
            MenuToken::main().encode().unwrap(),
            MenuToken::category("a").encode().unwrap(),
            MenuToken::document("a", "b").encode().unwrap(),
            FillToken::new("a", "b").encode().unwrap(),
        ];

        for (i, left) in payloads.iter().enumerate() {
            for right in payloads.iter().skip(i + 1) {
                assert_ne!(left, right);
            }
        }
    }

    #[test]
    fn decode_rejects_wrong_field_count() {
        for payload in ["menu", "menu:1", "menu:1:a", "menu:1:a:b:c", "fill:a", ""] {
            let err = Callback::decode(payload).unwrap_err();
            assert!(matches!(err, BlankoError::MalformedToken { .. }));
        }
    }

    #[test]
    fn decode_rejects_bad_level() {
        for payload in ["menu:x:a:0", "menu:3:a:b", "menu:-1:0:0"] {
            let err = Callback::decode(payload).unwrap_err();
            assert!(matches!(err, BlankoError::MalformedToken { .. }));
        }
    }

    #[test]
    fn decode_rejects_level_field_mismatch() {
        // Level 0 with a category, level 2 without a document.
        for payload in ["menu:0:a:0", "menu:2:a:0", "menu:1:0:b", "fill:0:b"] {
            let err = Callback::decode(payload).unwrap_err();
            assert!(matches!(err, BlankoError::MalformedToken { .. }));
        }
    }

    #[test]
    fn encode_rejects_separator_in_fields() {
        let err = MenuToken::category("a:b").encode().unwrap_err();
        assert!(matches!(err, BlankoError::MalformedToken { .. }));

        let err = FillToken::new("a", "b:c").encode().unwrap_err();
        assert!(matches!(err, BlankoError::MalformedToken { .. }));
    }
}
