// In: src/events/display.rs

//! Opaque formatting payloads attached to notifications.
//!
//! The engine only builds these. Rendering belongs to whatever presentation
//! layer consumes the notification stream.

use schema::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledText {
    pub text: String,
    pub color: Color,
    pub bold: bool,
    pub dim: bool,
}

impl StyledText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::Default,
            bold: false,
            dim: false,
        }
    }
}

/// A template with `%1`, `%2`, ... placeholders and the styled text for each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayHint {
    template: String,
    replacements: BTreeMap<String, StyledText>,
}

impl DisplayHint {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn replacements(&self) -> &BTreeMap<String, StyledText> {
        &self.replacements
    }

    /// The hint as plain text: each placeholder replaced by its text, styling
    /// dropped. The template is scanned once, so replacement text is never
    /// searched for further placeholders. The longest `%N` with a replacement
    /// wins, and a `%` with none is kept as is.
    pub fn plain_text(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            let matched = (1..=digits).rev().find_map(|len| {
                self.replacements
                    .get(&rest[pos..pos + 1 + len])
                    .map(|styled| (len, styled))
            });
            match matched {
                Some((len, styled)) => {
                    out.push_str(&styled.text);
                    rest = &after[len..];
                }
                None => {
                    out.push('%');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// A hint with no placeholders.
    pub fn text(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            replacements: BTreeMap::new(),
        }
    }
}

/// Builds a `DisplayHint` by appending literal text and numbered placeholders.
#[derive(Debug, Default)]
pub struct DisplayHintBuilder {
    template: String,
    replacements: BTreeMap<String, StyledText>,
    next_placeholder: usize,
}

impl DisplayHintBuilder {
    pub fn new() -> Self {
        Self {
            next_placeholder: 1,
            ..Self::default()
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.template.push_str(text);
        self
    }

    pub fn styled(mut self, text: impl Into<String>, color: Color, bold: bool, dim: bool) -> Self {
        let key = format!("%{}", self.next_placeholder);
        self.next_placeholder += 1;
        self.template.push_str(&key);
        self.replacements.insert(
            key,
            StyledText {
                text: text.into(),
                color,
                bold,
                dim,
            },
        );
        self
    }

    pub fn character_name(self, name: &str, is_player: bool) -> Self {
        let color = if is_player { Color::Green } else { Color::Blue };
        self.styled(name, color, true, false)
    }

    pub fn damage_value(self, amount: u32) -> Self {
        self.styled(amount.to_string(), Color::Red, true, false)
    }

    pub fn heal_value(self, amount: u32) -> Self {
        self.styled(amount.to_string(), Color::Green, true, false)
    }

    pub fn energy_value(self, amount: u32) -> Self {
        self.styled(amount.to_string(), Color::Blue, true, false)
    }

    pub fn exp_value(self, amount: u32) -> Self {
        self.styled(amount.to_string(), Color::Yellow, true, false)
    }

    pub fn build(self) -> DisplayHint {
        DisplayHint {
            template: self.template,
            replacements: self.replacements,
        }
    }
}
