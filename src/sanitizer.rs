// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Free-text sanitization for submitted form fields.
//!
//! This is deliberately light: angle brackets are dropped so nothing renders
//! as markup when the rows are opened in a spreadsheet or an e-mail client,
//! whitespace is trimmed and the length is capped. It is not an HTML sanitizer.

use crate::config::SanitizerConfig;

/// Field sanitizer with a fixed maximum length.
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer {
    max_len: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(SanitizerConfig::default().max_field_length)
    }
}

impl From<&SanitizerConfig> for Sanitizer {
    fn from(config: &SanitizerConfig) -> Self {
        Self::new(config.max_field_length)
    }
}

impl Sanitizer {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Clean an optional field. Absent input yields an empty string.
    ///
    /// The output has no `<` or `>`, no surrounding whitespace and at most
    /// `max_len` characters, so cleaning it again leaves it unchanged.
    pub fn clean(&self, input: Option<&str>) -> String {
        let Some(input) = input else {
            return String::new();
        };

        let stripped: String = input.chars().filter(|c| !matches!(c, '<' | '>')).collect();
        let trimmed = stripped.trim();

        match trimmed.char_indices().nth(self.max_len) {
            // Cutting can expose whitespace at the new end
            Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
            None => trimmed.to_string(),
        }
    }

    /// Clean an e-mail address, lower-casing it first.
    pub fn clean_email(&self, input: Option<&str>) -> String {
        self.clean(input.map(str::to_lowercase).as_deref())
    }
}
