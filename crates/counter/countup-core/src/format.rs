//! Text rendering of counter values for the host page.
//!
//! Not part of the animator: counters hand out already-rounded numbers, and this
//! module turns them into strings like `12,000+` or `4.9 ★`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayFormat {
    /// Fixed number of fractional digits to print.
    pub decimals: u32,
    /// Insert `,` between groups of three integer digits.
    pub grouping: bool,
    pub prefix: String,
    pub suffix: String,
}

impl DisplayFormat {
    pub fn new(decimals: u32) -> Self {
        Self {
            decimals,
            ..Self::default()
        }
    }

    pub fn grouped(mut self) -> Self {
        self.grouping = true;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn format(&self, value: f64) -> String {
        let body = format!("{:.*}", self.decimals as usize, value);
        // `-0.04` at one decimal prints as `-0.0`.
        let body = match body.strip_prefix('-') {
            Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
            _ => body,
        };
        let body = if self.grouping {
            group_thousands(&body)
        } else {
            body
        };
        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

/// Insert `,` separators into the integer part of a plain decimal string.
fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };
    if !int_part.bytes().all(|b| b.is_ascii_digit()) {
        // inf / NaN
        return text.to_string();
    }
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}{frac_part}")
}
