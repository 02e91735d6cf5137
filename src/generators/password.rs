//! Password generator with closed-form strength estimates.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::BuddyError;

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 128;
pub const MAX_PASSWORD_COUNT: usize = 1000;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
/// Characters that are easy to confuse when read or typed.
pub const AMBIGUOUS: &str = "0Oo1lI|";

/// Guesses per second assumed for the crack-time estimate.
const GUESSES_PER_SECOND: f64 = 1e10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PasswordOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
    pub exclude_ambiguous: bool,
    /// Replaces the default symbol set when `symbols` is enabled.
    pub custom_symbols: Option<String>,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: false,
            exclude_ambiguous: false,
            custom_symbols: None,
        }
    }
}

impl PasswordOptions {
    /// Union of every enabled character class, deduplicated, in class order.
    pub fn charset(&self) -> Vec<char> {
        let symbols = self.custom_symbols.as_deref().unwrap_or(SYMBOLS);
        let classes = [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.numbers, NUMBERS),
            (self.symbols, symbols),
        ];

        let mut out: Vec<char> = Vec::new();
        for c in classes
            .iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, set)| set.chars())
        {
            if self.exclude_ambiguous && AMBIGUOUS.contains(c) {
                continue;
            }
            if c.is_whitespace() || out.contains(&c) {
                continue;
            }
            out.push(c);
        }
        out
    }

    fn validate(&self) -> Result<Vec<char>, BuddyError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(BuddyError::InvalidInput(format!(
                "password length must be between {MIN_LENGTH} and {MAX_LENGTH}"
            )));
        }
        let charset = self.charset();
        if charset.is_empty() {
            return Err(BuddyError::InvalidInput(
                "at least one character class must be enabled".to_string(),
            ));
        }
        Ok(charset)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    VeryWeak,
    Weak,
    Fair,
    Strong,
    VeryStrong,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordStrength {
    pub entropy_bits: f64,
    pub level: StrengthLevel,
    pub crack_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPasswords {
    pub passwords: Vec<String>,
    pub charset_size: usize,
    pub strength: PasswordStrength,
}

/// Generate `count` passwords drawn uniformly from the configured charset.
pub fn generate_passwords<R: Rng>(
    rng: &mut R,
    options: &PasswordOptions,
    count: usize,
) -> Result<GeneratedPasswords, BuddyError> {
    if count == 0 || count > MAX_PASSWORD_COUNT {
        return Err(BuddyError::InvalidInput(format!(
            "count must be between 1 and {MAX_PASSWORD_COUNT}"
        )));
    }
    let charset = options.validate()?;

    let passwords = (0..count)
        .map(|_| sample(rng, &charset, options.length))
        .collect();

    Ok(GeneratedPasswords {
        passwords,
        charset_size: charset.len(),
        strength: estimate_strength(options.length, charset.len()),
    })
}

fn sample<R: Rng>(rng: &mut R, charset: &[char], length: usize) -> String {
    (0..length)
        .map(|_| charset[rng.random_range(0..charset.len())])
        .collect()
}

/// Entropy is `length * log2(charset_size)`; the crack time assumes half the
/// keyspace is searched on average.
pub fn estimate_strength(length: usize, charset_size: usize) -> PasswordStrength {
    let entropy_bits = if charset_size <= 1 {
        0.0
    } else {
        length as f64 * (charset_size as f64).log2()
    };
    let level = match entropy_bits {
        b if b < 28.0 => StrengthLevel::VeryWeak,
        b if b < 36.0 => StrengthLevel::Weak,
        b if b < 60.0 => StrengthLevel::Fair,
        b if b < 128.0 => StrengthLevel::Strong,
        _ => StrengthLevel::VeryStrong,
    };
    let seconds = 2f64.powf(entropy_bits) / 2.0 / GUESSES_PER_SECOND;

    PasswordStrength {
        entropy_bits: (entropy_bits * 100.0).round() / 100.0,
        level,
        crack_time: humanize_seconds(seconds),
    }
}

fn humanize_seconds(seconds: f64) -> String {
    const MINUTE: f64 = 60.0;
    const HOUR: f64 = 60.0 * MINUTE;
    const DAY: f64 = 24.0 * HOUR;
    const YEAR: f64 = 365.25 * DAY;
    const CENTURY: f64 = 100.0 * YEAR;

    if !seconds.is_finite() || seconds >= 1e6 * CENTURY {
        return "centuries+".to_string();
    }
    if seconds < 1.0 {
        return "instantly".to_string();
    }
    let (value, unit) = match seconds {
        s if s < MINUTE => (s, "seconds"),
        s if s < HOUR => (s / MINUTE, "minutes"),
        s if s < DAY => (s / HOUR, "hours"),
        s if s < YEAR => (s / DAY, "days"),
        s if s < CENTURY => (s / YEAR, "years"),
        s => (s / CENTURY, "centuries"),
    };
    format!("{} {unit}", value.floor() as u64)
}
