//! Text and kanji utilities: character statistics, random strings of a
//! given script, exact-length repetition, width conversion and base64.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::BuddyError;

/// Upper bound, in chars, for generated or repeated text.
pub const MAX_TEXT_LENGTH: usize = 1_000_000;

const KANJI: &str = "一二三四五六七八九十百千万円年月日時分今何先生学校人名前山川田本中大小上下左右\
    手足目口耳花草木森林空雨天気電車道店駅社会国語数理科音楽図書工作体育家族父母兄弟姉妹友達\
    朝昼夜春夏秋冬東西南北海魚鳥犬猫牛馬米茶肉食飲行来見聞話読書言思知考答問題試験合格";
const ALPHANUMERIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const EMOJI: &[char] = &['😀', '😂', '🥺', '👍', '🎉', '🍣', '🗾', '🚀', '✨', '🐱'];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    Kanji,
    Hiragana,
    Katakana,
    Alphanumeric,
    /// Printable ASCII, space through tilde.
    Ascii,
    /// Full-width forms of printable ASCII.
    FullWidth,
    Emoji,
    /// Any of the classes above.
    Mixed,
}

impl CharClass {
    fn pool(self) -> Vec<char> {
        match self {
            CharClass::Kanji => KANJI.chars().collect(),
            CharClass::Hiragana => ('\u{3041}'..='\u{3093}').collect(),
            CharClass::Katakana => ('\u{30A1}'..='\u{30F3}').collect(),
            CharClass::Alphanumeric => ALPHANUMERIC.chars().collect(),
            CharClass::Ascii => (' '..='~').collect(),
            CharClass::FullWidth => ('\u{FF01}'..='\u{FF5E}').collect(),
            CharClass::Emoji => EMOJI.to_vec(),
            CharClass::Mixed => [
                CharClass::Kanji,
                CharClass::Hiragana,
                CharClass::Katakana,
                CharClass::Alphanumeric,
                CharClass::Emoji,
            ]
            .into_iter()
            .flat_map(CharClass::pool)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub chars: usize,
    pub bytes: usize,
    pub lines: usize,
    pub words: usize,
    pub kanji: usize,
    pub hiragana: usize,
    pub katakana: usize,
    pub ascii_letters: usize,
    pub digits: usize,
    pub whitespace: usize,
    pub full_width: usize,
}

pub fn is_kanji(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '々')
}

pub fn text_stats(text: &str) -> TextStats {
    let mut stats = TextStats {
        bytes: text.len(),
        lines: if text.is_empty() {
            0
        } else {
            text.split('\n').count()
        },
        words: text.split_whitespace().count(),
        ..TextStats::default()
    };
    for c in text.chars() {
        stats.chars += 1;
        match c {
            c if is_kanji(c) => stats.kanji += 1,
            '\u{3041}'..='\u{309F}' => stats.hiragana += 1,
            '\u{30A0}'..='\u{30FF}' => stats.katakana += 1,
            c if c.is_ascii_alphabetic() => stats.ascii_letters += 1,
            c if c.is_ascii_digit() => stats.digits += 1,
            c if c.is_whitespace() => stats.whitespace += 1,
            _ => {}
        }
        if matches!(c, '\u{FF01}'..='\u{FF60}' | '\u{FFE0}'..='\u{FFE6}' | '\u{3000}') {
            stats.full_width += 1;
        }
    }
    stats
}

fn check_length(length: usize) -> Result<(), BuddyError> {
    if length == 0 || length > MAX_TEXT_LENGTH {
        return Err(BuddyError::InvalidInput(format!(
            "length must be between 1 and {MAX_TEXT_LENGTH}"
        )));
    }
    Ok(())
}

/// Random string of exactly `length` chars drawn from `class`.
pub fn generate_text<R: Rng>(
    rng: &mut R,
    class: CharClass,
    length: usize,
) -> Result<String, BuddyError> {
    check_length(length)?;
    let pool = class.pool();
    Ok((0..length)
        .map(|_| pool[rng.random_range(0..pool.len())])
        .collect())
}

/// `unit` repeated and cut to exactly `length` chars.
pub fn repeat_text(unit: &str, length: usize) -> Result<String, BuddyError> {
    check_length(length)?;
    if unit.is_empty() {
        return Err(BuddyError::InvalidInput("unit must not be empty".into()));
    }
    Ok(unit.chars().cycle().take(length).collect())
}

pub fn to_full_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' ' => '\u{3000}',
            '!'..='~' => char::from_u32(c as u32 + 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

pub fn to_half_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

pub fn base64_encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

pub fn base64_decode(encoded: &str) -> Result<String, BuddyError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| BuddyError::InvalidInput(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|_| BuddyError::InvalidInput("decoded data is not UTF-8".into()))
}
