//! Skill tag names.
//!
//! Tags are free text typed by users, so the same skill arrives as
//! `"rust"`, `" Rust "` and `"RUST"`. Everything is folded to one canonical
//! spelling before it touches the `skills` table, whose unique index on
//! `name` then does the deduplication.

use std::fmt;

use thiserror::Error;

pub const MAX_SKILL_NAME_LEN: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkillNameError {
    #[error("Skill names can only contain letters, numbers and spaces")]
    InvalidCharacters,
    #[error("Skill names can be at most {} characters", MAX_SKILL_NAME_LEN)]
    TooLong,
}

/// A normalized skill name: trimmed, title-cased, letters digits and spaces only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SkillName(String);

impl SkillName {
    pub fn parse(raw: &str) -> Result<Self, SkillNameError> {
        let name = title_case(raw.trim());
        let mut compact = name.chars().filter(|c| *c != ' ').peekable();
        if compact.peek().is_none() || !compact.all(char::is_alphanumeric) {
            return Err(SkillNameError::InvalidCharacters);
        }
        if name.chars().count() > MAX_SKILL_NAME_LEN {
            return Err(SkillNameError::TooLong);
        }
        Ok(SkillName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Title-cases the first cased character of every run of cased characters and
// lower-cases the rest, so digits start a new word: "3d" -> "3D".
fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_cased = false;
    for c in input.chars() {
        let cased = c.is_lowercase() || c.is_uppercase() || is_titlecase(c);
        if cased && !previous_cased {
            push_titlecase(&mut out, c);
        } else if cased {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        previous_cased = cased;
    }
    out
}

// Unicode general category Lt.
fn is_titlecase(c: char) -> bool {
    matches!(
        c,
        '\u{01C5}' | '\u{01C8}' | '\u{01CB}' | '\u{01F2}'
            | '\u{1F88}'..='\u{1F8F}'
            | '\u{1F98}'..='\u{1F9F}'
            | '\u{1FA8}'..='\u{1FAF}'
            | '\u{1FBC}' | '\u{1FCC}' | '\u{1FFC}'
    )
}

// std only exposes upper and lower case mappings. The characters whose
// titlecase differs from their uppercase are few enough to list here; the
// composite Greek forms with accents fall back to uppercase.
fn push_titlecase(out: &mut String, c: char) {
    let code = c as u32;
    match c {
        '\u{01C4}'..='\u{01C6}' => out.push('\u{01C5}'),
        '\u{01C7}'..='\u{01C9}' => out.push('\u{01C8}'),
        '\u{01CA}'..='\u{01CC}' => out.push('\u{01CB}'),
        '\u{01F1}'..='\u{01F3}' => out.push('\u{01F2}'),
        'ß' => out.push_str("Ss"),
        'ﬀ' => out.push_str("Ff"),
        'ﬁ' => out.push_str("Fi"),
        'ﬂ' => out.push_str("Fl"),
        'ﬃ' => out.push_str("Ffi"),
        'ﬄ' => out.push_str("Ffl"),
        'ﬅ' | 'ﬆ' => out.push_str("St"),
        'և' => out.push_str("Եւ"),
        'ﬓ' => out.push_str("Մն"),
        'ﬔ' => out.push_str("Մե"),
        'ﬕ' => out.push_str("Մի"),
        'ﬖ' => out.push_str("Վն"),
        'ﬗ' => out.push_str("Մխ"),
        // Greek with ypogegrammeni: the titlecase form is the one with prosgegrammeni
        '\u{1F80}'..='\u{1F87}' | '\u{1F90}'..='\u{1F97}' | '\u{1FA0}'..='\u{1FA7}' => {
            out.extend(char::from_u32(code + 8))
        }
        '\u{1FB3}' => out.push('\u{1FBC}'),
        '\u{1FC3}' => out.push('\u{1FCC}'),
        '\u{1FF3}' => out.push('\u{1FFC}'),
        c if is_titlecase(c) => out.push(c),
        c => out.extend(c.to_uppercase()),
    }
}
