//! Packed 8-bit binary payload validation and decoding.
//!
//! A scanned payload is a run of `'0'` / `'1'` characters, optionally broken
//! up by whitespace, where every consecutive group of eight bits encodes one
//! character by code point. Whitespace anywhere in the input (not only at the
//! ends) is ignored by both [`validate`] and [`decode`].

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// Number of bits that encode one character.
pub const BITS_PER_CHAR: usize = 8;

// ---------------------------------------------------------------------------
// Decoded payload
// ---------------------------------------------------------------------------

/// Human-readable text recovered from a validated scan.
///
/// Only the decoder can construct this type, so holding one proves the
/// underlying scan passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecodedText(String);

impl DecodedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DecodedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of validating and decoding a single raw scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedPayload {
    Valid(DecodedText),
    /// The scan failed validation; carries a reason suitable for display.
    Invalid(String),
}

impl DecodedPayload {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Convert into a `Result`, mapping `Invalid` to [`CoreError::InvalidPayload`].
    pub fn into_result(self) -> Result<DecodedText, CoreError> {
        match self {
            Self::Valid(text) => Ok(text),
            Self::Invalid(reason) => Err(CoreError::InvalidPayload(reason)),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Returns `true` iff `raw`, with all whitespace removed, is non-empty,
/// consists only of `'0'` and `'1'`, and has a length divisible by eight.
pub fn validate(raw: &str) -> bool {
    check(raw).is_ok()
}

/// Validate and decode in one step.
pub fn inspect(raw: &str) -> DecodedPayload {
    match check(raw) {
        Ok(cleaned) => DecodedPayload::Valid(DecodedText(decode_groups(&cleaned))),
        Err(reason) => DecodedPayload::Invalid(reason),
    }
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Returns the cleaned bit string, or a reason why it is not a payload.
fn check(raw: &str) -> Result<String, String> {
    let cleaned = strip_whitespace(raw);

    if cleaned.is_empty() {
        return Err("Payload is empty".to_string());
    }

    if let Some((pos, c)) = cleaned
        .chars()
        .enumerate()
        .find(|(_, c)| *c != '0' && *c != '1')
    {
        return Err(format!(
            "Payload contains non-binary character {c:?} at position {pos}"
        ));
    }

    // Only ASCII digits remain, so byte length equals character count.
    if cleaned.len() % BITS_PER_CHAR != 0 {
        return Err(format!(
            "Payload length {} is not a multiple of {BITS_PER_CHAR}",
            cleaned.len()
        ));
    }

    Ok(cleaned)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a validated payload into text.
///
/// The caller must have checked the same input with [`validate`]. Calling
/// this on unvalidated input is a programming error; use [`try_decode`] or
/// [`inspect`] when the input has not been checked.
pub fn decode(raw: &str) -> String {
    debug_assert!(validate(raw), "decode called on input that failed validation");
    decode_groups(&strip_whitespace(raw))
}

/// Checked form of [`decode`].
pub fn try_decode(raw: &str) -> Result<String, CoreError> {
    let cleaned = check(raw).map_err(CoreError::UnexpectedDecoderInput)?;
    Ok(decode_groups(&cleaned))
}

fn decode_groups(cleaned: &str) -> String {
    cleaned
        .as_bytes()
        .chunks(BITS_PER_CHAR)
        .map(|group| {
            std::str::from_utf8(group)
                .ok()
                .and_then(|bits| u8::from_str_radix(bits, 2).ok())
                .map(char::from)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `text` as space-separated 8-bit groups, the inverse of [`decode`].
///
/// Fails for characters whose code point does not fit in eight bits.
pub fn encode(text: &str) -> Result<String, CoreError> {
    let mut groups = Vec::with_capacity(text.len());
    for c in text.chars() {
        let code = u8::try_from(u32::from(c)).map_err(|_| {
            CoreError::Validation(format!(
                "Character {c:?} cannot be encoded in {BITS_PER_CHAR} bits"
            ))
        })?;
        groups.push(format!("{code:08b}"));
    }
    Ok(groups.join(" "))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
