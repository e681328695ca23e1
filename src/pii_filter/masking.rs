// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Mask applier and replacement suggestions

use aho_corasick::{AhoCorasick, MatchKind};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use uuid::Uuid;

use super::config::{EntityKind, MaskMode, MaskingConfig, ReplacementAction};
use super::mapping::{EditMapping, PiiMapping};
use crate::error::{PipelineError, PipelineResult};

/// Apply an edit mapping to the normalized text.
///
/// In `Sequential` mode each pair rewrites the output of the pairs before
/// it, so `{"A": "B", "B": "C"}` turns `"A B"` into `"C C"`. `SinglePass`
/// matches every original against the untouched text (leftmost-longest)
/// and gives `"B C"`. Empty originals are skipped in both modes; when
/// nothing is replaced the input is returned borrowed.
pub fn apply_mask<'a>(
    text: &'a str,
    edits: &EditMapping,
    mode: MaskMode,
) -> PipelineResult<Cow<'a, str>> {
    match mode {
        MaskMode::Sequential => Ok(apply_sequential(text, edits)),
        MaskMode::SinglePass => apply_single_pass(text, edits),
    }
}

fn apply_sequential<'a>(text: &'a str, edits: &EditMapping) -> Cow<'a, str> {
    let mut current = Cow::Borrowed(text);

    for (original, replacement) in edits.iter() {
        if original.is_empty() || !current.contains(original) {
            continue;
        }
        current = Cow::Owned(current.replace(original, replacement));
    }

    current
}

fn apply_single_pass<'a>(text: &'a str, edits: &EditMapping) -> PipelineResult<Cow<'a, str>> {
    let (originals, replacements): (Vec<&str>, Vec<&str>) = edits
        .iter()
        .filter(|(original, _)| !original.is_empty())
        .map(|(original, replacement)| (original, replacement.as_str()))
        .unzip();

    if originals.is_empty() {
        return Ok(Cow::Borrowed(text));
    }

    let automaton = AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(&originals)
        .map_err(|e| PipelineError::Mask(e.to_string()))?;

    if !automaton.is_match(text) {
        return Ok(Cow::Borrowed(text));
    }

    Ok(Cow::Owned(automaton.replace_all(text, &replacements)))
}

/// Propose a replacement for every detected literal using one action
pub fn suggest_edits(
    pii_list: &PiiMapping,
    action: ReplacementAction,
    config: &MaskingConfig,
) -> EditMapping {
    pii_list
        .iter()
        .map(|(literal, kind)| (literal, replacement_for(literal, *kind, action, config)))
        .collect()
}

/// Replacement text for a single literal
pub fn replacement_for(
    value: &str,
    kind: EntityKind,
    action: ReplacementAction,
    config: &MaskingConfig,
) -> String {
    match action {
        ReplacementAction::Redact => "*".repeat(value.chars().count()),
        ReplacementAction::Delete => " ".repeat(value.chars().count()),
        ReplacementAction::Mask => config.mask_text.clone(),
        ReplacementAction::Partial => partial_mask(value, kind),
        ReplacementAction::Hash => hash_mask(value),
        ReplacementAction::Tokenize => tokenize_mask(),
        ReplacementAction::Remove => String::new(),
    }
}

/// Last `n` ASCII digits of a value, if it has that many
fn last_digits(value: &str, n: usize) -> Option<String> {
    let digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() >= n).then(|| digits[digits.len() - n..].iter().collect())
}

/// Partial masking - show first/last characters based on entity kind
fn partial_mask(value: &str, kind: EntityKind) -> String {
    match kind {
        EntityKind::Ssn => match last_digits(value, 4) {
            // Show last 4 digits: ***-**-1234
            Some(tail) => format!("***-**-{tail}"),
            None => "***-**-****".to_string(),
        },

        EntityKind::CreditCard => match last_digits(value, 4) {
            Some(tail) => format!("****-****-****-{tail}"),
            None => "****-****-****-****".to_string(),
        },

        EntityKind::PhoneNumber => match last_digits(value, 4) {
            Some(tail) => format!("***-***-{tail}"),
            None => "***-***-****".to_string(),
        },

        EntityKind::AadhaarNumber => match last_digits(value, 4) {
            Some(tail) => format!("XXXX XXXX {tail}"),
            None => "XXXX XXXX XXXX".to_string(),
        },

        EntityKind::EmailAddress => {
            // Show first + last char before @: j***e@example.com
            match value.split_once('@') {
                Some((local, domain)) => {
                    let chars: Vec<char> = local.chars().collect();
                    if chars.len() > 2 {
                        format!("{}***{}@{}", chars[0], chars[chars.len() - 1], domain)
                    } else {
                        format!("***@{domain}")
                    }
                }
                None => generic_partial(value),
            }
        }

        EntityKind::IbanCode => {
            // Country code and last 4: GB****************5432
            let chars: Vec<char> = value.chars().filter(|c| !c.is_whitespace()).collect();
            if chars.len() > 6 {
                let head: String = chars[..2].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{head}{}{tail}", "*".repeat(chars.len() - 6))
            } else {
                generic_partial(value)
            }
        }

        _ => generic_partial(value),
    }
}

/// First + last char with the middle starred
fn generic_partial(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 => "*".to_string(),
        2 => format!("{}*", chars[0]),
        n => format!("{}{}{}", chars[0], "*".repeat(n - 2), chars[n - 1]),
    }
}

/// Hash masking using SHA256
fn hash_mask(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("[HASH:{}]", &format!("{:x}", result)[..8])
}

/// Tokenize using UUID v4
fn tokenize_mask() -> String {
    let token = Uuid::new_v4();
    format!("[TOKEN:{}]", &token.simple().to_string()[..8])
}
