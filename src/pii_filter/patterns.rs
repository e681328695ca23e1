// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Regex pattern compilation for PII detection
// Uses RegexSet to select which patterns need a full scan

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder, RegexSet};

use super::config::{DetectionConfig, EntityKind};

/// Extra check a raw match must pass (checksums, digit presence)
pub type Validator = fn(&str) -> bool;

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub kind: EntityKind,
    pub regex: Regex,
    pub validator: Option<Validator>,
    #[allow(dead_code)]
    pub description: String,
}

/// All compiled patterns with RegexSet for parallel matching
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub regex_set: RegexSet,
    pub patterns: Vec<CompiledPattern>,
    pub allow_list: Vec<Regex>,
}

/// Pattern definitions (pattern, description, case insensitive).
/// Capture group 1, when present, marks the reported value.
type PatternDef = (String, &'static str, bool);

fn def(pattern: &str, description: &'static str, case_insensitive: bool) -> PatternDef {
    (pattern.to_string(), description, case_insensitive)
}

const GIVEN_NAMES: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph", "Thomas",
    "Charles", "Christopher", "Daniel", "Matthew", "Anthony", "Mark", "Paul", "Steven",
    "Andrew", "Kevin", "Brian", "George", "Edward", "Peter", "Henry", "Jack", "Mary",
    "Patricia", "Jennifer", "Linda", "Elizabeth", "Barbara", "Susan", "Jessica", "Sarah",
    "Karen", "Nancy", "Lisa", "Emily", "Emma", "Olivia", "Sophia", "Anna", "Maria", "Laura",
    "Alice", "Jane", "Rachel", "Priya", "Rahul", "Amit", "Anjali", "Arjun", "Ravi", "Neha",
    "Wei", "Li", "Hiroshi", "Yuki", "Mohammed", "Ahmed", "Fatima", "Omar", "Carlos", "Juan",
    "Luis", "Ana", "Pierre", "Hans",
];

const GEO_POLITICAL: &[&str] = &[
    "United States", "USA", "United Kingdom", "UK", "India", "China", "Japan", "Germany",
    "France", "Canada", "Australia", "Singapore", "Malaysia", "Brazil", "Mexico", "Russia",
    "Italy", "Spain", "Netherlands", "Ireland", "New Zealand", "South Africa",
    "United Arab Emirates", "New York", "London", "Paris", "Tokyo", "Berlin", "Mumbai",
    "New Delhi", "Delhi", "Bangalore", "Bengaluru", "Chennai", "Beijing", "Shanghai",
    "Sydney", "Toronto", "San Francisco", "Los Angeles", "Chicago", "Boston", "Seattle",
    "California", "Texas", "Florida", "Washington",
];

const MONTHS: &str = "Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?";

// Person name patterns
static PERSON_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        def(
            r"\b(?:Mr|Mrs|Ms|Miss|Dr|Prof)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\b",
            "Name with honorific",
            false,
        ),
        (
            format!(r"\b(?:{})(?:\s+[A-Z][a-z]+){{1,2}}\b", GIVEN_NAMES.join("|")),
            "Known given name followed by surname",
            false,
        ),
    ]
});

// Email patterns
static EMAIL_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![def(
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        "Email address",
        false,
    )]
});

// Phone patterns (US and international)
static PHONE_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        def(
            r"(?:\+?1[-.\s]?)?\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
            "US phone number",
            false,
        ),
        def(r"\+[1-9]\d{9,14}\b", "International phone number", false),
    ]
});

// IP address patterns (IPv4 and IPv6)
static IP_ADDRESS_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        def(
            r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b",
            "IPv4 address",
            false,
        ),
        def(
            r"\b(?:[A-Fa-f0-9]{1,4}:){7}[A-Fa-f0-9]{1,4}\b",
            "IPv6 address",
            false,
        ),
    ]
});

// Singapore NRIC / FIN
static NRIC_PATTERNS: Lazy<Vec<PatternDef>> =
    Lazy::new(|| vec![def(r"\b[STFGM]\d{7}[A-Z]\b", "Singapore NRIC/FIN", false)]);

// Date and time patterns
static DATE_TIME_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        def(
            r"\b(?:0?[1-9]|1[0-2])[-/.](?:0?[1-9]|[12]\d|3[01])[-/.](?:19|20)?\d{2}\b",
            "Date in MM/DD/YYYY format",
            false,
        ),
        def(
            r"\b(?:0?[1-9]|[12]\d|3[01])[-/.](?:0?[1-9]|1[0-2])[-/.](?:19|20)\d{2}\b",
            "Date in DD/MM/YYYY format",
            false,
        ),
        def(
            r"\b(?:19|20)\d{2}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12]\d|3[01])(?:[T ](?:[01]\d|2[0-3]):[0-5]\d(?::[0-5]\d)?)?\b",
            "ISO 8601 date",
            false,
        ),
        (
            format!(r"\b(?:{MONTHS})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}\b"),
            "Month name date",
            true,
        ),
        (
            format!(r"\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:{MONTHS})\.?,?\s+\d{{4}}\b"),
            "Day first month name date",
            true,
        ),
        def(
            r"\b(?:1[0-2]|0?[1-9]):[0-5]\d\s?(?:AM|PM)\b",
            "12-hour clock time",
            true,
        ),
    ]
});

// Credit card patterns (checked with Luhn)
static CREDIT_CARD_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        def(
            r"\b(?:\d{4}[-\s]?){3}\d{4}\b",
            "Credit card number",
            false,
        ),
        def(
            r"\b3[47]\d{2}[-\s]?\d{6}[-\s]?\d{5}\b",
            "American Express card number",
            false,
        ),
    ]
});

// IBAN patterns (checked with ISO 13616 mod-97)
static IBAN_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![def(
        r"\b[A-Z]{2}\d{2}(?: ?[A-Z0-9]{4}){2,7}(?: ?[A-Z0-9]{1,3})?\b",
        "IBAN",
        false,
    )]
});

// Passport patterns
static PASSPORT_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![def(
        r"\bpassport(?:\s+(?:no\.?|number|#))?[\s:#]*([A-Z]?\d{8,9})\b",
        "US passport number with label",
        true,
    )]
});

// Driver's license patterns
static DRIVER_LICENSE_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![def(
        r"\b(?:DL|driver'?s?\s+licen[cs]e|licen[cs]e)(?:\s+(?:no\.?|number|#))?[\s:#]*([A-Z0-9][A-Z0-9-]{4,19})\b",
        "Driver's license number with label",
        true,
    )]
});

// SSN patterns
static SSN_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        def(r"\b\d{3}-\d{2}-\d{4}\b", "US Social Security Number", false),
        def(
            r"\b(?:SSN|social\s+security(?:\s+(?:no\.?|number|#))?)[\s:#]*(\d{9})\b",
            "Undelimited SSN with label",
            true,
        ),
    ]
});

// Street address patterns
static LOCATION_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        def(
            r"\b\d{1,5}\s+(?:[A-Z][a-z]+\s+){1,3}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Way|Place|Pl|Terrace|Parkway)\b",
            "Street address",
            false,
        ),
        def(r"\bP\.?\s?O\.?\s+Box\s+\d+\b", "PO box", true),
    ]
});

// Organization patterns
static ORG_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![def(
        r"\b(?:[A-Z][A-Za-z&'-]*\s+){1,4}(?:Inc|Incorporated|Corp|Corporation|Ltd|Limited|LLC|LLP|PLC|GmbH|Company|Co|Group|Holdings|Bank|University|College|Institute|Foundation|Technologies|Systems|Hospital)\b",
        "Organization with legal or institutional suffix",
        false,
    )]
});

// Countries, states and cities
static GPE_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![(
        format!(r"\b(?:{})\b", GEO_POLITICAL.join("|")),
        "Geo-political entity",
        false,
    )]
});

// Monetary amounts
static MONEY_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        def(
            r"[$€£¥₹]\s?\d+(?:,\d{3})*(?:\.\d{1,2})?(?:\s?(?:million|billion|thousand))?",
            "Currency symbol amount",
            false,
        ),
        def(
            r"\b(?:USD|EUR|GBP|INR|Rs\.?)\s?\d+(?:,\d{3})*(?:\.\d{1,2})?",
            "Currency code amount",
            false,
        ),
        def(
            r"\b\d+(?:,\d{3})*(?:\.\d{1,2})?\s?(?:dollars|euros|pounds|rupees|USD|EUR|GBP|INR)\b",
            "Amount with currency word",
            true,
        ),
    ]
});

// Generic labelled identifiers
static ID_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![def(
        r"\b(?:ID|identifier|(?:employee|customer|member|patient)\s+(?:ID|no\.?|number)|(?:account|reference|ref\.?)\s+(?:no\.?|number))[\s:#]*([A-Z0-9][A-Z0-9-]{3,23})\b",
        "Identifier with label",
        true,
    )]
});

// Aadhaar (India)
static AADHAAR_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![def(
        r"\b[2-9]\d{3}\s\d{4}\s\d{4}\b",
        "Aadhaar number",
        false,
    )]
});

// Vehicle registration plates
static LICENSE_PLATE_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        def(
            r"\b[A-Z]{2}[\s-]?\d{1,2}[\s-]?[A-Z]{1,3}[\s-]?\d{4}\b",
            "Indian registration plate",
            false,
        ),
        def(r"\b[A-Z]{3}-\d{3,4}\b", "Hyphenated plate", false),
    ]
});

fn builtin_patterns(kind: EntityKind) -> &'static [PatternDef] {
    match kind {
        EntityKind::Person => PERSON_PATTERNS.as_slice(),
        EntityKind::EmailAddress => EMAIL_PATTERNS.as_slice(),
        EntityKind::PhoneNumber => PHONE_PATTERNS.as_slice(),
        EntityKind::IpAddress => IP_ADDRESS_PATTERNS.as_slice(),
        EntityKind::Nric => NRIC_PATTERNS.as_slice(),
        EntityKind::DateTime => DATE_TIME_PATTERNS.as_slice(),
        EntityKind::CreditCard => CREDIT_CARD_PATTERNS.as_slice(),
        EntityKind::IbanCode => IBAN_PATTERNS.as_slice(),
        EntityKind::UsPassport => PASSPORT_PATTERNS.as_slice(),
        EntityKind::UsDriverLicense => DRIVER_LICENSE_PATTERNS.as_slice(),
        EntityKind::Ssn => SSN_PATTERNS.as_slice(),
        EntityKind::Location => LOCATION_PATTERNS.as_slice(),
        EntityKind::Org => ORG_PATTERNS.as_slice(),
        EntityKind::Gpe => GPE_PATTERNS.as_slice(),
        EntityKind::Money => MONEY_PATTERNS.as_slice(),
        EntityKind::Id => ID_PATTERNS.as_slice(),
        EntityKind::AadhaarNumber => AADHAAR_PATTERNS.as_slice(),
        EntityKind::LicensePlate => LICENSE_PLATE_PATTERNS.as_slice(),
    }
}

fn validator_for(kind: EntityKind) -> Option<Validator> {
    match kind {
        EntityKind::CreditCard => Some(luhn_valid),
        EntityKind::IbanCode => Some(iban_valid),
        EntityKind::UsDriverLicense | EntityKind::Id => Some(has_digit),
        _ => None,
    }
}

/// Luhn checksum over the digits of a card number
pub fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// ISO 13616 check: move the first four characters to the end, map letters
/// to 10..35 and require the number mod 97 to equal 1
pub fn iban_valid(candidate: &str) -> bool {
    let compact: Vec<char> = candidate.chars().filter(|c| !c.is_whitespace()).collect();
    if !(15..=34).contains(&compact.len()) {
        return false;
    }

    let (head, tail) = compact.split_at(4);
    let mut remainder: u32 = 0;
    for c in tail.iter().chain(head) {
        let Some(value) = c.to_digit(36) else {
            return false;
        };
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }

    remainder == 1
}

fn has_digit(candidate: &str) -> bool {
    candidate.chars().any(|c| c.is_ascii_digit())
}

/// Compile the built-in table for every kind, plus custom patterns and the allow list
pub fn compile_patterns(config: &DetectionConfig) -> Result<CompiledPatterns, String> {
    let mut pattern_strings = Vec::new();
    let mut patterns = Vec::new();

    // Helper macro to compile one pattern into both the set and the per-pattern list
    macro_rules! add_pattern {
        ($kind:expr, $pattern:expr, $description:expr, $case_insensitive:expr) => {
            let regex = RegexBuilder::new($pattern)
                .case_insensitive($case_insensitive)
                .build()
                .map_err(|e| format!("Failed to compile pattern '{}': {}", $pattern, e))?;
            pattern_strings.push(if $case_insensitive {
                format!("(?i){}", $pattern)
            } else {
                $pattern.to_string()
            });
            patterns.push(CompiledPattern {
                kind: $kind,
                regex,
                validator: validator_for($kind),
                description: $description.to_string(),
            });
        };
    }

    for kind in EntityKind::ALL {
        for (pattern, description, case_insensitive) in builtin_patterns(kind) {
            add_pattern!(kind, pattern.as_str(), *description, *case_insensitive);
        }
    }

    for custom in config.custom_patterns.iter().filter(|c| c.enabled) {
        add_pattern!(
            custom.kind,
            custom.pattern.as_str(),
            custom.description.as_str(),
            custom.case_insensitive
        );
    }

    // Handle empty pattern set gracefully
    let regex_set = if pattern_strings.is_empty() {
        RegexSet::empty()
    } else {
        RegexSet::new(&pattern_strings).map_err(|e| format!("Failed to compile RegexSet: {}", e))?
    };

    let mut allow_list = Vec::new();
    for pattern in &config.allow_list {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => allow_list.push(regex),
            Err(e) => return Err(format!("Invalid allow list pattern '{}': {}", pattern, e)),
        }
    }

    Ok(CompiledPatterns {
        regex_set,
        patterns,
        allow_list,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pii_filter::config::CustomPattern;

    fn compiled() -> CompiledPatterns {
        compile_patterns(&DetectionConfig::default()).unwrap()
    }

    fn first_value(kind: EntityKind, text: &str) -> Option<String> {
        compiled()
            .patterns
            .iter()
            .filter(|p| p.kind == kind)
            .flat_map(|p| p.regex.captures_iter(text).collect::<Vec<_>>())
            .map(|c| c.get(1).or_else(|| c.get(0)).unwrap().as_str().to_string())
            .next()
    }

    #[test]
    fn test_compile_patterns() {
        let compiled = compiled();
        assert!(!compiled.patterns.is_empty());
        assert_eq!(compiled.regex_set.len(), compiled.patterns.len());
        for kind in EntityKind::ALL {
            assert!(
                compiled.patterns.iter().any(|p| p.kind == kind),
                "no pattern for {kind}"
            );
        }
    }

    #[test]
    fn test_email_pattern() {
        assert_eq!(
            first_value(EntityKind::EmailAddress, "Contact me at john.doe@example.com").as_deref(),
            Some("john.doe@example.com")
        );
    }

    #[test]
    fn test_person_pattern() {
        assert_eq!(
            first_value(EntityKind::Person, "Contact John Smith at the desk").as_deref(),
            Some("John Smith")
        );
        assert_eq!(
            first_value(EntityKind::Person, "Signed, Dr. Watson").as_deref(),
            Some("Dr. Watson")
        );
        assert_eq!(first_value(EntityKind::Person, "john smith"), None);
    }

    #[test]
    fn test_labelled_patterns_report_value_only() {
        assert_eq!(
            first_value(EntityKind::UsPassport, "Passport No: X12345678").as_deref(),
            Some("X12345678")
        );
        assert_eq!(
            first_value(EntityKind::Ssn, "SSN: 123456789").as_deref(),
            Some("123456789")
        );
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("4111-1111-1111-1111"));
        assert!(luhn_valid("4012 8888 8888 1881"));
        assert!(!luhn_valid("4111-1111-1111-1112"));
        assert!(!luhn_valid("1234"));
    }

    #[test]
    fn test_iban() {
        assert!(iban_valid("GB82WEST12345698765432"));
        assert!(iban_valid("GB82 WEST 1234 5698 7654 32"));
        assert!(!iban_valid("GB82WEST12345698765433"));
        assert!(!iban_valid("GB82"));
    }

    #[test]
    fn test_custom_pattern_compiled() {
        let config = DetectionConfig {
            custom_patterns: vec![CustomPattern {
                kind: EntityKind::Id,
                pattern: r"\bEMP-\d{5}\b".to_string(),
                description: "Employee badge".to_string(),
                case_insensitive: false,
                enabled: true,
            }],
            ..Default::default()
        };
        let compiled = compile_patterns(&config).unwrap();
        let last = compiled.patterns.last().unwrap();
        assert_eq!(last.kind, EntityKind::Id);
        assert!(last.regex.is_match("badge EMP-00042"));
    }

    #[test]
    fn test_invalid_custom_pattern() {
        let config = DetectionConfig {
            custom_patterns: vec![CustomPattern {
                kind: EntityKind::Id,
                pattern: "(unclosed".to_string(),
                description: String::new(),
                case_insensitive: false,
                enabled: true,
            }],
            ..Default::default()
        };
        assert!(compile_patterns(&config).is_err());
    }

    #[test]
    fn test_invalid_allow_list() {
        let config = DetectionConfig {
            allow_list: vec!["[".to_string()],
            ..Default::default()
        };
        let err = compile_patterns(&config).unwrap_err();
        assert!(err.contains("allow list"));
    }
}
