// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for PII detection and masking

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version of the entity kind catalog below. Bump when kinds are added or removed.
pub const ENTITY_CATALOG_VERSION: u32 = 1;

/// PII categories the detector recognizes (closed list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Person,
    EmailAddress,
    PhoneNumber,
    IpAddress,
    Nric,
    DateTime,
    CreditCard,
    IbanCode,
    UsPassport,
    UsDriverLicense,
    Ssn,
    Location,
    Org,
    Gpe,
    Money,
    Id,
    AadhaarNumber,
    LicensePlate,
}

impl EntityKind {
    pub const ALL: [EntityKind; 18] = [
        EntityKind::Person,
        EntityKind::EmailAddress,
        EntityKind::PhoneNumber,
        EntityKind::IpAddress,
        EntityKind::Nric,
        EntityKind::DateTime,
        EntityKind::CreditCard,
        EntityKind::IbanCode,
        EntityKind::UsPassport,
        EntityKind::UsDriverLicense,
        EntityKind::Ssn,
        EntityKind::Location,
        EntityKind::Org,
        EntityKind::Gpe,
        EntityKind::Money,
        EntityKind::Id,
        EntityKind::AadhaarNumber,
        EntityKind::LicensePlate,
    ];

    /// Wire label of the kind (e.g. `EMAIL_ADDRESS`)
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "PERSON",
            EntityKind::EmailAddress => "EMAIL_ADDRESS",
            EntityKind::PhoneNumber => "PHONE_NUMBER",
            EntityKind::IpAddress => "IP_ADDRESS",
            EntityKind::Nric => "NRIC",
            EntityKind::DateTime => "DATE_TIME",
            EntityKind::CreditCard => "CREDIT_CARD",
            EntityKind::IbanCode => "IBAN_CODE",
            EntityKind::UsPassport => "US_PASSPORT",
            EntityKind::UsDriverLicense => "US_DRIVER_LICENSE",
            EntityKind::Ssn => "SSN",
            EntityKind::Location => "LOCATION",
            EntityKind::Org => "ORG",
            EntityKind::Gpe => "GPE",
            EntityKind::Money => "MONEY",
            EntityKind::Id => "ID",
            EntityKind::AadhaarNumber => "AADHAAR_NUMBER",
            EntityKind::LicensePlate => "LICENSE_PLATE",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| format!("Unknown entity kind '{label}'"))
    }
}

/// Which kind survives when the same literal is detected under two kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    #[default]
    LastWriteWins,
    FirstWriteWins,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_write_wins" => Ok(CollisionPolicy::LastWriteWins),
            "first_write_wins" => Ok(CollisionPolicy::FirstWriteWins),
            other => Err(format!("Unknown collision policy '{other}'")),
        }
    }
}

/// How an edit mapping is applied to the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaskMode {
    /// Each pair rewrites the output of the previous pair; replacements can compound
    #[default]
    Sequential,
    /// All pairs are matched against the untouched text in one pass
    SinglePass,
}

impl FromStr for MaskMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(MaskMode::Sequential),
            "single_pass" => Ok(MaskMode::SinglePass),
            other => Err(format!("Unknown mask mode '{other}'")),
        }
    }
}

/// Replacement an operator can pick for a detected literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementAction {
    #[default]
    Redact, // '*' per character
    Delete,   // ' ' per character
    Mask,     // configured mask text, e.g. [Masked]
    Partial,  // Show last digits / first+last chars (e.g., ***-**-1234)
    Hash,     // Replace with hash (e.g., [HASH:abc123])
    Tokenize, // Replace with token (e.g., [TOKEN:xyz789])
    Remove,   // Remove entirely
}

impl FromStr for ReplacementAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redact" => Ok(ReplacementAction::Redact),
            "delete" => Ok(ReplacementAction::Delete),
            "mask" => Ok(ReplacementAction::Mask),
            "partial" => Ok(ReplacementAction::Partial),
            "hash" => Ok(ReplacementAction::Hash),
            "tokenize" => Ok(ReplacementAction::Tokenize),
            "remove" => Ok(ReplacementAction::Remove),
            other => Err(format!("Unknown replacement action '{other}'")),
        }
    }
}

/// Extra recognizer pattern supplied by the deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPattern {
    pub kind: EntityKind,
    pub pattern: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_entities() -> Vec<EntityKind> {
    EntityKind::ALL.to_vec()
}

fn default_mask_text() -> String {
    "[Masked]".to_string()
}

/// Detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Kinds requested from the recognizer on every detect call
    #[serde(default = "default_entities")]
    pub entities: Vec<EntityKind>,

    /// Collision policy used by the reconciler
    #[serde(default)]
    pub collision_policy: CollisionPolicy,

    #[serde(default)]
    pub custom_patterns: Vec<CustomPattern>,

    /// Literals matching any of these regexes are never reported
    #[serde(default)]
    pub allow_list: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            entities: default_entities(),
            collision_policy: CollisionPolicy::default(),
            custom_patterns: Vec::new(),
            allow_list: Vec::new(),
        }
    }
}

impl DetectionConfig {
    /// Configuration restricted to the given kinds
    pub fn for_entities(entities: &[EntityKind]) -> Self {
        Self {
            entities: entities.to_vec(),
            ..Default::default()
        }
    }
}

/// Masking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskingConfig {
    #[serde(default)]
    pub mode: MaskMode,

    /// Action used by `suggest_edits` when the caller names none
    #[serde(default)]
    pub default_action: ReplacementAction,

    /// Replacement text for `ReplacementAction::Mask`
    #[serde(default = "default_mask_text")]
    pub mask_text: String,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            mode: MaskMode::default(),
            default_action: ReplacementAction::default(),
            mask_text: default_mask_text(),
        }
    }
}
