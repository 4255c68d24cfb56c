use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of narrative rule a sub-claim's violation would break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintCategory {
    /// When events occur relative to each other.
    Temporal,
    /// What the character can or cannot do.
    Capability,
    /// Promises, oaths, loyalties.
    Commitment,
    /// Laws of the narrative world.
    WorldRule,
    /// Beliefs, fears, motivations.
    Psychological,
    /// Concrete facts: names, places, relationships.
    #[default]
    Factual,
}

impl ConstraintCategory {
    pub const ALL: [ConstraintCategory; 6] = [
        Self::Temporal,
        Self::Capability,
        Self::Commitment,
        Self::WorldRule,
        Self::Psychological,
        Self::Factual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temporal => "temporal",
            Self::Capability => "capability",
            Self::Commitment => "commitment",
            Self::WorldRule => "world_rule",
            Self::Psychological => "psychological",
            Self::Factual => "factual",
        }
    }

    /// Strict lookup. Case-insensitive; `-` and spaces count as `_`.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = normalize_label(label);
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
    }

    /// Lenient lookup used on generated output: out-of-vocabulary labels are FACTUAL.
    pub fn from_label(label: &str) -> Self {
        Self::parse(label).unwrap_or(Self::Factual)
    }
}

impl fmt::Display for ConstraintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The contradiction evaluator's `violation_type`: no violation, or a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViolationLabel {
    #[default]
    None,
    Category(ConstraintCategory),
}

impl ViolationLabel {
    /// Blank or `none` means no violation; anything else maps through
    /// [`ConstraintCategory::from_label`].
    pub fn from_label(label: &str) -> Self {
        let normalized = normalize_label(label);
        if normalized.is_empty() || normalized == "none" {
            Self::None
        } else {
            Self::Category(ConstraintCategory::from_label(&normalized))
        }
    }

    pub fn category(self) -> Option<ConstraintCategory> {
        match self {
            Self::None => None,
            Self::Category(c) => Some(c),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Category(c) => c.as_str(),
        }
    }
}

impl fmt::Display for ViolationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
}
