use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::DEFINITE_SEVERITY_FLOOR;
use crate::errors::ConfigError;

/// Named threshold presets for verdict synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdProfile {
    /// Canonical profile: contradiction has priority, support is discounted.
    #[default]
    Conservative,
    /// Lowers the bar for SUPPORTED. Must be chosen explicitly.
    Boosted,
}

impl ThresholdProfile {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "conservative" => Some(Self::Conservative),
            "boosted" => Some(Self::Boosted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Boosted => "boosted",
        }
    }
}

/// The decision surface of the verdict synthesizer.
/// Fields left out of a TOML override keep their conservative values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisThresholds {
    /// Contradiction confidence above this yields CONTRADICTED.
    pub contradiction_threshold: f64,
    /// Support confidence above this may yield SUPPORTED.
    pub strong_support_threshold: f64,
    /// Contradiction must stay below this for SUPPORTED.
    pub weak_contradiction_threshold: f64,
    /// Added to contradiction confidence on CONTRADICTED.
    pub contradiction_bonus: f64,
    /// Upper bound of a CONTRADICTED confidence.
    pub confidence_cap: f64,
    /// Multiplier on support confidence for SUPPORTED.
    pub support_penalty: f64,
    /// Bounds of an UNDETERMINED confidence.
    pub undetermined_floor: f64,
    pub undetermined_cap: f64,
}

impl SynthesisThresholds {
    pub fn conservative() -> Self {
        Self {
            contradiction_threshold: defaults::CONSERVATIVE_CONTRADICTION_THRESHOLD,
            strong_support_threshold: defaults::CONSERVATIVE_STRONG_SUPPORT_THRESHOLD,
            weak_contradiction_threshold: defaults::CONSERVATIVE_WEAK_CONTRADICTION_THRESHOLD,
            contradiction_bonus: defaults::CONSERVATIVE_CONTRADICTION_BONUS,
            confidence_cap: defaults::DEFAULT_CONFIDENCE_CAP,
            support_penalty: defaults::CONSERVATIVE_SUPPORT_PENALTY,
            undetermined_floor: defaults::DEFAULT_UNDETERMINED_FLOOR,
            undetermined_cap: defaults::DEFAULT_UNDETERMINED_CAP,
        }
    }

    pub fn boosted() -> Self {
        Self {
            contradiction_threshold: defaults::BOOSTED_CONTRADICTION_THRESHOLD,
            strong_support_threshold: defaults::BOOSTED_STRONG_SUPPORT_THRESHOLD,
            weak_contradiction_threshold: defaults::BOOSTED_WEAK_CONTRADICTION_THRESHOLD,
            contradiction_bonus: defaults::BOOSTED_CONTRADICTION_BONUS,
            confidence_cap: defaults::DEFAULT_CONFIDENCE_CAP,
            support_penalty: defaults::BOOSTED_SUPPORT_PENALTY,
            undetermined_floor: defaults::DEFAULT_UNDETERMINED_FLOOR,
            undetermined_cap: defaults::DEFAULT_UNDETERMINED_CAP,
        }
    }

    pub fn for_profile(profile: ThresholdProfile) -> Self {
        match profile {
            ThresholdProfile::Conservative => Self::conservative(),
            ThresholdProfile::Boosted => Self::boosted(),
        }
    }

    pub fn is_conservative(&self) -> bool {
        *self == Self::conservative()
    }

    /// Range checks plus the asymmetry the synthesizer depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_fields = [
            ("contradiction_threshold", self.contradiction_threshold),
            ("strong_support_threshold", self.strong_support_threshold),
            ("weak_contradiction_threshold", self.weak_contradiction_threshold),
            ("contradiction_bonus", self.contradiction_bonus),
            ("confidence_cap", self.confidence_cap),
            ("support_penalty", self.support_penalty),
            ("undetermined_floor", self.undetermined_floor),
            ("undetermined_cap", self.undetermined_cap),
        ];
        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(name, "must be between 0.0 and 1.0"));
            }
        }
        if self.contradiction_threshold >= self.strong_support_threshold {
            return Err(invalid(
                "contradiction_threshold",
                "must be below strong_support_threshold",
            ));
        }
        if self.weak_contradiction_threshold >= self.contradiction_threshold {
            return Err(invalid(
                "weak_contradiction_threshold",
                "must be below contradiction_threshold",
            ));
        }
        if self.contradiction_threshold > DEFINITE_SEVERITY_FLOOR {
            return Err(invalid(
                "contradiction_threshold",
                "must not exceed the DEFINITE severity floor (0.6)",
            ));
        }
        if self.undetermined_floor > self.undetermined_cap {
            return Err(invalid(
                "undetermined_floor",
                "must not exceed undetermined_cap",
            ));
        }
        Ok(())
    }
}

impl Default for SynthesisThresholds {
    fn default() -> Self {
        Self::conservative()
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: format!("reasoning.thresholds.{field}"),
        message: message.to_string(),
    }
}

/// Evaluator and synthesizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub profile: ThresholdProfile,
    /// Replaces the profile's thresholds entirely when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<SynthesisThresholds>,
    /// Passages included in the evidence text.
    pub max_passages: usize,
    /// Characters kept from each passage.
    pub passage_char_limit: usize,
    /// Excerpts kept from each evaluator answer.
    pub max_excerpts: usize,
    /// Also run both passes for every sub-claim.
    pub evaluate_sub_claims: bool,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            profile: ThresholdProfile::default(),
            thresholds: None,
            max_passages: defaults::DEFAULT_MAX_PASSAGES,
            passage_char_limit: defaults::DEFAULT_PASSAGE_CHAR_LIMIT,
            max_excerpts: defaults::DEFAULT_MAX_EXCERPTS,
            evaluate_sub_claims: false,
        }
    }
}

impl ReasoningConfig {
    pub fn resolved_thresholds(&self) -> SynthesisThresholds {
        self.thresholds
            .unwrap_or_else(|| SynthesisThresholds::for_profile(self.profile))
    }
}
