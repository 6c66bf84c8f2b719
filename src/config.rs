//! Grading rules: blend weights, fill defaults and the admission gate.
//!
//! Stored as a JSON object on disk. Every field is optional and falls back
//! to the built-in default:
//! ```json
//! {
//!   "weights": { "lecture": 0.2, "practice": 0.5, "srsp": 0.3 },
//!   "final_blend": { "final_exam": 0.4, "admission": 0.6 },
//!   "fill": { "strategy": "reference", "weekly": 90, "midterm": 90, "final_exam": 90 },
//!   "admission_threshold": 50
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::GradebookError;
use crate::schema::CellRole;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Share of each component in a period's weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub lecture: f64,
    pub practice: f64,
    pub srsp: f64,
}

impl Default for Weights {
    /// 20 / 50 / 30.
    fn default() -> Self {
        Self {
            lecture: 0.20,
            practice: 0.50,
            srsp: 0.30,
        }
    }
}

impl Weights {
    /// Alternative rule set weighting independent study above practice: 20 / 30 / 50.
    pub fn srsp_heavy() -> Self {
        Self {
            lecture: 0.20,
            practice: 0.30,
            srsp: 0.50,
        }
    }
}

/// Final grade = final exam × `final_exam` + admission rating × `admission`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalBlend {
    pub final_exam: f64,
    pub admission: f64,
}

impl Default for FinalBlend {
    fn default() -> Self {
        Self {
            final_exam: 0.40,
            admission: 0.60,
        }
    }
}

/// Where gap-fill values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    /// Reference-dataset average, then the fixed default.
    Reference,
    /// Fixed default only.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillDefaults {
    pub strategy: FillStrategy,
    pub weekly: f64,
    pub midterm: f64,
    pub final_exam: f64,
}

impl Default for FillDefaults {
    fn default() -> Self {
        Self {
            strategy: FillStrategy::Reference,
            weekly: 90.0,
            midterm: 90.0,
            final_exam: 90.0,
        }
    }
}

impl FillDefaults {
    pub fn for_role(&self, role: CellRole) -> f64 {
        match role {
            CellRole::Weekly => self.weekly,
            CellRole::Midterm => self.midterm,
            CellRole::FinalExam => self.final_exam,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    pub weights: Weights,
    pub final_blend: FinalBlend,
    pub fill: FillDefaults,
    /// Admission ratings below this are reported as not admitted.
    pub admission_threshold: f64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            final_blend: FinalBlend::default(),
            fill: FillDefaults::default(),
            admission_threshold: 50.0,
        }
    }
}

impl GradingConfig {
    /// Loads and validates a config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let config: GradingConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), GradebookError> {
        let w = &self.weights;
        check_blend("weights", &[w.lecture, w.practice, w.srsp])?;

        let b = &self.final_blend;
        check_blend("final_blend", &[b.final_exam, b.admission])?;

        Ok(())
    }
}

fn check_blend(name: &str, parts: &[f64]) -> Result<(), GradebookError> {
    if parts.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(GradebookError::InvalidConfig(format!(
            "{} must be finite and non-negative",
            name
        )));
    }

    let sum: f64 = parts.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(GradebookError::InvalidConfig(format!(
            "{} must sum to 1.0, got {}",
            name, sum
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = GradingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fill.strategy, FillStrategy::Reference);
    }

    #[test]
    fn test_srsp_heavy_is_valid() {
        let config = GradingConfig {
            weights: Weights::srsp_heavy(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let config = GradingConfig {
            weights: Weights {
                lecture: 0.5,
                practice: 0.5,
                srsp: 0.5,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GradebookError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = GradingConfig {
            final_blend: FinalBlend {
                final_exam: -0.2,
                admission: 1.2,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_for_role() {
        let fill = FillDefaults {
            weekly: 70.0,
            midterm: 80.0,
            final_exam: 85.0,
            ..Default::default()
        };
        assert_eq!(fill.for_role(CellRole::Weekly), 70.0);
        assert_eq!(fill.for_role(CellRole::Midterm), 80.0);
        assert_eq!(fill.for_role(CellRole::FinalExam), 85.0);
    }

    #[test]
    fn test_load_partial_json() {
        let path = temp_path("grade_rater_test_config_partial.json");
        fs::write(&path, r#"{ "fill": { "strategy": "fixed" } }"#).unwrap();

        let config = GradingConfig::load(&path).unwrap();
        assert_eq!(config.fill.strategy, FillStrategy::Fixed);
        assert_eq!(config.fill.weekly, 90.0);
        assert_eq!(config.weights, Weights::default());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rejects_invalid_weights() {
        let path = temp_path("grade_rater_test_config_invalid.json");
        fs::write(
            &path,
            r#"{ "weights": { "lecture": 0.1, "practice": 0.1, "srsp": 0.1 } }"#,
        )
        .unwrap();

        assert!(GradingConfig::load(&path).is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = GradingConfig::load_or_default(None).unwrap();
        assert_eq!(config, GradingConfig::default());
    }
}
