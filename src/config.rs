//! Controller configuration
//!
//! Every tunable constant of the field model, the PD law and the engagement
//! heuristic lives here with its default. World constants (team, max speed,
//! world size) are not configuration: they come from the world source.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::ControlledAgents;
use crate::control::controllers::{ControlGains, DerivativeMode, SpeedOutputMode};
use crate::control::engagement::EngagementConfig;
use crate::error::{ControllerError, Result};
use crate::navigation::potential_field::FieldConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub speed_output: SpeedOutputMode,
    pub field: FieldConfig,
    pub gains: ControlGains,
    pub derivative: DerivativeMode,
    pub engagement: EngagementConfig,
    pub agents: ControlledAgents,
}

impl ControllerConfig {
    /// Parse and validate a TOML document; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ControllerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.field.validate()?;
        self.gains.validate()?;
        self.engagement.validate()?;
        if let DerivativeMode::TimeScaled { nominal_tick_secs } = self.derivative {
            if !nominal_tick_secs.is_finite() || nominal_tick_secs <= 0.0 {
                return Err(ControllerError::InvalidConfig(
                    "nominal_tick_secs must be positive".to_string(),
                ));
            }
        }
        if let ControlledAgents::Prefix { count: 0 } = self.agents {
            return Err(ControllerError::InvalidConfig(
                "prefix count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply flat numeric overrides by parameter name.
    ///
    /// Setting `nominal_tick_secs` switches the derivative to time-scaled
    /// mode. Unknown names are rejected. On error `self` is left unchanged.
    pub fn apply_overrides(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        let mut candidate = self.clone();
        for (name, &value) in params {
            match name.as_str() {
                "attractive_force" => candidate.field.attractive_force = value,
                "repulsive_force" => candidate.field.repulsive_force = value,
                "tangential_force" => candidate.field.tangential_force = value,
                "influence_radius" => candidate.field.influence_radius = value,
                "corner_influence" => candidate.field.corner_influence = value,
                "angular_p" => candidate.gains.angular_p = value,
                "angular_d" => candidate.gains.angular_d = value,
                "speed_p" => candidate.gains.speed_p = value,
                "speed_d" => candidate.gains.speed_d = value,
                "speed_error_threshold" => candidate.engagement.speed_error_threshold = value,
                "cone_half_angle" => candidate.engagement.cone_half_angle = value,
                "nominal_tick_secs" => {
                    candidate.derivative = DerivativeMode::TimeScaled {
                        nominal_tick_secs: value,
                    }
                }
                other => {
                    return Err(ControllerError::InvalidConfig(format!(
                        "unknown parameter {}",
                        other
                    )))
                }
            }
        }
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::engagement::EngagementMode;

    #[test]
    fn empty_document_gives_defaults() {
        let config = ControllerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.field.influence_radius, 90.0);
        assert_eq!(config.gains.speed_d, 1.0);
        assert_eq!(config.agents, ControlledAgents::All);
        assert_eq!(config.derivative, DerivativeMode::FixedStep);
        assert_eq!(config.speed_output, SpeedOutputMode::Acceleration);
    }

    #[test]
    fn sections_override_defaults() {
        let config = ControllerConfig::from_toml_str(
            r#"
            speed_output = "velocity"

            [field]
            influence_radius = 120.0

            [gains]
            angular_p = 2.0

            [derivative]
            mode = "time_scaled"
            nominal_tick_secs = 0.05

            [engagement]
            mode = "forward"

            [agents]
            mode = "prefix"
            count = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.speed_output, SpeedOutputMode::Velocity);
        assert_eq!(config.field.influence_radius, 120.0);
        assert_eq!(config.field.attractive_force, 25.0);
        assert_eq!(config.gains.angular_p, 2.0);
        assert_eq!(config.gains.angular_d, 1.0);
        assert_eq!(
            config.derivative,
            DerivativeMode::TimeScaled {
                nominal_tick_secs: 0.05
            }
        );
        assert_eq!(config.engagement.mode, EngagementMode::Forward);
        assert_eq!(config.agents, ControlledAgents::Prefix { count: 2 });
    }

    #[test]
    fn explicit_id_set_parses() {
        let config = ControllerConfig::from_toml_str(
            r#"
            [agents]
            mode = "ids"
            ids = [0, 4]
            "#,
        )
        .unwrap();
        assert_eq!(config.agents, ControlledAgents::Ids { ids: [0, 4].into() });
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ControllerConfig::from_toml_str("[field]\ninfluence_radius = -1.0").is_err());
        assert!(ControllerConfig::from_toml_str("[agents]\nmode = \"prefix\"\ncount = 0").is_err());
        assert!(ControllerConfig::from_toml_str("[field]\ninfluence_radius = \"far\"").is_err());
    }

    #[test]
    fn overrides_are_applied_and_validated() {
        let mut config = ControllerConfig::default();
        let mut params = HashMap::new();
        params.insert("speed_p".to_string(), 0.5);
        params.insert("nominal_tick_secs".to_string(), 0.1);
        config.apply_overrides(&params).unwrap();
        assert_eq!(config.gains.speed_p, 0.5);
        assert_eq!(
            config.derivative,
            DerivativeMode::TimeScaled {
                nominal_tick_secs: 0.1
            }
        );
    }

    #[test]
    fn rejected_overrides_leave_config_untouched() {
        let mut config = ControllerConfig::default();
        let mut params = HashMap::new();
        params.insert("speed_p".to_string(), 0.5);
        config.apply_overrides(&params).unwrap();
        let before = config.clone();

        let mut invalid = HashMap::new();
        invalid.insert("corner_influence".to_string(), 0.0);
        assert!(config.apply_overrides(&invalid).is_err());
        assert_eq!(config, before);
        assert!(config.validate().is_ok());

        let mut mixed = HashMap::new();
        mixed.insert("angular_p".to_string(), 3.0);
        mixed.insert("influence_radius".to_string(), 50.0);
        mixed.insert("wheel_base".to_string(), 0.5);
        assert!(config.apply_overrides(&mixed).is_err());
        assert_eq!(config, before);
    }
}
