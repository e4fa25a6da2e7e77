use crate::error::ConfigError;
use cogex_core::Block;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub practice_trials: usize,
    pub main_trials: usize,
    pub instruction_screens: usize,
    pub fixation_ms: u64,
    pub post_fixation_blank_ms: u64,
    pub cue_display_ms: u64,
    pub cue_delay_ms: u64,
    pub response_timeout_ms: u64,
    pub feedback_ms: u64,
    pub inter_trial_interval_ms: u64,
    /// Show error feedback in the main block too
    pub feedback_in_main: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            practice_trials: 10,
            main_trials: 50,
            instruction_screens: 5,
            fixation_ms: 150,
            post_fixation_blank_ms: 500,
            cue_display_ms: 350,
            cue_delay_ms: 750,
            response_timeout_ms: 2000,
            feedback_ms: 500,
            inter_trial_interval_ms: 1000,
            feedback_in_main: false,
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.practice_trials == 0 {
            return Err(ConfigError::Invalid("practice_trials must be at least 1"));
        }
        if self.main_trials == 0 {
            return Err(ConfigError::Invalid("main_trials must be at least 1"));
        }
        if self.instruction_screens == 0 {
            return Err(ConfigError::Invalid("instruction_screens must be at least 1"));
        }
        if self.response_timeout_ms == 0 {
            return Err(ConfigError::Invalid("response_timeout_ms must be positive"));
        }
        Ok(())
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn trials_for(&self, block: Block) -> usize {
        match block {
            Block::Practice => self.practice_trials,
            Block::Main => self.main_trials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = ExperimentConfig::from_json_str(r#"{ "main_trials": 8 }"#).unwrap();
        assert_eq!(config.main_trials, 8);
        assert_eq!(config.practice_trials, 10);
        assert_eq!(config.cue_display_ms, 350);
        assert_eq!(config.response_timeout(), Duration::from_millis(2000));
    }

    #[test]
    fn zero_trials_are_rejected() {
        let err = ExperimentConfig::from_json_str(r#"{ "practice_trials": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ExperimentConfig::from_json_str("{ main_trials").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "cue_delay_ms": 600 }"#).unwrap();
        let config = ExperimentConfig::from_json_file(&path).unwrap();
        assert_eq!(config.cue_delay_ms, 600);

        let err = ExperimentConfig::from_json_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
