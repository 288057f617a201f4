/// Runtime settings, read from the environment.

use std::path::PathBuf;

use crate::error::{Result, RunnerError};

pub const SEED_VAR: &str = "GLAM_RUNNER_SEED";
pub const FINISH_VAR: &str = "GLAM_RUNNER_FINISH";
pub const LOG_VAR: &str = "GLAM_RUNNER_LOG";
pub const SCORE_FILE_VAR: &str = "GLAM_RUNNER_SCORE_FILE";

const DEFAULT_SCORE_FILE: &str = ".glam_runner_score";

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    /// Distance at which a run counts as won.  No finish line when unset.
    pub finish_distance: Option<f32>,
    pub log_file: Option<PathBuf>,
    pub score_file: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seed = match lookup(SEED_VAR) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                RunnerError::InvalidSetting {
                    key: SEED_VAR,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let finish_distance = match lookup(FINISH_VAR) {
            Some(raw) => Some(parse_finish(&raw)?),
            None => None,
        };

        let score_file = lookup(SCORE_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = lookup("HOME").unwrap_or_else(|| ".".to_string());
                PathBuf::from(home).join(DEFAULT_SCORE_FILE)
            });

        Ok(Settings {
            seed,
            finish_distance,
            log_file: lookup(LOG_VAR).map(PathBuf::from),
            score_file,
        })
    }
}

fn parse_finish(raw: &str) -> Result<f32> {
    let invalid = |reason: String| RunnerError::InvalidSetting {
        key: FINISH_VAR,
        value: raw.to_string(),
        reason,
    };
    let distance = raw.trim().parse::<f32>().map_err(|e| invalid(e.to_string()))?;
    if !distance.is_finite() || distance <= 0.0 {
        return Err(invalid("must be a positive distance".to_string()));
    }
    Ok(distance)
}
