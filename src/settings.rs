// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use std::{fs, path::Path};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What GJK reports when it runs out of iterations before deciding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonConvergencePolicy {
    /// Hand the unfinished simplex to EPA and report an intersection.
    #[default]
    AssumeIntersection,
    /// Fail with `CollisionError::NonConvergence`.
    Report,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GjkSettings {
    pub max_iterations: usize,
    pub initial_direction: DVec3,
    pub non_convergence: NonConvergencePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpaSettings {
    pub max_iterations: usize,
    /// Minimum growth of the polytope along the closest face normal to keep expanding.
    pub tolerance: f64,
    /// Distance from the origin of points added to promote a line or triangle simplex.
    pub synthetic_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrowPhaseSettings {
    pub parallel: bool,
    pub aabb_precheck: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    pub gjk: GjkSettings,
    pub epa: EpaSettings,
    pub narrow_phase: NarrowPhaseSettings,
}

impl Default for GjkSettings {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            initial_direction: DVec3::ONE,
            non_convergence: NonConvergencePolicy::AssumeIntersection,
        }
    }
}

impl Default for EpaSettings {
    fn default() -> Self {
        Self {
            max_iterations: 64,
            tolerance: 1e-5,
            synthetic_offset: 1e-5,
        }
    }
}

impl Default for NarrowPhaseSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            aabb_precheck: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deserialization Error: {0}")]
    Serde(#[from] toml::de::Error),

    #[error("Serialization Error: {0}")]
    SerdeSer(#[from] toml::ser::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

impl CollisionSettings {
    /// Parses settings from TOML text. Missing keys take their default values.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: CollisionSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a specified file path.
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Saves settings to a specified file path, ensuring the directory exists.
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.gjk.max_iterations == 0 {
            return Err(SettingsError::Invalid(
                "gjk.max_iterations must be at least 1".into(),
            ));
        }
        if !self.gjk.initial_direction.is_finite()
            || self.gjk.initial_direction.length_squared() == 0.0
        {
            return Err(SettingsError::Invalid(
                "gjk.initial_direction must be a finite, nonzero vector".into(),
            ));
        }
        if self.epa.max_iterations == 0 {
            return Err(SettingsError::Invalid(
                "epa.max_iterations must be at least 1".into(),
            ));
        }
        if !(self.epa.tolerance.is_finite() && self.epa.tolerance > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "epa.tolerance must be positive, got {}",
                self.epa.tolerance
            )));
        }
        if !(self.epa.synthetic_offset.is_finite() && self.epa.synthetic_offset > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "epa.synthetic_offset must be positive, got {}",
                self.epa.synthetic_offset
            )));
        }
        Ok(())
    }
}
