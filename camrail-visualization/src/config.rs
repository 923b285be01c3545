//! Walk-through settings
//!
//! Every field has its own default, so a partial TOML file only overrides
//! what it names. A missing file yields the defaults.

use camrail_algorithms::{InterpolationParams, DEFAULT_FRAME_RATE, DEFAULT_INTERPOLATION_SPEED};
use camrail_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Settings of the walk-through tool, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkThroughConfig {
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    #[serde(default = "default_interpolation_speed")]
    pub interpolation_speed: f32,

    #[serde(default = "default_factor")]
    pub height_factor: f32,

    #[serde(default = "default_factor")]
    pub third_person_forward_factor: f32,

    /// Character height as a fraction of the scene radius
    #[serde(default = "default_character_height_ratio")]
    pub character_height_ratio: f32,

    /// Duration of an animated move to a keyframe; zero or less snaps
    #[serde(default = "default_glide_duration_secs")]
    pub glide_duration_secs: f32,

    /// Record bit rate in kbit/s
    #[serde(default = "default_bit_rate")]
    pub bit_rate: u32,

    #[serde(default = "default_true")]
    pub walking_mode: bool,

    #[serde(default = "default_true")]
    pub path_visible: bool,

    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}
fn default_interpolation_speed() -> f32 {
    DEFAULT_INTERPOLATION_SPEED
}
fn default_factor() -> f32 {
    1.0
}
fn default_character_height_ratio() -> f32 {
    0.1
}
fn default_glide_duration_secs() -> f32 {
    0.5
}
fn default_bit_rate() -> u32 {
    8000
}
fn default_true() -> bool {
    true
}

impl Default for WalkThroughConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            interpolation_speed: default_interpolation_speed(),
            height_factor: default_factor(),
            third_person_forward_factor: default_factor(),
            character_height_ratio: default_character_height_ratio(),
            glide_duration_secs: default_glide_duration_secs(),
            bit_rate: default_bit_rate(),
            walking_mode: true,
            path_visible: true,
            show_progress: true,
        }
    }
}

impl WalkThroughConfig {
    /// Load the config at `path`, falling back to defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s)
                .map_err(|e| Error::Config(format!("parse {}: {}", path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: WalkThroughConfig = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.interpolation_params().validate()?;
        let positive = [
            ("height_factor", self.height_factor),
            ("third_person_forward_factor", self.third_person_forward_factor),
            ("character_height_ratio", self.character_height_ratio),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidParameter(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.bit_rate == 0 {
            return Err(Error::InvalidParameter("bit_rate must be positive".to_string()));
        }
        Ok(())
    }

    pub fn interpolation_params(&self) -> InterpolationParams {
        InterpolationParams {
            frame_rate: self.frame_rate,
            interpolation_speed: self.interpolation_speed,
        }
    }
}
