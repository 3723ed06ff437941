// THEORY:
// `PipelineConfig` is loaded once, validated once, and never changes while a
// session runs. Every field has a default taken from a working camera setup, so
// a config file only needs to name what it overrides.
//
// Sources, lowest priority first:
// 1.  built-in defaults (`#[serde(default)]`)
// 2.  an optional file; TOML, JSON or YAML, picked by extension
// 3.  environment variables prefixed `FIRE_VISION__`, e.g. `FIRE_VISION__MIN_AREA=800`

use crate::core_modules::color_segmenter::ColorBand;
use crate::core_modules::confidence_scorer::DEFAULT_REFERENCE_AREA_FRACTION;
use crate::core_modules::mask_cleaner::DEFAULT_KERNEL_RADIUS;
use crate::error::{ConfigurationError, VisionError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const ENV_PREFIX: &str = "FIRE_VISION";
const HUE_LIMIT: u8 = 180;

/// Configuration for the `FirePipeline`, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Expected frame width in pixels; frames of any other size are rejected.
    pub image_width: u32,
    /// Expected frame height in pixels.
    pub image_height: u32,
    /// HSV ranges treated as fire-colored. A pixel matching any one is a candidate.
    pub color_bands: Vec<ColorBand>,
    /// Smallest region, in pixels, that counts as a detection.
    pub min_area: u32,
    /// Consecutive positive frames required to raise the alarm.
    pub consecutive_frames_to_arm: u32,
    /// Consecutive negative frames required to return to normal.
    pub cooldown_frames_to_disarm: u32,
    /// Radius of the square morphology neighborhood (1 means 3x3).
    pub kernel_radius: u32,
    /// Fraction of the frame area that maps to a confidence of 1.0.
    pub reference_area_fraction: f64,
    /// Flip frames horizontally before analysis.
    pub mirror: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            image_width: 640,
            image_height: 480,
            color_bands: ColorBand::fire_defaults(),
            min_area: 500,
            consecutive_frames_to_arm: 1,
            cooldown_frames_to_disarm: 30,
            kernel_radius: DEFAULT_KERNEL_RADIUS,
            reference_area_fraction: DEFAULT_REFERENCE_AREA_FRACTION,
            mirror: false,
        }
    }
}

impl PipelineConfig {
    /// Layers the optional file and the environment over the defaults, then validates.
    pub fn load(path: Option<&Path>) -> Result<Self, VisionError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config: PipelineConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        info!(
            width = config.image_width,
            height = config.image_height,
            bands = config.color_bands.len(),
            min_area = config.min_area,
            arm = config.consecutive_frames_to_arm,
            cooldown = config.cooldown_frames_to_disarm,
            "Loaded pipeline configuration"
        );
        Ok(config)
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(ConfigurationError::ZeroFrameDimensions {
                width: self.image_width,
                height: self.image_height,
            });
        }
        if self.color_bands.is_empty() {
            return Err(ConfigurationError::EmptyBandList);
        }
        for band in &self.color_bands {
            Self::validate_band(band)?;
        }
        if self.min_area == 0 {
            return Err(ConfigurationError::NonPositiveThreshold("min_area"));
        }
        if self.consecutive_frames_to_arm == 0 {
            return Err(ConfigurationError::NonPositiveThreshold(
                "consecutive_frames_to_arm",
            ));
        }
        if self.cooldown_frames_to_disarm == 0 {
            return Err(ConfigurationError::NonPositiveThreshold(
                "cooldown_frames_to_disarm",
            ));
        }
        if !(self.reference_area_fraction > 0.0 && self.reference_area_fraction <= 1.0) {
            return Err(ConfigurationError::NonPositiveThreshold(
                "reference_area_fraction",
            ));
        }
        Ok(())
    }

    fn validate_band(band: &ColorBand) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidBand {
            name: band.name.clone(),
            reason,
        };

        if band.upper[0] > HUE_LIMIT {
            return Err(invalid(format!(
                "upper hue {} exceeds {HUE_LIMIT}",
                band.upper[0]
            )));
        }
        for (channel, (lower, upper)) in ["hue", "saturation", "value"]
            .iter()
            .zip(band.lower.iter().zip(band.upper.iter()))
        {
            if lower > upper {
                return Err(invalid(format!(
                    "lower {channel} {lower} is above upper {channel} {upper}"
                )));
            }
        }
        Ok(())
    }

    pub fn frame_area(&self) -> u64 {
        self.image_width as u64 * self.image_height as u64
    }
}
