use crate::constants::{CLICK_THRESHOLD_PX, RESIZE_HANDLE_PX, VIEWPORT_FILL};
use crate::consistency::FormatClass;
use crate::geometry::ScaleRange;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Maps a persisted `formatCodeId` onto a consistency classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCodeMapping {
    pub code: String,
    pub class: FormatClass,
}

impl FormatCodeMapping {
    pub fn new(code: impl Into<String>, class: FormatClass) -> Self {
        Self {
            code: code.into(),
            class,
        }
    }
}

/// Tunable engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    // Rendering
    pub scale_range: ScaleRange,
    pub viewport_fill: f64,

    // Pointer interaction
    pub click_threshold_px: f64,
    pub resize_handle_px: f64,

    // Consistency classifiers
    pub format_codes: Vec<FormatCodeMapping>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            scale_range: ScaleRange::default(),
            viewport_fill: VIEWPORT_FILL,
            click_threshold_px: CLICK_THRESHOLD_PX,
            resize_handle_px: RESIZE_HANDLE_PX,
            format_codes: vec![
                FormatCodeMapping::new("name", FormatClass::Name),
                FormatCodeMapping::new("nationalId", FormatClass::NationalId),
                FormatCodeMapping::new("phone", FormatClass::Phone),
            ],
        }
    }
}

impl EngineOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| SignError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SignError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Classifier configured for a format code
    pub fn classify(&self, format_code: &str) -> Option<FormatClass> {
        self.format_codes
            .iter()
            .find(|m| m.code == format_code)
            .map(|m| m.class)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let range = self.scale_range;
        if !(range.min.is_finite() && range.max.is_finite()) || range.min <= 0.0 {
            return Err(SignError::Config(
                "Scale bounds must be positive numbers".to_string(),
            ));
        }
        if range.min > range.max {
            return Err(SignError::Config(format!(
                "Minimum scale {} exceeds maximum scale {}",
                range.min, range.max
            )));
        }

        if !(self.viewport_fill > 0.0 && self.viewport_fill <= 1.0) {
            return Err(SignError::Config(
                "Viewport fill must be in (0, 1]".to_string(),
            ));
        }

        if !(self.click_threshold_px.is_finite() && self.click_threshold_px >= 0.0) {
            return Err(SignError::Config(
                "Click threshold must not be negative".to_string(),
            ));
        }

        if !(self.resize_handle_px.is_finite() && self.resize_handle_px > 0.0) {
            return Err(SignError::Config(
                "Resize handle size must be positive".to_string(),
            ));
        }

        for (i, mapping) in self.format_codes.iter().enumerate() {
            if mapping.code.trim().is_empty() {
                return Err(SignError::Config(format!(
                    "Format code mapping {} has an empty code",
                    i
                )));
            }
            if self.format_codes[..i].iter().any(|m| m.code == mapping.code) {
                return Err(SignError::Config(format!(
                    "Format code {:?} is mapped more than once",
                    mapping.code
                )));
            }
        }

        Ok(())
    }
}
