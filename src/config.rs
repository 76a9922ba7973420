// src/config.rs
//! Per-template calibration constants and the customer registry.
//!
//! A template describes one known physical form layout: where the quantity
//! matrix sits on the page (percentage bounding box), how many printed row
//! and column slots the grid has, and the pixel offsets that compensate for
//! border bleed. Templates are selected by id so new layouts are a config
//! change, not a code change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::utils::error::ConfigError;

/// Default template id, matching the Hong Leong Yamaha delivery-instruction form.
pub const DEFAULT_TEMPLATE_ID: &str = "hlym-di";

/// Percentage bounding box of the quantity matrix on a page.
/// Vertical percentages are measured from the BOTTOM of the page
/// (the calibration convention of the source form), so `top_pct > bottom_pct`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PctBBox {
    pub x0_pct: f32,
    pub top_pct: f32,
    pub x1_pct: f32,
    pub bottom_pct: f32,
}

/// Calibration constants for one document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Calibration revision, bumped whenever constants are re-tuned.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Quantity-matrix region as percentages of the page dimensions.
    pub crop: PctBBox,

    /// Fixed number of printable row slots in the grid.
    pub expected_rows: usize,

    /// Fixed number of day columns in the firm sub-block.
    pub num_cols: usize,

    /// Pixel nudge applied to each row slot's top edge (positive moves down).
    #[serde(default = "default_row_top_offset")]
    pub row_top_offset: f32,

    /// Pixel nudge applied to each row slot's bottom edge (positive moves down).
    #[serde(default = "default_row_bottom_offset")]
    pub row_bottom_offset: f32,

    /// Fraction of a row slot's height occupied by the upper firm sub-block.
    #[serde(default = "default_firm_ratio")]
    pub firm_ratio: f32,

    /// Pixels trimmed inside the firm band from the top.
    #[serde(default)]
    pub firm_top_offset: i32,

    /// Pixels trimmed inside the firm band from the bottom.
    #[serde(default)]
    pub firm_bottom_offset: i32,

    /// Horizontal padding added to both sides of each column cell.
    #[serde(default = "default_col_pad")]
    pub col_pad: u32,
}

fn default_version() -> u32 {
    1
}
fn default_row_top_offset() -> f32 {
    2.0
}
fn default_row_bottom_offset() -> f32 {
    -2.0
}
fn default_firm_ratio() -> f32 {
    0.5
}
fn default_col_pad() -> u32 {
    3
}

impl Default for TemplateConfig {
    /// Legacy calibration of the HLYM delivery-instruction form.
    fn default() -> Self {
        Self {
            version: 1,
            crop: PctBBox {
                x0_pct: 0.285,
                top_pct: 0.75,
                x1_pct: 0.81,
                bottom_pct: 0.25,
            },
            expected_rows: 13,
            num_cols: 16,
            row_top_offset: 2.0,
            row_bottom_offset: -2.0,
            firm_ratio: 0.5,
            firm_top_offset: 0,
            firm_bottom_offset: 0,
            col_pad: 3,
        }
    }
}

impl TemplateConfig {
    /// Basic sanity checks; rejects configs that would make the grid degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expected_rows == 0 {
            return Err(ConfigError::Invalid("expected_rows must be >= 1".into()));
        }
        if self.num_cols == 0 {
            return Err(ConfigError::Invalid("num_cols must be >= 1".into()));
        }
        if !(0.0..=1.0).contains(&self.firm_ratio) {
            return Err(ConfigError::Invalid(format!(
                "firm_ratio {} outside [0, 1]",
                self.firm_ratio
            )));
        }
        let c = &self.crop;
        for (name, v) in [
            ("x0_pct", c.x0_pct),
            ("top_pct", c.top_pct),
            ("x1_pct", c.x1_pct),
            ("bottom_pct", c.bottom_pct),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ConfigError::Invalid(format!("crop.{name} {v} outside [0, 1]")));
            }
        }
        if c.x0_pct >= c.x1_pct {
            return Err(ConfigError::Invalid("crop.x0_pct must be < crop.x1_pct".into()));
        }
        // Bottom-origin convention: the visual top of the region has the larger pct.
        if c.top_pct <= c.bottom_pct {
            return Err(ConfigError::Invalid(
                "crop.top_pct must be > crop.bottom_pct (percentages measured from page bottom)".into(),
            ));
        }
        Ok(())
    }
}

/// One entry of the customer registry. Matching is substring containment
/// against the page text; registry order is the tie-break, so the list is
/// kept as a sequence rather than a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerEntry {
    pub name: String,
    pub code: String,
}

/// Ordered name -> code registry used to identify the customer on page one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerRegistry {
    pub entries: Vec<CustomerEntry>,
}

impl CustomerRegistry {
    /// First registry entry whose name occurs verbatim in `text`, in
    /// insertion order.
    pub fn lookup(&self, text: &str) -> Option<&CustomerEntry> {
        self.entries.iter().find(|e| text.contains(e.name.as_str()))
    }
}

/// Top-level extractor configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub customers: CustomerRegistry,
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateConfig>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(DEFAULT_TEMPLATE_ID.to_string(), TemplateConfig::default());
        Self {
            customers: CustomerRegistry {
                entries: vec![CustomerEntry {
                    name: "Hong Leong Yamaha Motor Sdn Bhd".to_string(),
                    code: "46829-P".to_string(),
                }],
            },
            templates,
        }
    }
}

impl ExtractorConfig {
    /// Loads a JSON config file and validates every template in it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        for (id, template) in &config.templates {
            template
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("template '{id}': {e}")))?;
        }
        Ok(config)
    }

    pub fn template(&self, id: &str) -> Result<&TemplateConfig, ConfigError> {
        self.templates
            .get(id)
            .ok_or_else(|| ConfigError::UnknownTemplate(id.to_string()))
    }
}
