//! Engine configuration.

use crate::canvas::SizePx;
use serde::{Deserialize, Serialize};

/// Tunable parameters for the composition engine.
///
/// All values have sensible defaults; a `Default` instance is what the
/// application ships with unless the host overrides it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Lower bound for the canvas viewport zoom factor.
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,
    /// Upper bound for the canvas viewport zoom factor.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,
    /// Zoom change applied per wheel/scroll event.
    #[serde(default = "default_wheel_zoom_step")]
    pub wheel_zoom_step: f32,
    /// Size given to newly placed canvas items, in canvas pixels.
    #[serde(default = "default_item_size")]
    pub default_item_size: SizePx,
}

fn default_min_zoom() -> f32 {
    0.25
}

fn default_max_zoom() -> f32 {
    4.0
}

fn default_wheel_zoom_step() -> f32 {
    0.1
}

fn default_item_size() -> SizePx {
    SizePx {
        width: 160.0,
        height: 160.0,
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            wheel_zoom_step: default_wheel_zoom_step(),
            default_item_size: default_item_size(),
        }
    }
}

impl EngineConfig {
    /// Clamps a zoom factor into the configured range.
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.min_zoom, 0.25);
        assert_eq!(config.max_zoom, 4.0);
        assert_eq!(config.wheel_zoom_step, 0.1);
    }

    #[test]
    fn test_clamp_zoom() {
        let config = EngineConfig::default();
        assert_eq!(config.clamp_zoom(0.01), 0.25);
        assert_eq!(config.clamp_zoom(10.0), 4.0);
        assert_eq!(config.clamp_zoom(1.5), 1.5);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"maxZoom": 3.0}"#).unwrap();
        assert_eq!(config.max_zoom, 3.0);
        assert_eq!(config.min_zoom, 0.25);
    }
}
