//! Monitor configuration.

use crate::error::{Error, Result};
use gridview_core::NodeSizes;
use gridview_layout::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status polling period of the gateway dashboard.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridviewConfig {
    pub poll_interval_ms: u64,
    pub layout: LayoutConfig,
    pub node_sizes: NodeSizes,
}

impl Default for GridviewConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            layout: LayoutConfig::default(),
            node_sizes: NodeSizes::default(),
        }
    }
}

impl GridviewConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::config("poll_interval_ms must be positive"));
        }
        let l = &self.layout;
        for (name, value) in [
            ("layout.node_sep", l.node_sep),
            ("layout.rank_sep", l.rank_sep),
            ("layout.margin_x", l.margin_x),
            ("layout.margin_y", l.margin_y),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::config(format!("{name} must be a non-negative number")));
            }
        }
        let s = &self.node_sizes;
        for (name, size) in [
            ("node_sizes.gateway", s.gateway),
            ("node_sizes.worker", s.worker),
            ("node_sizes.resource", s.resource),
        ] {
            if !(size.width.is_finite() && size.width > 0.0) {
                return Err(Error::config(format!("{name}.width must be positive")));
            }
            if !(size.height.is_finite() && size.height > 0.0) {
                return Err(Error::config(format!("{name}.height must be positive")));
            }
        }
        Ok(())
    }
}
