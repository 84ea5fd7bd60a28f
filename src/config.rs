//! Explorer configuration.
//!
//! Everything has a default so a partial JSON document is enough:
//!
//! ```json
//! { "default_depth": 3, "max_nodes": 64 }
//! ```

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
	/// Not valid JSON for [`ExplorerConfig`].
	#[error("Invalid config JSON: {0}")]
	Parse(#[from] serde_json::Error),

	/// Zoom bounds that cannot clamp anything.
	#[error("Invalid scale bounds: min {min} must be positive and not above max {max}")]
	ScaleBounds {
		/// Configured lower bound.
		min: f64,
		/// Configured upper bound.
		max: f64,
	},

	/// A zero node cap.
	#[error("max_nodes must be at least 1")]
	MaxNodes,

	/// Blank deep-link scheme.
	#[error("Deep link scheme must not be empty")]
	EmptyScheme,
}

/// Explorer settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
	/// Traversal depth used for every build.
	pub default_depth: u32,
	/// Upper bound on nodes in one graph snapshot, center included.
	pub max_nodes: usize,
	/// Smallest zoom factor.
	pub min_scale: f64,
	/// Largest zoom factor.
	pub max_scale: f64,
	/// Scheme of `{scheme}://verse/...` links.
	pub deep_link_scheme: String,
	/// Translation for links that do not name one.
	pub default_translation: String,
	/// Radius step between BFS rings, in layout units.
	pub ring_spacing: f64,
	/// Force-simulation steps applied after ring layout; 0 keeps the rings.
	pub relax_steps: u32,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			default_depth: 2,
			max_nodes: 48,
			min_scale: 0.5,
			max_scale: 2.0,
			deep_link_scheme: "app".into(),
			default_translation: "engKJV".into(),
			ring_spacing: 140.0,
			relax_steps: 120,
		}
	}
}

impl ExplorerConfig {
	/// Parses and validates a (possibly partial) JSON document.
	pub fn from_json(text: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks the invariants the explorer relies on.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
			return Err(ConfigError::ScaleBounds {
				min: self.min_scale,
				max: self.max_scale,
			});
		}
		if self.max_nodes == 0 {
			return Err(ConfigError::MaxNodes);
		}
		if self.deep_link_scheme.trim().is_empty() {
			return Err(ConfigError::EmptyScheme);
		}
		Ok(())
	}

	/// `self` if valid, otherwise the defaults.
	pub fn validated_or_default(self) -> Self {
		match self.validate() {
			Ok(()) => self,
			Err(err) => {
				warn!("invalid explorer config, using defaults: {err}");
				Self::default()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config = ExplorerConfig::from_json(r#"{ "default_depth": 3 }"#).unwrap();
		assert_eq!(config.default_depth, 3);
		assert_eq!(config.min_scale, 0.5);
		assert_eq!(config.max_scale, 2.0);
		assert_eq!(config.deep_link_scheme, "app");
	}

	#[test]
	fn rejects_inverted_scale_bounds() {
		let err = ExplorerConfig::from_json(r#"{ "min_scale": 3.0 }"#).unwrap_err();
		assert!(matches!(err, ConfigError::ScaleBounds { .. }));
	}

	#[test]
	fn invalid_config_falls_back_to_defaults() {
		let inverted = ExplorerConfig {
			min_scale: 3.0,
			max_scale: 1.0,
			..ExplorerConfig::default()
		};
		assert_eq!(inverted.validated_or_default(), ExplorerConfig::default());

		let deeper = ExplorerConfig {
			default_depth: 4,
			..ExplorerConfig::default()
		};
		assert_eq!(deeper.clone().validated_or_default(), deeper);
	}

	#[test]
	fn rejects_garbage() {
		assert!(matches!(
			ExplorerConfig::from_json("{ nope"),
			Err(ConfigError::Parse(_))
		));
	}
}
