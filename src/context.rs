//! Services shared by the pages, provided once through Leptos context.

use std::sync::Arc;

use crate::components::cross_reference::{GraphSource, InMemoryCrossReferences, sample_cross_references};
use crate::config::ExplorerConfig;
use crate::scripture::{DeepLinkParser, VerseReference};

/// Everything a page needs, built once in [`crate::App`].
#[derive(Clone)]
pub struct AppContext {
	/// Validated explorer settings.
	pub config: ExplorerConfig,
	/// Where graphs are built.
	pub source: Arc<dyn GraphSource>,
	/// Parser for the configured deep-link scheme.
	pub deep_links: DeepLinkParser,
}

impl AppContext {
	/// Context over `source`, with a deep-link parser derived from `config`.
	pub fn new(config: ExplorerConfig, source: Arc<dyn GraphSource>) -> Self {
		let deep_links = DeepLinkParser::from_config(&config);
		Self {
			config,
			source,
			deep_links,
		}
	}

	/// Backed by the built-in cross-reference table.
	pub fn with_sample_data(config: ExplorerConfig) -> Self {
		let source = Arc::new(InMemoryCrossReferences::new(sample_cross_references(), &config));
		Self::new(config, source)
	}

	/// Verse the home page opens on.
	pub fn default_center(&self) -> VerseReference {
		VerseReference::new(&self.config.default_translation, "John", 3, 16)
	}
}
