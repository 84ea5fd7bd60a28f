//! Bible cross-reference explorer: Leptos client-side app wiring and routes,
//! plus the verse-reference, deep-link and conversation-archive libraries it
//! is built on.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
pub mod components;
pub mod config;
pub mod context;
pub mod conversations;
mod pages;
pub mod scripture;

// Top-Level pages
use crate::config::ExplorerConfig;
use crate::context::AppContext;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;
use crate::pages::verse::VersePage;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the explorer, verse deep links and handles 404's
#[component]
pub fn App(
	/// Explorer settings. Defaults are used when absent or invalid.
	#[prop(optional)]
	config: Option<ExplorerConfig>,
) -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();
	provide_context(AppContext::with_sample_data(
		config.unwrap_or_default().validated_or_default(),
	));

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Scripture Explorer" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/verse/:book/:chapter/:verse") view=VersePage />
			</Routes>
		</Router>
	}
}
