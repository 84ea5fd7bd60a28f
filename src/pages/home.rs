use leptos::prelude::*;
use log::info;

use crate::components::cross_reference::CrossReferenceExplorer;
use crate::context::AppContext;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let app = expect_context::<AppContext>();
	let center = RwSignal::new(app.default_center());
	let link = RwSignal::new(String::new());
	let example = app.deep_links.to_link(&app.default_center());
	let parser = app.deep_links.clone();

	// Malformed links are ignored; the explorer stays where it is.
	let open_link = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		let text = link.get_untracked();
		if parser.handle(&text, |reference| center.set(reference)) {
			info!("deep link opened {text}");
		}
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<CrossReferenceExplorer center=center fullscreen=true />
				<div class="graph-overlay">
					<h1>"Cross-References"</h1>
					<p class="subtitle">
						"Tap a verse to select it. Scroll to zoom. Drag background to pan."
					</p>
					<form on:submit=open_link>
						<input
							type="text"
							placeholder=example
							bind:value=link
						/>
						<button type="submit">"Open"</button>
					</form>
				</div>
			</div>
		</ErrorBoundary>
	}
}
