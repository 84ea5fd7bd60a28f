use leptos::prelude::*;
use leptos_router::hooks::{use_params_map, use_query_map};
use log::debug;

use crate::components::cross_reference::CrossReferenceExplorer;
use crate::context::AppContext;

/// `/verse/:book/:chapter/:verse?translation=...`, the web form of the
/// `app://verse/...` deep link.
#[component]
pub fn VersePage() -> impl IntoView {
	let app = expect_context::<AppContext>();
	let params = use_params_map();
	let query = use_query_map();
	let parser = app.deep_links.clone();

	let reference = Memo::new(move |_| {
		let (params, query) = (params.get(), query.get());
		let part = |name: &str| params.get(name).unwrap_or_default();
		let translation = query.get("translation");
		parser
			.resolve(
				&part("book"),
				&part("chapter"),
				&part("verse"),
				translation.as_deref(),
			)
			.inspect_err(|err| debug!("verse route rejected: {err}"))
			.ok()
	});

	move || match reference.get() {
		Some(center) => {
			let title = center.to_string();
			view! {
				<div class="fullscreen-graph">
					<CrossReferenceExplorer center=Signal::stored(center) fullscreen=true />
					<div class="graph-overlay">
						<h1>{title}</h1>
					</div>
				</div>
			}
			.into_any()
		}
		None => view! {
			<h1>"Unknown verse"</h1>
			<p>"That link does not name a book, chapter and verse."</p>
		}
		.into_any(),
	}
}
