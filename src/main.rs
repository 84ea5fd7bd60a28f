//! Browser entry point: mounts the explorer app.

use leptos::prelude::*;
use scripture_explorer::{App, init_logging};

fn main() {
	init_logging();

	leptos::mount::mount_to_body(|| {
		view! { <App /> }
	})
}
