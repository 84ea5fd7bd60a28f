use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::render;
use super::source::GraphSource;
use super::state::{ExploreRequest, ExplorerState, Phase};
use super::types::ConnectionType;
use crate::context::AppContext;
use crate::scripture::VerseReference;

fn canvas_point(canvas: Option<HtmlCanvasElement>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let rect = canvas?.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn touch_points(canvas: Option<HtmlCanvasElement>, ev: &TouchEvent) -> Vec<(f64, f64)> {
	let Some(canvas) = canvas else {
		return Vec::new();
	};
	let rect = canvas.get_bounding_client_rect();
	let touches = ev.touches();
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.map(|t| {
			(
				t.client_x() as f64 - rect.left(),
				t.client_y() as f64 - rect.top(),
			)
		})
		.collect()
}

fn spread(points: &[(f64, f64)]) -> Option<f64> {
	match points {
		[a, b, ..] => Some((a.0 - b.0).hypot(a.1 - b.1)),
		_ => None,
	}
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(
		dim(window.inner_width(), 800.0),
		dim(window.inner_height(), 600.0),
	)
}

/// Interactive cross-reference graph for `center`. Re-centering (a new
/// `center` or "Explore from here") replaces the whole snapshot.
#[component]
pub fn CrossReferenceExplorer(
	/// Verse to explore from. Every change starts a new build.
	#[prop(into)]
	center: Signal<VerseReference>,
	/// Size the canvas to the window and follow resizes.
	#[prop(default = false)]
	fullscreen: bool,
	/// Canvas width; the parent's width when unset.
	#[prop(default = None)]
	width: Option<f64>,
	/// Canvas height; the parent's height when unset.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let app = expect_context::<AppContext>();
	let state = RwSignal::new(ExplorerState::new(
		&app.config,
		width.unwrap_or(800.0),
		height.unwrap_or(600.0),
	));
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let stopped = Arc::new(AtomicBool::new(false));

	let source = app.source.clone();
	let run = move |request: ExploreRequest| {
		let source = source.clone();
		spawn_local(async move {
			let result = source.build_graph(&request.center, request.depth).await;
			let _ = state.try_update(|s| s.complete(request.seq, result));
		});
	};

	let run_center = run.clone();
	Effect::new(move |_| {
		let center = center.get();
		let mut request = None;
		state.update(|s| request = Some(s.begin_explore(center)));
		if let Some(request) = request {
			run_center(request);
		}
	});

	let stopped_cleanup = stopped.clone();
	on_cleanup(move || stopped_cleanup.store(true, Ordering::Relaxed));

	let (animate_init, resize_cb_init) = (animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if animate_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		state.update(|s| s.resize(w, h));

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("canvas has no 2d context");
			return;
		};

		if fullscreen {
			let canvas_resize = canvas.clone();
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				let _ = state.try_update(|s| s.resize(nw, nh));
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (animate_inner, stopped_anim) = (animate_init.clone(), stopped.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if stopped_anim.load(Ordering::Relaxed) {
				debug!("explorer unmounted, stopping render loop");
				return;
			}
			state.try_with_untracked(|s| render::render(s, &ctx));
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref.get_untracked(), &ev) {
			state.update(|s| {
				let target = s.press(x, y);
				debug!("press at ({x:.0}, {y:.0}): {target:?}");
			});
		}
	};

	let on_mousemove = move |ev: MouseEvent| {
		if !state.with_untracked(|s| s.pan.active) {
			return;
		}
		if let Some((x, y)) = canvas_point(canvas_ref.get_untracked(), &ev) {
			state.update(|s| s.pan_to(x, y));
		}
	};

	let on_mouseup = move |_: MouseEvent| state.update(ExplorerState::end_pan);

	let on_mouseleave = move |_: MouseEvent| {
		if state.with_untracked(|s| s.pan.active) {
			state.update(ExplorerState::end_pan);
		}
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		match canvas_point(canvas_ref.get_untracked(), &ev) {
			Some((x, y)) => state.update(|s| s.zoom_at(factor, x, y)),
			None => state.update(|s| s.zoom_by(factor)),
		}
	};

	// One finger taps and pans, two fingers pinch.
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let points = touch_points(canvas_ref.get_untracked(), &ev);
		match points.as_slice() {
			[(x, y)] => state.update(|s| {
				let target = s.press(*x, *y);
				debug!("touch at ({x:.0}, {y:.0}): {target:?}");
			}),
			_ => {
				if let Some(d) = spread(&points) {
					state.update(|s| s.pinch(d));
				}
			}
		}
	};

	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let points = touch_points(canvas_ref.get_untracked(), &ev);
		match points.as_slice() {
			[(x, y)] => {
				if state.with_untracked(|s| s.pan.active) {
					state.update(|s| s.pan_to(*x, *y));
				}
			}
			_ => {
				if let Some(d) = spread(&points) {
					state.update(|s| s.pinch(d));
				}
			}
		}
	};

	let on_touchend = move |ev: TouchEvent| {
		let remaining = ev.touches().length();
		state.update(|s| {
			s.end_magnify();
			if remaining == 0 {
				s.end_pan();
			}
		});
	};

	let chips = ConnectionType::ALL
		.into_iter()
		.map(|kind| {
			let active = move || state.with(|s| s.filter.is_visible(kind));
			view! {
				<button
					class="filter-chip"
					class:active=active
					style=format!("border-color: {};", kind.color())
					on:click=move |_| {
						state.update(|s| {
							s.toggle_connection_type(kind);
						})
					}
				>
					{kind.label()}
				</button>
			}
		})
		.collect_view();

	let status = move || match state.with(|s| s.phase) {
		Phase::Loading { .. } => {
			view! { <div class="explorer-status">"Loading cross-references..."</div> }.into_any()
		}
		Phase::Empty => view! {
			<div class="explorer-empty">
				<h2>"No cross-references"</h2>
				<p>"Nothing links to this verse yet. Try another one."</p>
			</div>
		}
		.into_any(),
		Phase::Idle | Phase::Populated => ().into_any(),
	};

	let run_selected = run.clone();
	let details = move || {
		let (node, connection) = state.with(|s| {
			(
				s.selected_node().cloned(),
				s.selected_connection().cloned(),
			)
		});
		if let Some(node) = node {
			let run = run_selected.clone();
			view! {
				<div class="explorer-details">
					<h2>{node.key.clone()}</h2>
					<p>{node.testament.label()}</p>
					<button on:click=move |_| {
						let mut request = None;
						state.update(|s| request = s.explore_selected());
						if let Some(request) = request {
							run(request);
						}
					}>"Explore from here"</button>
				</div>
			}
			.into_any()
		} else if let Some(connection) = connection {
			view! {
				<div class="explorer-details">
					<h2>{format!("{} \u{2192} {}", connection.source, connection.target)}</h2>
					<p>{format!("{} ({:?})", connection.kind.label(), connection.strength)}</p>
				</div>
			}
			.into_any()
		} else {
			().into_any()
		}
	};

	let zoom_label = move || format!("{:.0}%", state.with(|s| s.transform.scale) * 100.0);

	view! {
		<div class="explorer">
			<canvas
				node_ref=canvas_ref
				class="explorer-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:touchstart=on_touchstart
				on:touchmove=on_touchmove
				on:touchend=on_touchend
				on:touchcancel=on_touchend
				style="display: block; cursor: grab; touch-action: none;"
			/>
			<div class="explorer-filters">{chips}</div>
			{status}
			{details}
			<div class="explorer-controls">
				<span class="explorer-zoom">{zoom_label}</span>
				<button on:click=move |_| state.update(ExplorerState::recenter)>"Recenter"</button>
			</div>
		</div>
	}
}
