use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{CENTER_RADIUS, ExplorerState, NODE_RADIUS, Selection};
use super::types::{VerseConnection, VerseNode};
use crate::scripture::Testament;

const BACKGROUND: &str = "#1a1a2e";
const SELECTED: &str = "#ffffff";

fn testament_color(testament: Testament) -> &'static str {
	match testament {
		Testament::Old => "#d4a373",
		Testament::New => "#5fa8d3",
	}
}

fn hex_rgba(hex: &str, alpha: f64) -> String {
	let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2).unwrap_or("ff"), 16).unwrap_or(255);
	format!("rgba({}, {}, {}, {})", channel(1), channel(3), channel(5), alpha)
}

pub fn render(state: &ExplorerState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_connections(state, ctx);
	draw_nodes(state, ctx);
}

fn draw_connections(state: &ExplorerState, ctx: &CanvasRenderingContext2d) {
	let Some(graph) = state.graph.as_ref() else {
		return;
	};
	let k = state.transform.scale;
	let (dash, gap) = (8.0 * k, 5.0 * k);

	for (idx, connection) in state.visible_connections() {
		let (Some(a), Some(b)) = (graph.node(&connection.source), graph.node(&connection.target))
		else {
			continue;
		};
		let selected = state.selection == Selection::Connection(idx);
		stroke_connection(state, ctx, connection, a, b, selected, (dash, gap));
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn stroke_connection(
	state: &ExplorerState,
	ctx: &CanvasRenderingContext2d,
	connection: &VerseConnection,
	a: &VerseNode,
	b: &VerseNode,
	selected: bool,
	(dash, gap): (f64, f64),
) {
	let (x1, y1) = state.to_screen(a.position);
	let (x2, y2) = state.to_screen(b.position);
	let k = state.transform.scale;
	let (alpha, width) = if selected {
		(1.0, (connection.strength.line_width() + 1.5) * k)
	} else {
		(connection.strength.opacity(), connection.strength.line_width() * k)
	};

	ctx.set_stroke_style_str(&hex_rgba(connection.kind.color(), alpha));
	ctx.set_line_width(width);
	if connection.kind.is_dashed() {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(x2, y2);
	ctx.stroke();
}

fn draw_nodes(state: &ExplorerState, ctx: &CanvasRenderingContext2d) {
	let Some(graph) = state.graph.as_ref() else {
		return;
	};
	let k = state.transform.scale;
	let font = format!("{}px sans-serif", (11.0 * k).max(8.0));

	for node in graph.nodes() {
		let (x, y) = state.to_screen(node.position);
		let is_center = node.key == graph.center;
		let radius = if is_center { CENTER_RADIUS } else { NODE_RADIUS } * k;
		let color = testament_color(node.testament);

		if is_center {
			let glow = radius * 1.8;
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.5, x, y, glow) {
				let _ = gradient.add_color_stop(0.0, &hex_rgba(color, 0.45));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(color);
		ctx.fill();

		if state.is_selected_node(&node.key) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 3.0 * k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(SELECTED);
			ctx.set_line_width(2.0 * k);
			ctx.stroke();
		}

		ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
		ctx.set_font(&font);
		let _ = ctx.fill_text(&node.key, x + radius + 4.0, y + 4.0);
	}
}
