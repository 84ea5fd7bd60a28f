use log::{debug, warn};

use super::filter::ConnectionFilter;
use super::source::BuildError;
use super::types::{ConnectionType, CrossReferenceGraph, Position, VerseConnection, VerseNode};
use crate::config::ExplorerConfig;
use crate::scripture::VerseReference;

pub const NODE_RADIUS: f64 = 16.0;
pub const CENTER_RADIUS: f64 = 22.0;
pub const HIT_RADIUS: f64 = 20.0;
/// Screen-space distance within which a press lands on a connection line.
pub const CONNECTION_HIT_TOLERANCE: f64 = 6.0;
/// A press that travels less than this is a tap, not a pan.
const TAP_SLOP: f64 = 3.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub offset_x: f64,
	pub offset_y: f64,
	pub scale: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			offset_x: 0.0,
			offset_y: 0.0,
			scale: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub offset_start_x: f64,
	pub offset_start_y: f64,
	moved: bool,
}

/// At most one thing is selected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	#[default]
	None,
	Node(String),
	/// Index into the graph's connection list.
	Connection(usize),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
	#[default]
	Idle,
	Loading {
		seq: u64,
	},
	Populated,
	/// Build failed or produced no nodes.
	Empty,
}

/// A build the caller must run and feed back through [`ExplorerState::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExploreRequest {
	pub seq: u64,
	pub center: VerseReference,
	pub depth: u32,
}

/// What a press landed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PressTarget {
	Node(String),
	Connection(usize),
	Background,
}

/// Everything the explorer canvas shows, plus the gesture bookkeeping behind it.
pub struct ExplorerState {
	pub graph: Option<CrossReferenceGraph>,
	pub center: Option<VerseReference>,
	pub phase: Phase,
	pub filter: ConnectionFilter,
	pub selection: Selection,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	visible: Vec<usize>,
	magnify_start: Option<f64>,
	pinch_start: Option<f64>,
	min_scale: f64,
	max_scale: f64,
	depth: u32,
	last_seq: u64,
}

impl ExplorerState {
	pub fn new(config: &ExplorerConfig, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: None,
			center: None,
			phase: Phase::Idle,
			filter: ConnectionFilter::default(),
			selection: Selection::None,
			transform: ViewTransform::default(),
			pan: PanState::default(),
			width,
			height,
			visible: Vec::new(),
			magnify_start: None,
			pinch_start: None,
			min_scale: config.min_scale,
			max_scale: config.max_scale,
			depth: config.default_depth,
			last_seq: 0,
		};
		state.transform.scale = state.clamp_scale(1.0);
		state
	}

	// -- loading ------------------------------------------------------------

	/// Starts a (re-)centering. The current snapshot and all view state are
	/// dropped; any build still in flight becomes stale.
	pub fn begin_explore(&mut self, center: VerseReference) -> ExploreRequest {
		self.last_seq += 1;
		debug!("explore #{} from {}", self.last_seq, center);
		self.phase = Phase::Loading { seq: self.last_seq };
		self.graph = None;
		self.visible.clear();
		self.reset_view();
		self.center = Some(center.clone());
		ExploreRequest {
			seq: self.last_seq,
			center,
			depth: self.depth,
		}
	}

	/// Applies a finished build. Returns `false` (and changes nothing) when a
	/// newer request has been issued since `seq`.
	pub fn complete(
		&mut self,
		seq: u64,
		result: Result<CrossReferenceGraph, BuildError>,
	) -> bool {
		if seq != self.last_seq || !self.is_loading() {
			debug!("discarding stale build #{seq} (latest #{})", self.last_seq);
			return false;
		}
		match result {
			Ok(graph) if !graph.is_empty() => {
				self.visible = self.filter.apply(&graph);
				self.graph = Some(graph);
				self.reset_view();
				self.phase = Phase::Populated;
			}
			Ok(_) => {
				self.phase = Phase::Empty;
			}
			Err(err) => {
				warn!("graph build #{seq} failed: {err}");
				self.phase = Phase::Empty;
			}
		}
		true
	}

	pub fn is_loading(&self) -> bool {
		matches!(self.phase, Phase::Loading { .. })
	}

	/// Re-centers on the selected node, keeping the current translation.
	pub fn explore_selected(&mut self) -> Option<ExploreRequest> {
		let node = self.selected_node()?;
		let translation = self
			.center
			.as_ref()
			.map(|c| c.translation.clone())
			.unwrap_or_default();
		let reference = VerseReference::new(translation, &node.book, node.chapter, node.verse);
		Some(self.begin_explore(reference))
	}

	fn reset_view(&mut self) {
		self.selection = Selection::None;
		self.pan = PanState::default();
		self.magnify_start = None;
		self.pinch_start = None;
		self.transform = ViewTransform {
			scale: self.clamp_scale(1.0),
			..ViewTransform::default()
		};
	}

	// -- filtering ----------------------------------------------------------

	pub fn toggle_connection_type(&mut self, kind: ConnectionType) -> bool {
		let shown = self.filter.toggle(kind);
		self.visible = self
			.graph
			.as_ref()
			.map(|g| self.filter.apply(g))
			.unwrap_or_default();
		if let Selection::Connection(idx) = self.selection {
			if !self.visible.contains(&idx) {
				self.selection = Selection::None;
			}
		}
		shown
	}

	pub fn visible_connections(&self) -> impl Iterator<Item = (usize, &VerseConnection)> {
		let connections = self.graph.as_ref().map(|g| g.connections()).unwrap_or(&[]);
		self.visible
			.iter()
			.filter_map(move |&i| connections.get(i).map(|c| (i, c)))
	}

	// -- selection ----------------------------------------------------------

	pub fn select_node(&mut self, key: &str) -> bool {
		match &self.graph {
			Some(graph) if graph.node(key).is_some() => {
				self.selection = Selection::Node(key.to_string());
				true
			}
			_ => false,
		}
	}

	/// Only visible connections can be selected.
	pub fn select_connection(&mut self, idx: usize) -> bool {
		if self.visible.contains(&idx) {
			self.selection = Selection::Connection(idx);
			true
		} else {
			false
		}
	}

	pub fn clear_selection(&mut self) {
		self.selection = Selection::None;
	}

	pub fn selected_node(&self) -> Option<&VerseNode> {
		match &self.selection {
			Selection::Node(key) => self.graph.as_ref()?.node(key),
			_ => None,
		}
	}

	pub fn selected_connection(&self) -> Option<&VerseConnection> {
		match self.selection {
			Selection::Connection(idx) => self.graph.as_ref()?.connections().get(idx),
			_ => None,
		}
	}

	pub fn is_selected_node(&self, key: &str) -> bool {
		matches!(&self.selection, Selection::Node(k) if k == key)
	}

	// -- geometry -----------------------------------------------------------

	pub fn to_screen(&self, position: Position) -> (f64, f64) {
		(
			self.width / 2.0 + position.x * self.transform.scale + self.transform.offset_x,
			self.height / 2.0 + position.y * self.transform.scale + self.transform.offset_y,
		)
	}

	/// Nearest node whose disc contains the point.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<String> {
		let graph = self.graph.as_ref()?;
		let reach = HIT_RADIUS * self.transform.scale;
		graph
			.nodes()
			.map(|n| {
				let (x, y) = self.to_screen(n.position);
				(n, (x - sx).hypot(y - sy))
			})
			.filter(|&(_, d)| d <= reach)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(n, _)| n.key.clone())
	}

	/// Nearest visible connection line within tolerance of the point.
	pub fn connection_at(&self, sx: f64, sy: f64) -> Option<usize> {
		let graph = self.graph.as_ref()?;
		self.visible_connections()
			.filter_map(|(i, c)| {
				let a = self.to_screen(graph.node(&c.source)?.position);
				let b = self.to_screen(graph.node(&c.target)?.position);
				Some((i, segment_distance((sx, sy), a, b)))
			})
			.filter(|&(_, d)| d <= CONNECTION_HIT_TOLERANCE)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| i)
	}

	// -- gestures -----------------------------------------------------------

	/// Nodes win over connections; anything else starts a pan.
	pub fn press(&mut self, x: f64, y: f64) -> PressTarget {
		if let Some(key) = self.node_at(x, y) {
			self.select_node(&key);
			return PressTarget::Node(key);
		}
		if let Some(idx) = self.connection_at(x, y) {
			self.select_connection(idx);
			return PressTarget::Connection(idx);
		}
		self.begin_pan(x, y);
		PressTarget::Background
	}

	pub fn begin_pan(&mut self, x: f64, y: f64) {
		self.pan = PanState {
			active: true,
			start_x: x,
			start_y: y,
			offset_start_x: self.transform.offset_x,
			offset_start_y: self.transform.offset_y,
			moved: false,
		};
	}

	/// Offset is not clamped; [`ExplorerState::recenter`] brings the graph back.
	pub fn pan_to(&mut self, x: f64, y: f64) {
		if !self.pan.active {
			return;
		}
		let (dx, dy) = (x - self.pan.start_x, y - self.pan.start_y);
		if dx.hypot(dy) > TAP_SLOP {
			self.pan.moved = true;
		}
		self.transform.offset_x = self.pan.offset_start_x + dx;
		self.transform.offset_y = self.pan.offset_start_y + dy;
	}

	/// Ends a pan. A press that never moved is a background tap and clears
	/// the selection.
	pub fn end_pan(&mut self) {
		if self.pan.active && !self.pan.moved {
			self.clear_selection();
		}
		self.pan = PanState::default();
	}

	/// Pinch factor relative to the scale when the gesture began.
	pub fn magnify(&mut self, value: f64) {
		if !value.is_finite() || value <= 0.0 {
			return;
		}
		let start = *self.magnify_start.get_or_insert(self.transform.scale);
		self.transform.scale = self.clamp_scale(start * value);
	}

	/// Two-finger gesture. The finger spread relative to the spread when the
	/// second finger landed drives [`ExplorerState::magnify`]. Any pan in
	/// progress is dropped without counting as a tap.
	pub fn pinch(&mut self, spread: f64) {
		if !spread.is_finite() || spread <= 0.0 {
			return;
		}
		self.pan = PanState::default();
		let start = *self.pinch_start.get_or_insert(spread);
		self.magnify(spread / start);
	}

	/// Ends a magnify or pinch gesture.
	pub fn end_magnify(&mut self) {
		self.magnify_start = None;
		self.pinch_start = None;
	}

	/// Wheel zoom about the viewport center.
	pub fn zoom_by(&mut self, factor: f64) {
		self.zoom_at(factor, self.width / 2.0, self.height / 2.0);
	}

	/// Zooms by `factor` keeping the graph point under `(x, y)` fixed.
	pub fn zoom_at(&mut self, factor: f64, x: f64, y: f64) {
		if !factor.is_finite() || factor <= 0.0 {
			return;
		}
		let scale = self.clamp_scale(self.transform.scale * factor);
		let ratio = scale / self.transform.scale;
		let (cx, cy) = (x - self.width / 2.0, y - self.height / 2.0);
		self.transform.offset_x = cx - (cx - self.transform.offset_x) * ratio;
		self.transform.offset_y = cy - (cy - self.transform.offset_y) * ratio;
		self.transform.scale = scale;
	}

	pub fn recenter(&mut self) {
		self.transform.offset_x = 0.0;
		self.transform.offset_y = 0.0;
		self.transform.scale = self.clamp_scale(1.0);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn clamp_scale(&self, scale: f64) -> f64 {
		scale.max(self.min_scale).min(self.max_scale)
	}
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (abx, aby) = (b.0 - a.0, b.1 - a.1);
	let len_sq = abx * abx + aby * aby;
	if len_sq < 1e-9 {
		return (p.0 - a.0).hypot(p.1 - a.1);
	}
	let t = (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0);
	(p.0 - (a.0 + t * abx)).hypot(p.1 - (a.1 + t * aby))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::cross_reference::types::ConnectionStrength;

	fn state() -> ExplorerState {
		ExplorerState::new(&ExplorerConfig::default(), 800.0, 600.0)
	}

	fn node(key: &str, x: f64, y: f64) -> VerseNode {
		let r = VerseReference::parse_key(key, "engKJV").unwrap();
		VerseNode::from_reference(&r, Position::new(x, y)).unwrap()
	}

	/// John 3:16 at the origin, Romans 5:8 to the right (thematic), Genesis 22:2
	/// below (parallel).
	fn sample_graph() -> CrossReferenceGraph {
		let mut g = CrossReferenceGraph::new("John 3:16");
		g.insert_node(node("John 3:16", 0.0, 0.0));
		g.insert_node(node("Romans 5:8", 200.0, 0.0));
		g.insert_node(node("Genesis 22:2", 0.0, 200.0));
		for (target, kind) in [
			("Romans 5:8", ConnectionType::ThematicLink),
			("Genesis 22:2", ConnectionType::Parallel),
		] {
			g.connect(VerseConnection {
				source: "John 3:16".into(),
				target: target.into(),
				kind,
				strength: ConnectionStrength::Medium,
			})
			.unwrap();
		}
		g
	}

	fn populated() -> ExplorerState {
		let mut s = state();
		let req = s.begin_explore(VerseReference::new("engKJV", "John", 3, 16));
		assert!(s.complete(req.seq, Ok(sample_graph())));
		s
	}

	#[test]
	fn explore_moves_through_loading_to_populated() {
		let mut s = state();
		assert_eq!(s.phase, Phase::Idle);
		let req = s.begin_explore(VerseReference::new("engKJV", "John", 3, 16));
		assert_eq!(req.depth, 2);
		assert!(s.is_loading());
		assert!(s.complete(req.seq, Ok(sample_graph())));
		assert_eq!(s.phase, Phase::Populated);
		assert_eq!(s.visible_connections().count(), 2);
	}

	#[test]
	fn failed_or_empty_build_shows_empty_state() {
		let mut s = state();
		let req = s.begin_explore(VerseReference::new("engKJV", "John", 3, 16));
		assert!(s.complete(req.seq, Err(BuildError::Unavailable("offline".into()))));
		assert_eq!(s.phase, Phase::Empty);
		assert!(s.graph.is_none());

		let req = s.begin_explore(VerseReference::new("engKJV", "John", 3, 16));
		assert!(s.complete(req.seq, Ok(CrossReferenceGraph::new("John 3:16"))));
		assert_eq!(s.phase, Phase::Empty);
	}

	#[test]
	fn stale_response_is_discarded() {
		let mut s = state();
		let first = s.begin_explore(VerseReference::new("engKJV", "John", 3, 16));
		let second = s.begin_explore(VerseReference::new("engKJV", "Romans", 5, 8));
		assert!(second.seq > first.seq);

		assert!(!s.complete(first.seq, Ok(sample_graph())));
		assert!(s.is_loading());
		assert!(s.graph.is_none());

		let mut newer = CrossReferenceGraph::new("Romans 5:8");
		newer.insert_node(node("Romans 5:8", 0.0, 0.0));
		assert!(s.complete(second.seq, Ok(newer)));
		assert_eq!(s.graph.as_ref().unwrap().center, "Romans 5:8");

		// late duplicate delivery
		assert!(!s.complete(second.seq, Ok(sample_graph())));
		assert_eq!(s.graph.as_ref().unwrap().center, "Romans 5:8");
	}

	#[test]
	fn selection_is_mutually_exclusive() {
		let mut s = populated();
		assert!(s.select_node("Romans 5:8"));
		assert_eq!(s.selected_node().unwrap().book, "Romans");
		assert!(s.select_connection(1));
		assert!(s.selected_node().is_none());
		assert_eq!(s.selected_connection().unwrap().target, "Genesis 22:2");
		assert!(s.select_node("John 3:16"));
		assert!(s.selected_connection().is_none());
		assert!(!s.select_node("Mark 1:1"));
		assert!(s.is_selected_node("John 3:16"));
	}

	#[test]
	fn hiding_a_type_drops_its_selected_connection() {
		let mut s = populated();
		assert!(s.select_connection(0));
		assert!(!s.toggle_connection_type(ConnectionType::ThematicLink));
		assert_eq!(s.selection, Selection::None);
		assert!(!s.select_connection(0));
		assert_eq!(s.visible_connections().map(|(i, _)| i).collect::<Vec<_>>(), vec![1]);
		assert!(s.toggle_connection_type(ConnectionType::ThematicLink));
		assert_eq!(s.visible_connections().count(), 2);
	}

	#[test]
	fn filter_survives_re_centering() {
		let mut s = populated();
		s.toggle_connection_type(ConnectionType::Parallel);
		let req = s.begin_explore(VerseReference::new("engKJV", "John", 3, 16));
		s.complete(req.seq, Ok(sample_graph()));
		assert_eq!(s.visible_connections().map(|(i, _)| i).collect::<Vec<_>>(), vec![0]);
	}

	#[test]
	fn scale_is_always_clamped() {
		let mut s = populated();
		s.magnify(10.0);
		assert_eq!(s.transform.scale, 2.0);
		s.magnify(0.01);
		assert_eq!(s.transform.scale, 0.5);
		s.end_magnify();
		for _ in 0..50 {
			s.zoom_by(1.5);
		}
		assert_eq!(s.transform.scale, 2.0);
		for _ in 0..50 {
			s.zoom_by(0.5);
		}
		assert_eq!(s.transform.scale, 0.5);
		s.zoom_by(f64::NAN);
		s.magnify(-3.0);
		assert_eq!(s.transform.scale, 0.5);
	}

	#[test]
	fn magnify_is_relative_to_gesture_start() {
		let mut s = populated();
		s.zoom_by(1.2);
		s.magnify(1.5);
		assert!((s.transform.scale - 1.8).abs() < 1e-9);
		s.magnify(1.0);
		assert!((s.transform.scale - 1.2).abs() < 1e-9);
		s.end_magnify();
		s.magnify(0.5);
		assert!((s.transform.scale - 0.6).abs() < 1e-9);
	}

	#[test]
	fn pinch_scales_by_finger_spread() {
		let mut s = populated();
		s.select_node("Romans 5:8");
		assert_eq!(s.press(700.0, 550.0), PressTarget::Background);
		s.pinch(100.0);
		assert!(!s.pan.active);
		s.pinch(150.0);
		assert!((s.transform.scale - 1.5).abs() < 1e-9);
		s.pinch(1000.0);
		assert_eq!(s.transform.scale, 2.0);
		s.end_magnify();
		s.end_pan();
		assert!(s.is_selected_node("Romans 5:8"));

		s.pinch(200.0);
		s.pinch(50.0);
		assert_eq!(s.transform.scale, 0.5);
		s.pinch(0.0);
		s.pinch(f64::NAN);
		assert_eq!(s.transform.scale, 0.5);
	}

	#[test]
	fn wheel_zoom_keeps_cursor_point_fixed() {
		let mut s = populated();
		let romans = Position::new(200.0, 0.0);
		assert_eq!(s.to_screen(romans), (600.0, 300.0));
		s.zoom_at(1.5, 600.0, 300.0);
		let (x, y) = s.to_screen(romans);
		assert!((x - 600.0).abs() < 1e-9 && (y - 300.0).abs() < 1e-9);
		assert!((s.to_screen(Position::ORIGIN).0 - 300.0).abs() < 1e-9);

		// clamped zoom still anchors at the cursor
		s.zoom_at(100.0, 600.0, 300.0);
		assert_eq!(s.transform.scale, 2.0);
		let (x, _) = s.to_screen(romans);
		assert!((x - 600.0).abs() < 1e-9);
	}

	#[test]
	fn screen_mapping_uses_center_scale_and_offset() {
		let mut s = populated();
		assert_eq!(s.to_screen(Position::new(200.0, 0.0)), (600.0, 300.0));
		s.zoom_by(0.5);
		s.begin_pan(0.0, 0.0);
		s.pan_to(10.0, -20.0);
		s.end_pan();
		assert_eq!(s.to_screen(Position::new(200.0, 0.0)), (510.0, 280.0));
		s.recenter();
		assert_eq!(s.to_screen(Position::ORIGIN), (400.0, 300.0));
	}

	#[test]
	fn press_hits_nodes_then_connections_then_background() {
		let mut s = populated();
		assert_eq!(s.press(602.0, 301.0), PressTarget::Node("Romans 5:8".into()));
		s.end_pan();
		assert_eq!(s.press(500.0, 302.0), PressTarget::Connection(0));
		s.end_pan();
		assert_eq!(s.selected_connection().unwrap().kind, ConnectionType::ThematicLink);

		assert_eq!(s.press(700.0, 550.0), PressTarget::Background);
		s.end_pan();
		assert_eq!(s.selection, Selection::None);
	}

	#[test]
	fn panning_keeps_selection_and_is_unclamped() {
		let mut s = populated();
		s.select_node("Romans 5:8");
		s.press(700.0, 550.0);
		s.pan_to(-5000.0, 9000.0);
		s.end_pan();
		assert!(s.is_selected_node("Romans 5:8"));
		assert_eq!(s.transform.offset_x, -5700.0);
		assert_eq!(s.transform.offset_y, 8450.0);
	}

	#[test]
	fn hidden_connections_are_not_hit() {
		let mut s = populated();
		s.toggle_connection_type(ConnectionType::ThematicLink);
		assert_eq!(s.connection_at(500.0, 300.0), None);
	}

	#[test]
	fn replacing_graph_resets_view_state() {
		let mut s = populated();
		s.select_node("Romans 5:8");
		s.zoom_by(1.7);
		s.begin_pan(0.0, 0.0);
		s.pan_to(40.0, 40.0);
		s.end_pan();

		let req = s.explore_selected().unwrap();
		assert_eq!(req.center, VerseReference::new("engKJV", "Romans", 5, 8));
		assert_eq!(s.selection, Selection::None);
		assert_eq!(s.transform, ViewTransform::default());
		assert!(s.graph.is_none());
	}

	#[test]
	fn explore_selected_needs_a_node() {
		let mut s = populated();
		assert!(s.explore_selected().is_none());
		s.select_connection(0);
		assert!(s.explore_selected().is_none());
		assert_eq!(s.phase, Phase::Populated);
	}

	#[test]
	fn segment_distance_clamps_to_endpoints() {
		assert_eq!(segment_distance((5.0, 3.0), (0.0, 0.0), (10.0, 0.0)), 3.0);
		assert_eq!(segment_distance((13.0, 4.0), (0.0, 0.0), (10.0, 0.0)), 5.0);
		assert_eq!(segment_distance((3.0, 4.0), (0.0, 0.0), (0.0, 0.0)), 5.0);
	}
}
