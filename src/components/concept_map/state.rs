use log::{debug, info};

use super::config::MapConfig;
use super::drag::DragController;
use super::layout::{LayoutError, LayoutPersistence, LayoutStore, LoadedLayout, SavedLayout};
use super::media::{MediaClock, MediaCommand};
use super::timesync::{self, EdgeStyle, NodeStyle};
use super::transform::{ScreenTransform, client_to_logical};
use super::types::{Concept, Dataset, EXPANDER_RADIUS, NodeId, Point, PointerButton, Relation, SpeakerFilter};
use super::viewport::Viewport;
use super::visibility::{self, CollapseMap, VisibleSet};

/// What a pointer press landed on, in logical space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
	Expander(NodeId),
	Body(NodeId),
}

/// Single owner of every mutable field of the map. Derived sets (visible nodes, visible
/// edges, active node) are recomputed at the end of each mutator that can change them.
pub struct ConceptMapState {
	pub dataset: Dataset,
	pub concepts: Vec<Concept>,
	pub viewport: Viewport,
	pub drag: DragController,
	pub clock: MediaClock,
	collapse: CollapseMap,
	filter: SpeakerFilter,
	visible: VisibleSet,
	visible_edges: Vec<usize>,
	active: Option<NodeId>,
}

impl ConceptMapState {
	pub fn new(dataset: Dataset, layout: LoadedLayout, config: &MapConfig, edit_mode: bool) -> Self {
		let mut state = Self {
			dataset,
			concepts: layout.concepts,
			viewport: Viewport::new(layout.view, config.initial_view),
			drag: DragController::new(edit_mode),
			clock: MediaClock::default(),
			collapse: CollapseMap::seeded(config.expanded_by_default.iter().copied()),
			filter: SpeakerFilter::All,
			visible: VisibleSet::default(),
			visible_edges: Vec::new(),
			active: None,
		};
		state.refresh_visibility();
		info!(
			"concept map ready: {} concepts, {} relations, {} visible",
			state.concepts.len(),
			state.dataset.relations.len(),
			state.visible.len()
		);
		state
	}

	pub fn edit_mode(&self) -> bool {
		self.drag.is_enabled()
	}

	#[cfg(test)]
	pub fn visible(&self) -> &VisibleSet {
		&self.visible
	}

	#[cfg(test)]
	pub fn active(&self) -> Option<NodeId> {
		self.active
	}

	pub fn filter(&self) -> &SpeakerFilter {
		&self.filter
	}

	pub fn is_expanded(&self, id: NodeId) -> bool {
		self.collapse.is_expanded(id)
	}

	pub fn concept(&self, id: NodeId) -> Option<&Concept> {
		self.concepts.iter().find(|c| c.id == id)
	}

	pub fn has_children(&self, id: NodeId) -> bool {
		visibility::has_children(&self.concepts, id)
	}

	/// Visible concepts in draw order.
	pub fn visible_concepts(&self) -> impl DoubleEndedIterator<Item = &Concept> {
		self.concepts.iter().filter(|c| self.visible.contains(c.id))
	}

	/// Visible relations with both endpoints resolved.
	pub fn visible_relations(&self) -> impl Iterator<Item = (&Relation, &Concept, &Concept)> {
		self.visible_edges.iter().filter_map(|&i| {
			let relation = self.dataset.relations.get(i)?;
			Some((relation, self.concept(relation.from)?, self.concept(relation.to)?))
		})
	}

	pub fn node_style(&self, concept: &Concept) -> NodeStyle {
		NodeStyle::of(concept, self.clock.current_time, self.active)
	}

	pub fn edge_style(&self, relation: &Relation, from: &Concept, to: &Concept) -> EdgeStyle {
		EdgeStyle::of(relation, from, to, self.clock.current_time, self.active)
	}

	/// Full pass: visible set, then edges, then the active node against the fresh set.
	fn refresh_visibility(&mut self) {
		self.visible = visibility::visible(&self.concepts, &self.collapse, &self.filter);
		self.visible_edges =
			visibility::visible_edges(&self.concepts, &self.dataset.relations, &self.visible);
		self.refresh_active();
	}

	/// Time-only pass: one linear scan over the current visible set.
	fn refresh_active(&mut self) {
		self.active = timesync::active_node(&self.concepts, &self.visible, self.clock.current_time);
	}

	pub fn toggle_expand(&mut self, id: NodeId) {
		let expanded = self.collapse.toggle(id);
		debug!("concept {id} {}", if expanded { "expanded" } else { "collapsed" });
		self.refresh_visibility();
	}

	pub fn set_filter(&mut self, filter: SpeakerFilter) {
		if self.filter == filter {
			return;
		}
		debug!("speaker filter set to {filter}");
		self.filter = filter;
		self.refresh_visibility();
	}

	pub fn set_time(&mut self, t: f64) {
		self.clock.on_time_update(t);
		self.refresh_active();
	}

	pub fn seek(&mut self, t: f64) -> MediaCommand {
		let command = self.clock.seek(t);
		debug!("seek to {:.1}s", self.clock.current_time);
		self.refresh_active();
		command
	}

	pub fn media_ended(&mut self) -> MediaCommand {
		let command = self.clock.on_ended();
		self.refresh_active();
		command
	}

	pub fn toggle_play(&mut self) -> MediaCommand {
		let command = self.clock.toggle_play();
		self.refresh_active();
		command
	}

	/// Topmost (last drawn) visible concept under a logical point. The expander badge
	/// only counts on nodes that have children.
	pub fn hit_test(&self, p: Point) -> Option<Hit> {
		self.visible_concepts().rev().find_map(|c| {
			if self.has_children(c.id) {
				let e = c.expander_center();
				if (p.x - e.x).hypot(p.y - e.y) <= EXPANDER_RADIUS {
					return Some(Hit::Expander(c.id));
				}
			}
			c.contains(p).then_some(Hit::Body(c.id))
		})
	}

	fn logical(&self, transform: Option<&ScreenTransform>, client: Point) -> Option<Point> {
		client_to_logical(transform, client, self.viewport.zoom())
	}

	/// Press on the surface: an edit-mode press on a non-root body claims the gesture as a
	/// drag; anything else starts a pan.
	pub fn pointer_down(&mut self, client: Point, button: PointerButton, transform: Option<&ScreenTransform>) {
		if button != PointerButton::Primary {
			return;
		}
		if self.edit_mode() {
			if let Some(at) = self.logical(transform, client) {
				if let Some(Hit::Body(id)) = self.hit_test(at) {
					let claimed = match self.concepts.iter().find(|c| c.id == id) {
						Some(concept) => self.drag.begin(concept, button, at),
						None => false,
					};
					if claimed {
						return;
					}
				}
			}
		}
		self.viewport.begin_pan(client, button, self.drag.is_active());
	}

	pub fn pointer_move(&mut self, client: Point, transform: Option<&ScreenTransform>) {
		if self.drag.is_active() {
			let at = self.logical(transform, client);
			self.drag.continue_drag(&mut self.concepts, at);
		} else {
			self.viewport.continue_pan(client);
		}
	}

	/// Release or leave: both gestures end together so none outlives a lost pointer.
	pub fn pointer_up(&mut self) {
		self.drag.end();
		self.viewport.end_pan();
	}

	/// Click after release. A pan that moved is not a click.
	pub fn click(&mut self, client: Point, transform: Option<&ScreenTransform>) {
		if self.viewport.pan_moved() {
			return;
		}
		let Some(at) = self.logical(transform, client) else {
			return;
		};
		match self.hit_test(at) {
			Some(Hit::Expander(id)) => self.toggle_expand(id),
			Some(Hit::Body(id)) if !self.edit_mode() && self.has_children(id) => self.toggle_expand(id),
			_ => {}
		}
	}

	pub fn cursor(&self) -> &'static str {
		if self.viewport.is_panning() || self.drag.is_active() {
			"grabbing"
		} else if self.edit_mode() {
			"grab"
		} else {
			"default"
		}
	}

	/// Persists positions and view. Outside edit mode nothing is written.
	pub fn save_layout<S: LayoutStore>(&self, persistence: &LayoutPersistence<S>) -> Result<SavedLayout, LayoutError> {
		if !self.edit_mode() {
			return Err(LayoutError::EditModeRequired);
		}
		persistence.save(&self.concepts, self.viewport.settings())
	}
}
