use log::debug;

use super::types::{Concept, NodeId, Point, PointerButton};

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
	pub anchor: Point,
}

/// Edit-mode repositioning of non-root nodes. Anchors and deltas live in logical space.
#[derive(Clone, Debug, Default)]
pub struct DragController {
	enabled: bool,
	state: DragState,
}

impl DragController {
	pub fn new(enabled: bool) -> Self {
		Self {
			enabled,
			state: DragState::default(),
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn is_active(&self) -> bool {
		self.state.node.is_some()
	}

	pub fn dragged(&self) -> Option<NodeId> {
		self.state.node
	}

	/// Returns true when the gesture is claimed; the caller must then not start a pan.
	pub fn begin(&mut self, concept: &Concept, button: PointerButton, at: Point) -> bool {
		if !self.enabled || concept.is_root() || button != PointerButton::Primary {
			return false;
		}
		debug!("drag start on concept {}", concept.id);
		self.state = DragState {
			node: Some(concept.id),
			anchor: at,
		};
		true
	}

	/// `at` is `None` when the surface transform is unavailable; that move is skipped.
	pub fn continue_drag(&mut self, concepts: &mut [Concept], at: Option<Point>) {
		let (Some(id), Some(at)) = (self.state.node, at) else {
			return;
		};
		let (dx, dy) = (at.x - self.state.anchor.x, at.y - self.state.anchor.y);
		self.state.anchor = at;
		if let Some(concept) = concepts.iter_mut().find(|c| c.id == id) {
			concept.x += dx;
			concept.y += dy;
		}
	}

	pub fn end(&mut self) {
		if let Some(id) = self.state.node.take() {
			debug!("drag end on concept {}", id);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn concept(id: NodeId, parent: Option<NodeId>) -> Concept {
		Concept {
			id,
			text: format!("c{id}"),
			speaker: "All".into(),
			x: 100.0,
			y: 100.0,
			width: 100.0,
			height: 40.0,
			parent,
			children: vec![],
			timestamp: 0.0,
		}
	}

	#[test]
	fn roots_are_never_draggable() {
		let mut d = DragController::new(true);
		assert!(!d.begin(&concept(1, None), PointerButton::Primary, Point::default()));
		assert!(!d.is_active());
	}

	#[test]
	fn drag_requires_edit_mode_and_primary_button() {
		let c = concept(2, Some(1));
		assert!(!DragController::new(false).begin(&c, PointerButton::Primary, Point::default()));
		assert!(!DragController::new(true).begin(&c, PointerButton::Other, Point::default()));
	}

	#[test]
	fn deltas_accumulate_from_moving_anchor() {
		let mut nodes = vec![concept(1, None), concept(2, Some(1))];
		let mut d = DragController::new(true);
		assert!(d.begin(&nodes[1], PointerButton::Primary, Point::new(10.0, 10.0)));
		d.continue_drag(&mut nodes, Some(Point::new(15.0, 12.0)));
		d.continue_drag(&mut nodes, Some(Point::new(20.0, 12.0)));
		assert_eq!((nodes[1].x, nodes[1].y), (110.0, 102.0));
		assert_eq!((nodes[0].x, nodes[0].y), (100.0, 100.0));
	}

	#[test]
	fn missing_transform_and_ended_drag_are_no_ops() {
		let mut nodes = vec![concept(1, None), concept(2, Some(1))];
		let mut d = DragController::new(true);
		d.begin(&nodes[1], PointerButton::Primary, Point::new(0.0, 0.0));
		d.continue_drag(&mut nodes, None);
		assert_eq!(nodes[1].x, 100.0);
		d.end();
		d.continue_drag(&mut nodes, Some(Point::new(50.0, 50.0)));
		assert_eq!(nodes[1].x, 100.0);
		assert_eq!(d.dragged(), None);
	}
}
