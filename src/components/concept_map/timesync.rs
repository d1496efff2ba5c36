use std::collections::HashMap;

use super::types::{Concept, NodeId, Relation};
use super::visibility::VisibleSet;

const PENDING_NODE_OPACITY: f64 = 0.4;
const PENDING_EDGE_OPACITY: f64 = 0.3;

/// The visible node with the latest timestamp not after `t`. Scans in visible-set order and
/// only replaces the best on a strictly later timestamp, so the first of equal candidates wins.
pub fn active_node(concepts: &[Concept], visible: &VisibleSet, t: f64) -> Option<NodeId> {
	let by_id: HashMap<NodeId, &Concept> = concepts.iter().map(|c| (c.id, c)).collect();
	let mut best: Option<&Concept> = None;
	for concept in visible.ids().iter().filter_map(|id| by_id.get(id)) {
		if !concept.is_discussed(t) {
			continue;
		}
		if best.is_none_or(|b| concept.timestamp > b.timestamp) {
			best = Some(concept);
		}
	}
	best.map(|c| c.id)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeStyle {
	pub discussed: bool,
	pub speaking: bool,
}

impl NodeStyle {
	pub fn of(concept: &Concept, t: f64, active: Option<NodeId>) -> Self {
		let discussed = concept.is_discussed(t);
		Self {
			discussed,
			speaking: discussed && active == Some(concept.id),
		}
	}

	pub fn opacity(&self) -> f64 {
		if self.discussed { 1.0 } else { PENDING_NODE_OPACITY }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeStyle {
	pub discussed: bool,
	pub speaking: bool,
}

impl EdgeStyle {
	/// An edge is emphasised when it is discussed and touches the speaking node.
	pub fn of(relation: &Relation, from: &Concept, to: &Concept, t: f64, active: Option<NodeId>) -> Self {
		let discussed = relation.is_discussed(t);
		let touches_active =
			NodeStyle::of(from, t, active).speaking || NodeStyle::of(to, t, active).speaking;
		Self {
			discussed,
			speaking: discussed && touches_active,
		}
	}

	pub fn opacity(&self) -> f64 {
		if self.discussed { 1.0 } else { PENDING_EDGE_OPACITY }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::concept_map::types::SpeakerFilter;
	use crate::components::concept_map::visibility::{CollapseMap, visible};

	fn node(id: NodeId, timestamp: f64) -> Concept {
		Concept {
			id,
			text: String::new(),
			speaker: "All".into(),
			x: 0.0,
			y: 0.0,
			width: 10.0,
			height: 10.0,
			parent: None,
			children: vec![],
			timestamp,
		}
	}

	fn all_visible(nodes: &[Concept]) -> VisibleSet {
		visible(nodes, &CollapseMap::default(), &SpeakerFilter::All)
	}

	#[test]
	fn latest_qualifying_timestamp_wins() {
		let nodes = vec![node(1, 0.0), node(2, 300.0), node(3, 120.0)];
		let v = all_visible(&nodes);
		assert_eq!(active_node(&nodes, &v, 200.0), Some(3));
		assert_eq!(active_node(&nodes, &v, 300.0), Some(2));
	}

	#[test]
	fn nothing_qualifies_before_first_timestamp() {
		let nodes = vec![node(1, 10.0)];
		assert_eq!(active_node(&nodes, &all_visible(&nodes), 5.0), None);
		assert_eq!(active_node(&nodes, &VisibleSet::default(), 50.0), None);
	}

	#[test]
	fn ties_go_to_first_in_order() {
		let nodes = vec![node(4, 0.0), node(7, 50.0), node(5, 50.0)];
		assert_eq!(active_node(&nodes, &all_visible(&nodes), 60.0), Some(7));
	}

	#[test]
	fn active_timestamp_is_monotonic_in_time() {
		let nodes = vec![node(1, 0.0), node(2, 40.0), node(3, 10.0), node(4, 90.0), node(5, 65.0)];
		let v = all_visible(&nodes);
		let stamp = |t: f64| {
			active_node(&nodes, &v, t)
				.and_then(|id| nodes.iter().find(|n| n.id == id))
				.map(|n| n.timestamp)
		};
		let mut last = None;
		for t in 0..120 {
			let current = stamp(t as f64);
			assert!(current >= last);
			last = current;
		}
	}

	#[test]
	fn edge_emphasis_requires_discussed_edge_touching_active() {
		let (a, b) = (node(1, 0.0), node(2, 100.0));
		let rel = Relation {
			from: 1,
			to: 2,
			text: "r".into(),
			timestamp: 30.0,
		};
		let early = EdgeStyle::of(&rel, &a, &b, 20.0, Some(1));
		assert_eq!(early, EdgeStyle { discussed: false, speaking: false });
		assert_eq!(early.opacity(), 0.3);
		let later = EdgeStyle::of(&rel, &a, &b, 40.0, Some(1));
		assert!(later.speaking);
		assert!(!EdgeStyle::of(&rel, &a, &b, 40.0, None).speaking);
	}

	#[test]
	fn node_style_follows_time() {
		let n = node(9, 100.0);
		assert_eq!(NodeStyle::of(&n, 99.0, Some(9)), NodeStyle { discussed: false, speaking: false });
		assert_eq!(NodeStyle::of(&n, 100.0, Some(9)).opacity(), 1.0);
		assert!(NodeStyle::of(&n, 100.0, Some(9)).speaking);
	}
}
