use std::collections::{HashMap, HashSet};

use super::types::{Concept, NodeId, Relation, SpeakerFilter};

/// Per-node expanded flag; a missing entry means collapsed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollapseMap {
	expanded: HashMap<NodeId, bool>,
}

impl CollapseMap {
	pub fn seeded(expanded: impl IntoIterator<Item = NodeId>) -> Self {
		Self {
			expanded: expanded.into_iter().map(|id| (id, true)).collect(),
		}
	}

	pub fn is_expanded(&self, id: NodeId) -> bool {
		self.expanded.get(&id).copied().unwrap_or(false)
	}

	/// Flips one entry, leaving every other entry untouched. Returns the new state.
	pub fn toggle(&mut self, id: NodeId) -> bool {
		let entry = self.expanded.entry(id).or_insert(false);
		*entry = !*entry;
		*entry
	}
}

/// Visible node ids, kept both in dataset order (for deterministic scans) and as a set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibleSet {
	order: Vec<NodeId>,
	ids: HashSet<NodeId>,
}

impl VisibleSet {
	pub fn contains(&self, id: NodeId) -> bool {
		self.ids.contains(&id)
	}

	pub fn ids(&self) -> &[NodeId] {
		&self.order
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}
}

/// Whether every ancestor of `concept` is expanded. The walk stops on a revisited id,
/// so a malformed cyclic parent chain terminates.
fn ancestors_expanded(
	concept: &Concept,
	by_id: &HashMap<NodeId, &Concept>,
	collapse: &CollapseMap,
) -> bool {
	let mut seen = HashSet::from([concept.id]);
	let mut next = concept.parent;
	while let Some(parent) = next {
		if !collapse.is_expanded(parent) {
			return false;
		}
		if !seen.insert(parent) {
			break;
		}
		next = by_id.get(&parent).and_then(|c| c.parent);
	}
	true
}

pub fn visible(concepts: &[Concept], collapse: &CollapseMap, filter: &SpeakerFilter) -> VisibleSet {
	let by_id: HashMap<NodeId, &Concept> = concepts.iter().map(|c| (c.id, c)).collect();
	let order: Vec<NodeId> = concepts
		.iter()
		.filter(|c| !c.is_tombstone())
		.filter(|c| filter.admits(&c.speaker))
		.filter(|c| ancestors_expanded(c, &by_id, collapse))
		.map(|c| c.id)
		.collect();
	let ids = order.iter().copied().collect();
	VisibleSet { order, ids }
}

/// Indices into `relations` of the edges to draw. Dangling or tombstoned endpoints hide
/// an edge regardless of the visible set.
pub fn visible_edges(concepts: &[Concept], relations: &[Relation], visible: &VisibleSet) -> Vec<usize> {
	let live: HashSet<NodeId> = concepts
		.iter()
		.filter(|c| !c.is_tombstone())
		.map(|c| c.id)
		.collect();
	relations
		.iter()
		.enumerate()
		.filter(|(_, r)| live.contains(&r.from) && live.contains(&r.to))
		.filter(|(_, r)| visible.contains(r.from) && visible.contains(r.to))
		.map(|(i, _)| i)
		.collect()
}

/// Reverse scan over `parent`; the node's own `children` list is not trusted.
pub fn has_children(concepts: &[Concept], id: NodeId) -> bool {
	concepts.iter().any(|c| c.parent == Some(id) && c.id != id)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: NodeId, parent: Option<NodeId>, speaker: &str, size: f64) -> Concept {
		Concept {
			id,
			text: format!("n{id}"),
			speaker: speaker.into(),
			x: 0.0,
			y: 0.0,
			width: size,
			height: size,
			parent,
			children: vec![],
			timestamp: 0.0,
		}
	}

	fn edge(from: NodeId, to: NodeId) -> Relation {
		Relation {
			from,
			to,
			text: "rel".into(),
			timestamp: 0.0,
		}
	}

	fn tree() -> Vec<Concept> {
		vec![
			node(1, None, "All", 50.0),
			node(2, Some(1), "Kit", 50.0),
			node(3, Some(2), "John", 50.0),
			node(4, Some(1), "John", 0.0),
			node(5, Some(1), "John", 50.0),
		]
	}

	#[test]
	fn tombstones_never_visible() {
		let all_open = CollapseMap::seeded([1, 2, 3, 4, 5]);
		let v = visible(&tree(), &all_open, &SpeakerFilter::All);
		assert!(!v.contains(4));
		assert_eq!(v.ids(), &[1, 2, 3, 5]);
	}

	#[test]
	fn collapsed_ancestor_hides_whole_subtree() {
		let v = visible(&tree(), &CollapseMap::default(), &SpeakerFilter::All);
		assert_eq!(v.ids(), &[1]);

		let mut collapse = CollapseMap::default();
		collapse.toggle(1);
		let v = visible(&tree(), &collapse, &SpeakerFilter::All);
		assert_eq!(v.ids(), &[1, 2, 5]);
	}

	#[test]
	fn speaker_filter_keeps_universal_speaker() {
		let open = CollapseMap::seeded([1, 2]);
		let v = visible(&tree(), &open, &SpeakerFilter::Speaker("John".into()));
		assert_eq!(v.ids(), &[1, 3, 5]);
	}

	#[test]
	fn edges_need_both_endpoints_visible_and_live() {
		let nodes = tree();
		let relations = vec![edge(1, 2), edge(2, 3), edge(1, 4), edge(1, 99), edge(1, 5)];
		let mut collapse = CollapseMap::seeded([1, 2]);
		let v = visible(&nodes, &collapse, &SpeakerFilter::All);
		assert_eq!(visible_edges(&nodes, &relations, &v), vec![0, 1, 4]);

		collapse.toggle(2);
		let v = visible(&nodes, &collapse, &SpeakerFilter::All);
		assert_eq!(visible_edges(&nodes, &relations, &v), vec![0, 4]);
	}

	#[test]
	fn speaker_filter_hides_edges_at_filtered_endpoints() {
		let mut flat_wide = node(3, Some(1), "John", 10.0);
		flat_wide.height = 0.0;
		let mut flat_tall = node(4, Some(1), "John", 10.0);
		flat_tall.width = 0.0;
		let nodes = vec![node(1, None, "All", 50.0), node(2, Some(1), "Kit", 50.0), flat_wide, flat_tall];
		let relations = vec![edge(1, 2), edge(1, 3), edge(1, 4)];
		let open = CollapseMap::seeded([1]);

		let john = visible(&nodes, &open, &SpeakerFilter::Speaker("John".into()));
		assert_eq!(john.ids(), &[1]);
		assert!(visible_edges(&nodes, &relations, &john).is_empty());

		let all = visible(&nodes, &open, &SpeakerFilter::All);
		assert_eq!(all.ids(), &[1, 2]);
		assert_eq!(visible_edges(&nodes, &relations, &all), vec![0]);
	}

	#[test]
	fn has_children_ignores_stale_children_field() {
		let mut nodes = tree();
		nodes[4].children = vec![42];
		assert!(has_children(&nodes, 1));
		assert!(has_children(&nodes, 2));
		assert!(!has_children(&nodes, 5));
	}

	#[test]
	fn toggle_flips_only_its_entry() {
		let mut collapse = CollapseMap::seeded([1]);
		assert!(collapse.toggle(2));
		assert!(collapse.is_expanded(1));
		assert!(!collapse.toggle(2));
		assert!(!collapse.toggle(1));
		assert!(!collapse.is_expanded(3));
	}

	#[test]
	fn cyclic_parent_chain_terminates() {
		let nodes = vec![node(1, Some(2), "All", 10.0), node(2, Some(1), "All", 10.0)];
		let v = visible(&nodes, &CollapseMap::seeded([1, 2]), &SpeakerFilter::All);
		assert_eq!(v.ids(), &[1, 2]);
		let v = visible(&nodes, &CollapseMap::seeded([1]), &SpeakerFilter::All);
		assert!(v.is_empty());
	}
}
