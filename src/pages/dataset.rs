use crate::components::concept_map::{ConceptSeed, Dataset, NodeId, Point, Relation};

const SPEAKERS: &[(&str, &str)] = &[
	("Fiona", "#6366f1"),
	("Mickey", "#ef4444"),
	("Kit", "#f97316"),
	("David", "#84cc16"),
	("Sophia", "#06b6d4"),
	("John", "#8b5cf6"),
];

#[allow(clippy::too_many_arguments)]
const fn concept(
	id: NodeId,
	text: &'static str,
	speaker: &'static str,
	size: (f64, f64),
	parent: Option<NodeId>,
	children: &'static [NodeId],
	timestamp: f64,
	at: (f64, f64),
) -> ConceptSeed {
	ConceptSeed {
		id,
		text,
		speaker,
		width: size.0,
		height: size.1,
		parent,
		children,
		timestamp,
		default_position: Some(Point::new(at.0, at.1)),
	}
}

fn relation(from: NodeId, to: NodeId, text: &str, timestamp: f64) -> Relation {
	Relation {
		from,
		to,
		text: text.to_owned(),
		timestamp,
	}
}

/// Concepts and relations of the recorded discussion. Zero-size entries are retired
/// concepts kept so saved layouts and relations keep their ids.
pub fn concept_dataset() -> Dataset {
	Dataset {
		concepts: vec![
			concept(1, "Design, Culture, Values, and Technoscience in the Age of Biology", "All", (500.0, 70.0), None, &[2, 3, 4, 5, 23, 36], 0.0, (800.0, 100.0)),
			concept(2, "Storytelling in Technology", "Fiona", (220.0, 60.0), Some(1), &[6, 24, 8, 25, 37], 276.0, (0.0, 177.0)),
			concept(3, "Product Design & Consumerism", "Kit", (240.0, 60.0), Some(1), &[9, 10, 11, 28, 29], 908.0, (802.0, 254.0)),
			concept(4, "Science, Society & Power", "John", (220.0, 60.0), Some(1), &[12, 13, 14, 26, 27], 741.0, (1596.0, 64.0)),
			concept(5, "Alternative Paradigms & Values", "Sophia", (260.0, 60.0), Some(1), &[15, 16, 17, 30, 37], 1684.0, (235.0, 457.0)),
			concept(6, "Mythology Building", "Mickey", (160.0, 50.0), Some(2), &[], 320.0, (290.0, 213.0)),
			concept(24, "Prototyping the Future", "Mickey", (180.0, 50.0), Some(2), &[], 385.0, (217.0, 302.0)),
			concept(8, "Public Narrative", "David", (150.0, 50.0), Some(2), &[18, 19, 20], 650.0, (49.0, 669.0)),
			concept(9, "Embodied Values in Products", "Kit", (200.0, 50.0), Some(3), &[], 1040.0, (545.0, 297.0)),
			concept(10, "Planned Obsolescence", "Mickey", (180.0, 50.0), Some(3), &[], 1160.0, (1251.0, 365.0)),
			concept(11, "Visualization Tools (Museums)", "Kit", (200.0, 50.0), Some(3), &[], 960.0, (1066.0, 646.0)),
			concept(12, "Trust Dynamics", "David", (150.0, 50.0), Some(4), &[21, 22, 31], 1985.0, (1566.0, 423.0)),
			concept(13, "Power Dynamics", "John", (160.0, 50.0), Some(4), &[30], 1518.0, (1801.0, 286.0)),
			concept(14, "Public vs. Private Research", "John", (210.0, 50.0), Some(4), &[32], 1540.0, (1997.0, 122.0)),
			concept(15, "Stewardship Mindset", "Sophia", (170.0, 50.0), Some(5), &[29], 1700.0, (113.0, 589.0)),
			concept(16, "Indigenous Knowledge & Biotech", "David", (220.0, 50.0), Some(5), &[], 1760.0, (15.0, 329.0)),
			concept(17, "Relational Science", "David", (160.0, 50.0), Some(5), &[], 2070.0, (1696.0, 828.0)),
			concept(18, "Story of Self", "David", (130.0, 40.0), Some(8), &[], 655.0, (-112.0, 864.0)),
			concept(19, "Story of Us", "David", (120.0, 40.0), Some(8), &[], 658.0, (2.0, 951.0)),
			concept(20, "Story of Now", "David", (130.0, 40.0), Some(8), &[], 660.0, (135.0, 833.0)),
			concept(21, "Societal Atomization", "David", (180.0, 40.0), Some(12), &[], 2020.0, (1804.0, 632.0)),
			concept(22, "Relational Engagement", "David", (190.0, 40.0), Some(12), &[], 2075.0, (1986.0, 415.0)),
			concept(23, "Cultivating Culture", "Sophia", (200.0, 60.0), Some(1), &[33, 25], 495.0, (798.0, 609.0)),
			concept(25, "Stories Embody Values", "David", (190.0, 50.0), Some(2), &[], 690.0, (-194.0, 660.0)),
			concept(26, "Urgency of Current Times", "John", (200.0, 50.0), Some(4), &[27], 741.0, (1960.0, 225.0)),
			concept(27, "Anti-Science Movement", "John", (190.0, 50.0), Some(26), &[], 750.0, (1050.0, 420.0)),
			concept(28, "Technology Creates New Problems", "Mickey", (240.0, 50.0), Some(3), &[], 1350.0, (1282.0, 503.0)),
			concept(29, "Consumer vs. Maker Mindset", "Mickey", (220.0, 50.0), Some(3), &[], 2380.0, (364.0, 883.0)),
			concept(30, "Democratizing Technology", "Mickey", (210.0, 50.0), Some(5), &[], 2300.0, (295.0, 741.0)),
			concept(31, "Link to Relational Science", "David", (0.0, 0.0), Some(12), &[], 2070.0, (950.0, 560.0)),
			concept(32, "Funding & Research Direction", "John", (220.0, 50.0), Some(14), &[], 1560.0, (1350.0, 520.0)),
			concept(33, "Shared Beliefs & Values", "Sophia", (200.0, 50.0), Some(23), &[25], 525.0, (852.0, 908.0)),
			concept(7, "DEPRECATED - Was Future Prototyping", "Mickey", (0.0, 0.0), Some(2), &[], 420.0, (0.0, 0.0)),
			concept(36, "Pace Layers of Change", "Mickey", (200.0, 50.0), Some(1), &[], 1415.0, (1283.0, 641.0)),
			concept(37, "Metaphors in Science", "David", (190.0, 50.0), Some(2), &[], 1870.0, (-453.0, 660.0)),
		],
		relations: vec![
			relation(1, 2, "explores", 10.0),
			relation(1, 3, "shapes", 15.0),
			relation(1, 4, "intersects", 20.0),
			relation(1, 5, "inspires", 25.0),
			relation(1, 23, "requires", 30.0),
			relation(1, 36, "operates via", 1420.0),
			relation(2, 6, "builds", 325.0),
			relation(2, 24, "enables", 390.0),
			relation(2, 8, "uses", 652.0),
			relation(2, 25, "embodies", 695.0),
			relation(2, 37, "uses", 1875.0),
			relation(3, 9, "embeds", 1045.0),
			relation(3, 10, "led to", 1165.0),
			relation(3, 11, "shown by", 965.0),
			relation(3, 28, "can create", 1355.0),
			relation(3, 29, "contrasts", 2385.0),
			relation(4, 12, "needs", 1990.0),
			relation(4, 13, "reveals", 1520.0),
			relation(4, 14, "questions", 1545.0),
			relation(4, 26, "faces", 745.0),
			relation(26, 27, "includes", 755.0),
			relation(14, 32, "determines", 1565.0),
			relation(5, 15, "promotes", 1705.0),
			relation(5, 16, "learns from", 1765.0),
			relation(5, 17, "practices", 2075.0),
			relation(5, 30, "advocates", 2305.0),
			relation(5, 37, "re-evaluates", 1880.0),
			relation(23, 33, "based on", 530.0),
			relation(33, 25, "are expressed in", 700.0),
			relation(8, 18, "includes", 656.0),
			relation(8, 19, "includes", 659.0),
			relation(8, 20, "includes", 661.0),
			relation(12, 21, "combats", 2025.0),
			relation(12, 22, "fosters", 2080.0),
			relation(12, 17, "is built on", 2072.0),
			relation(10, 29, "challenges", 2390.0),
			relation(15, 29, "aligns with", 2395.0),
			relation(13, 30, "reduced by", 2310.0),
			relation(16, 15, "embodies", 1770.0),
			relation(27, 12, "erodes", 760.0),
			relation(24, 9, "can show", 400.0),
			relation(37, 17, "enables new", 1900.0),
		],
		speakers: SPEAKERS.to_vec(),
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn ids_are_unique_and_relations_resolve() {
		let data = concept_dataset();
		let ids: HashSet<NodeId> = data.concepts.iter().map(|c| c.id).collect();
		assert_eq!(ids.len(), data.concepts.len());
		assert!(data.relations.iter().all(|r| ids.contains(&r.from) && ids.contains(&r.to)));
	}

	#[test]
	fn single_root_owned_by_everyone() {
		let data = concept_dataset();
		let roots: Vec<_> = data.concepts.iter().filter(|c| c.parent.is_none()).collect();
		assert_eq!(roots.len(), 1);
		assert_eq!(roots[0].speaker, "All");
	}

	#[test]
	fn retired_concepts_are_zero_sized() {
		let data = concept_dataset();
		let retired: Vec<NodeId> = data
			.concepts
			.iter()
			.filter(|c| c.width == 0.0 && c.height == 0.0)
			.map(|c| c.id)
			.collect();
		assert_eq!(retired, vec![31, 7]);
	}
}
