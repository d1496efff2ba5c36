use std::fmt;

/// Identity of a concept node; edges and saved layouts refer to nodes by it.
pub type NodeId = u32;

/// Speaker key shared by every speaker filter.
pub const UNIVERSAL_SPEAKER: &str = "All";

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// A labelled vertex of the concept tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Concept {
	pub id: NodeId,
	pub text: String,
	pub speaker: String,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub parent: Option<NodeId>,
	/// Informational only. Traversal always goes through `parent`.
	pub children: Vec<NodeId>,
	pub timestamp: f64,
}

impl Concept {
	pub fn is_root(&self) -> bool {
		self.parent.is_none()
	}

	/// Zero-size entries are kept for id stability but never shown.
	pub fn is_tombstone(&self) -> bool {
		self.width <= 0.0 || self.height <= 0.0
	}

	pub fn is_discussed(&self, t: f64) -> bool {
		self.timestamp <= t
	}

	pub fn contains(&self, p: Point) -> bool {
		(p.x - self.x).abs() <= self.width / 2.0 && (p.y - self.y).abs() <= self.height / 2.0
	}

	/// Centre of the expand/collapse badge drawn in the bottom-right corner.
	pub fn expander_center(&self) -> Point {
		Point::new(
			self.x + self.width / 2.0 - EXPANDER_INSET,
			self.y + self.height / 2.0 - EXPANDER_INSET,
		)
	}
}

pub const EXPANDER_INSET: f64 = 10.0;
pub const EXPANDER_RADIUS: f64 = 7.0;

/// A labelled directed connection between two concepts.
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
	pub from: NodeId,
	pub to: NodeId,
	pub text: String,
	pub timestamp: f64,
}

impl Relation {
	pub fn is_discussed(&self, t: f64) -> bool {
		self.timestamp <= t
	}
}

/// Concept record as authored, before a layout assigns it a position.
#[derive(Clone, Debug)]
pub struct ConceptSeed {
	pub id: NodeId,
	pub text: &'static str,
	pub speaker: &'static str,
	pub width: f64,
	pub height: f64,
	pub parent: Option<NodeId>,
	pub children: &'static [NodeId],
	pub timestamp: f64,
	pub default_position: Option<Point>,
}

#[derive(Clone, Debug, Default)]
pub struct Dataset {
	pub concepts: Vec<ConceptSeed>,
	pub relations: Vec<Relation>,
	pub speakers: Vec<(&'static str, &'static str)>,
}

impl Dataset {
	pub fn speaker_color(&self, speaker: &str) -> &'static str {
		if speaker == UNIVERSAL_SPEAKER {
			return NEUTRAL_COLOR;
		}
		self.speakers
			.iter()
			.find(|(name, _)| *name == speaker)
			.map(|(_, color)| *color)
			.unwrap_or(NEUTRAL_COLOR)
	}
}

const NEUTRAL_COLOR: &str = "#1e293b";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SpeakerFilter {
	#[default]
	All,
	Speaker(String),
}

impl SpeakerFilter {
	/// Parses the value of the speaker select; `"all"` clears the filter.
	pub fn from_select(value: &str) -> Self {
		if value == "all" {
			Self::All
		} else {
			Self::Speaker(value.to_owned())
		}
	}

	pub fn admits(&self, speaker: &str) -> bool {
		match self {
			Self::All => true,
			Self::Speaker(wanted) => speaker == wanted || speaker == UNIVERSAL_SPEAKER,
		}
	}
}

impl fmt::Display for SpeakerFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::All => f.write_str("all"),
			Self::Speaker(name) => f.write_str(name),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
	Primary,
	Other,
}

impl PointerButton {
	pub fn from_dom(button: i16) -> Self {
		if button == 0 { Self::Primary } else { Self::Other }
	}
}
