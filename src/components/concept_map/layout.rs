use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};

use super::types::{Concept, ConceptSeed, NodeId, Point};
use super::viewport::{ViewBox, ViewBoxParseError, ViewSettings};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
	#[error("layout storage is not available in this environment")]
	StorageUnavailable,
	#[error("layout storage {op} failed: {reason}")]
	Storage { op: &'static str, reason: String },
	#[error("layout could not be serialized: {0}")]
	Serialize(#[from] serde_json::Error),
	#[error("saved layout is malformed: {0}")]
	Malformed(String),
	#[error("layouts can only be saved in edit mode")]
	EditModeRequired,
}

/// Minimal key-value contract the layout is persisted through.
pub trait LayoutStore {
	fn get(&self, key: &str) -> Result<Option<String>, LayoutError>;
	fn set(&self, key: &str, value: &str) -> Result<(), LayoutError>;
	fn remove(&self, key: &str) -> Result<(), LayoutError>;
}

/// `window.localStorage`.
pub struct BrowserStore {
	storage: web_sys::Storage,
}

impl BrowserStore {
	pub fn local() -> Result<Self, LayoutError> {
		let storage = web_sys::window()
			.ok_or(LayoutError::StorageUnavailable)?
			.local_storage()
			.map_err(|e| js_failure("open", e))?
			.ok_or(LayoutError::StorageUnavailable)?;
		Ok(Self { storage })
	}
}

fn js_failure(op: &'static str, err: wasm_bindgen::JsValue) -> LayoutError {
	LayoutError::Storage {
		op,
		reason: err.as_string().unwrap_or_else(|| format!("{err:?}")),
	}
}

impl LayoutStore for BrowserStore {
	fn get(&self, key: &str) -> Result<Option<String>, LayoutError> {
		self.storage.get_item(key).map_err(|e| js_failure("read", e))
	}

	fn set(&self, key: &str, value: &str) -> Result<(), LayoutError> {
		self.storage.set_item(key, value).map_err(|e| js_failure("write", e))
	}

	fn remove(&self, key: &str) -> Result<(), LayoutError> {
		self.storage.remove_item(key).map_err(|e| js_failure("remove", e))
	}
}

/// In-process store; `read_only` makes every write fail like a full quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: RefCell<HashMap<String, String>>,
	read_only: bool,
}

impl MemoryStore {
	#[cfg(test)]
	pub fn read_only() -> Self {
		Self {
			entries: RefCell::default(),
			read_only: true,
		}
	}
}

impl LayoutStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, LayoutError> {
		Ok(self.entries.borrow().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), LayoutError> {
		if self.read_only {
			return Err(LayoutError::Storage {
				op: "write",
				reason: "quota exceeded".into(),
			});
		}
		self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), LayoutError> {
		self.entries.borrow_mut().remove(key);
		Ok(())
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedPosition {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
}

/// Stored record. Field names match what earlier builds of the map wrote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLayout {
	pub positions: Vec<SavedPosition>,
	pub zoom_level: f64,
	pub view_box: String,
	#[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "number_or_none")]
	pub font_size_scale: Option<f64>,
}

/// A non-numeric text scale is ignored instead of invalidating the whole record.
fn number_or_none<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
	Ok(serde_json::Value::deserialize(de)?.as_f64())
}

fn round2(v: f64) -> f64 {
	(v * 100.0).round() / 100.0
}

impl SavedLayout {
	pub fn capture(concepts: &[Concept], view: ViewSettings) -> Self {
		Self {
			positions: concepts
				.iter()
				.map(|c| SavedPosition {
					id: c.id,
					x: c.x.round(),
					y: c.y.round(),
				})
				.collect(),
			zoom_level: round2(view.zoom),
			view_box: view.view_box.to_string(),
			font_size_scale: Some(round2(view.text_scale)),
		}
	}

	pub fn parse(raw: &str) -> Result<Self, LayoutError> {
		serde_json::from_str(raw).map_err(|e| LayoutError::Malformed(e.to_string()))
	}

	fn view_settings(&self, defaults: ViewSettings) -> Result<ViewSettings, LayoutError> {
		let view_box: ViewBox = self
			.view_box
			.parse()
			.map_err(|e: ViewBoxParseError| LayoutError::Malformed(e.to_string()))?;
		Ok(ViewSettings {
			zoom: self.zoom_level,
			view_box,
			text_scale: self.font_size_scale.unwrap_or(defaults.text_scale),
		}
		.clamped())
	}
}

/// Region new nodes without any default position are scattered into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallbackRegion {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

/// Simple pseudo-random number generator (deterministic per id). Wide enough for any `u32` id.
fn rand_simple(seed: u64) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

impl FallbackRegion {
	pub fn place(&self, id: NodeId) -> Point {
		let seed = u64::from(id);
		Point::new(
			self.x + rand_simple(seed) * self.width,
			self.y + rand_simple(seed * 31 + 17) * self.height,
		)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutSource {
	Defaults,
	Saved,
	Discarded,
}

#[derive(Clone, Debug)]
pub struct LoadedLayout {
	pub concepts: Vec<Concept>,
	pub view: ViewSettings,
	pub source: LayoutSource,
}

/// Reads and writes one layout record under a fixed key.
pub struct LayoutPersistence<S> {
	store: S,
	key: String,
}

impl<S: LayoutStore> LayoutPersistence<S> {
	pub fn new(store: S, key: impl Into<String>) -> Self {
		Self { store, key: key.into() }
	}

	pub fn save(&self, concepts: &[Concept], view: ViewSettings) -> Result<SavedLayout, LayoutError> {
		let layout = SavedLayout::capture(concepts, view);
		self.store.set(&self.key, &serde_json::to_string(&layout)?)?;
		info!("layout saved ({} positions)", layout.positions.len());
		log_authoring_snapshot(&layout);
		Ok(layout)
	}

	pub fn clear(&self) -> Result<(), LayoutError> {
		self.store.remove(&self.key)?;
		info!("saved layout cleared");
		Ok(())
	}

	/// Never fails: a missing or malformed record falls back to defaults for every field.
	pub fn load(&self, seeds: &[ConceptSeed], defaults: ViewSettings, region: FallbackRegion) -> LoadedLayout {
		let raw = match self.store.get(&self.key) {
			Ok(raw) => raw,
			Err(e) => {
				warn!("could not read saved layout, using defaults: {e}");
				None
			}
		};
		let Some(raw) = raw else {
			return LoadedLayout {
				concepts: place_concepts(seeds, None, region),
				view: defaults,
				source: LayoutSource::Defaults,
			};
		};
		match SavedLayout::parse(&raw).and_then(|l| l.view_settings(defaults).map(|v| (l, v))) {
			Ok((layout, view)) => {
				let saved: HashMap<NodeId, Point> = layout
					.positions
					.iter()
					.map(|p| (p.id, Point::new(p.x, p.y)))
					.collect();
				LoadedLayout {
					concepts: place_concepts(seeds, Some(&saved), region),
					view,
					source: LayoutSource::Saved,
				}
			}
			Err(e) => {
				warn!("failed to parse saved layout, using defaults for all: {e}");
				LoadedLayout {
					concepts: place_concepts(seeds, None, region),
					view: defaults,
					source: LayoutSource::Discarded,
				}
			}
		}
	}
}

fn place_concepts(
	seeds: &[ConceptSeed],
	saved: Option<&HashMap<NodeId, Point>>,
	region: FallbackRegion,
) -> Vec<Concept> {
	seeds
		.iter()
		.map(|seed| {
			let pos = saved
				.and_then(|s| s.get(&seed.id).copied())
				.or(seed.default_position)
				.unwrap_or_else(|| region.place(seed.id));
			Concept {
				id: seed.id,
				text: seed.text.to_owned(),
				speaker: seed.speaker.to_owned(),
				x: pos.x,
				y: pos.y,
				width: seed.width,
				height: seed.height,
				parent: seed.parent,
				children: seed.children.to_vec(),
				timestamp: seed.timestamp,
			}
		})
		.collect()
}

/// Dumps the saved values in a form that can be pasted back into the dataset defaults.
fn log_authoring_snapshot(layout: &SavedLayout) {
	let positions: BTreeMap<NodeId, (f64, f64)> =
		layout.positions.iter().map(|p| (p.id, (p.x, p.y))).collect();
	match serde_json::to_string_pretty(&positions) {
		Ok(json) => info!("default positions:\n{json}"),
		Err(e) => warn!("could not format positions: {e}"),
	}
	info!(
		"initial zoom: {}, initial view box: \"{}\", initial text scale: {:?}",
		layout.zoom_level, layout.view_box, layout.font_size_scale
	);
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
	use wasm_bindgen_test::*;

	wasm_bindgen_test_configure!(run_in_browser);

	use super::*;

	#[wasm_bindgen_test]
	fn browser_store_round_trip() {
		let store = BrowserStore::local().unwrap();
		store.set("layout-wasm-test", "{}").unwrap();
		assert_eq!(store.get("layout-wasm-test").unwrap().as_deref(), Some("{}"));
		store.remove("layout-wasm-test").unwrap();
		assert_eq!(store.get("layout-wasm-test").unwrap(), None);
	}
}
