use super::layout::FallbackRegion;
use super::types::NodeId;
use super::viewport::{ViewBox, ViewSettings};

/// Startup configuration of a concept map. Everything here is seed data, not engine logic.
#[derive(Clone, Debug)]
pub struct MapConfig {
	pub initial_view: ViewSettings,
	pub storage_key: &'static str,
	pub expanded_by_default: Vec<NodeId>,
	pub fallback_region: FallbackRegion,
	pub media_src: &'static str,
}

impl Default for MapConfig {
	fn default() -> Self {
		Self {
			initial_view: ViewSettings {
				zoom: 1.1,
				view_box: ViewBox::new(102.72727272727266, -26.363636363636363, 1600.0, 1200.0),
				text_scale: 1.5,
			},
			storage_key: "conceptMapLayout_v3",
			expanded_by_default: vec![1, 2, 3, 4, 5, 8, 12, 23],
			fallback_region: FallbackRegion {
				x: 200.0,
				y: 200.0,
				width: 1200.0,
				height: 800.0,
			},
			media_src: "/On Culture-Design-Purpose-and-Technoscience-in-the-Age-of-Biology.mp4",
		}
	}
}

/// Edit mode is a launch parameter: `?editMode=true`.
pub fn edit_mode_from_location() -> bool {
	let Some(search) = web_sys::window().and_then(|w| w.location().search().ok()) else {
		return false;
	};
	edit_mode_from_query(&search)
}

/// Only the first `editMode` value counts, after percent-decoding.
fn edit_mode_from_query(search: &str) -> bool {
	web_sys::UrlSearchParams::new_with_str(search)
		.ok()
		.and_then(|params| params.get("editMode"))
		.is_some_and(|value| value == "true")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_view_is_within_bounds() {
		let view = MapConfig::default().initial_view;
		assert_eq!(view.clamped(), view);
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
	use wasm_bindgen_test::*;

	wasm_bindgen_test_configure!(run_in_browser);

	use super::*;

	#[wasm_bindgen_test]
	fn edit_mode_needs_exact_flag() {
		assert!(edit_mode_from_query("?editMode=true"));
		assert!(edit_mode_from_query("?speaker=Kit&editMode=true"));
		assert!(edit_mode_from_query("?edit%4Dode=%74rue"));
		assert!(!edit_mode_from_query("?editMode=1"));
		assert!(!edit_mode_from_query(""));
	}

	#[wasm_bindgen_test]
	fn only_first_edit_mode_value_counts() {
		assert!(!edit_mode_from_query("?editMode=false&editMode=true"));
		assert!(edit_mode_from_query("?editMode=true&editMode=false"));
	}
}
