use leptos::prelude::*;
use log::info;

use super::dataset::concept_dataset;
use crate::components::concept_map::{ConceptMapCanvas, edit_mode_from_location};

/// Full-screen concept map; `?editMode=true` unlocks layout authoring.
#[component]
pub fn Home() -> impl IntoView {
	let edit_mode = edit_mode_from_location();
	if edit_mode {
		info!("Edit mode activated: drag concepts, pan, zoom, adjust text size, then Save Layout.");
	}

	view! {
		<div class="fullscreen-map">
			<ConceptMapCanvas dataset=concept_dataset() edit_mode=edit_mode />
		</div>
	}
}
