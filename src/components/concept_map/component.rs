use std::cell::RefCell;
use std::rc::Rc;

use leptos::html::{Canvas, Video};
use leptos::prelude::*;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MouseEvent};

use super::config::MapConfig;
use super::layout::{BrowserStore, LayoutPersistence, MemoryStore};
use super::media::{MediaCommand, format_time};
use super::render;
use super::state::ConceptMapState;
use super::transform::{ScreenTransform, SurfaceRect};
use super::types::{Dataset, Point, PointerButton, SpeakerFilter};
use super::viewport::ViewBox;

/// Values the controls around the canvas display.
#[derive(Clone, Debug, Default, PartialEq)]
struct Chrome {
	zoom: f64,
	text_scale: f64,
	time: f64,
	duration: f64,
	slider_max: f64,
	playing: bool,
	speaker: String,
	cursor: &'static str,
}

impl Chrome {
	fn of(state: &ConceptMapState) -> Self {
		Self {
			zoom: state.viewport.zoom(),
			text_scale: state.viewport.text_scale(),
			time: state.clock.current_time,
			duration: state.clock.duration,
			slider_max: state.clock.slider_max(),
			playing: state.clock.playing,
			speaker: state.filter().to_string(),
			cursor: state.cursor(),
		}
	}
}

type SharedState = Rc<RefCell<ConceptMapState>>;

/// Runs one state operation and republishes the chrome snapshot once the borrow is released.
fn update<R>(state: &SharedState, chrome: RwSignal<Chrome>, f: impl FnOnce(&mut ConceptMapState) -> R) -> R {
	let (result, snapshot) = {
		let mut s = state.borrow_mut();
		let result = f(&mut s);
		(result, Chrome::of(&s))
	};
	chrome.set(snapshot);
	result
}

fn apply_media(video: Option<HtmlVideoElement>, command: MediaCommand) {
	let Some(video) = video else {
		return;
	};
	match command {
		MediaCommand::Seek(t) => video.set_current_time(t),
		MediaCommand::Pause => {
			if let Err(e) = video.pause() {
				warn!("could not pause media: {e:?}");
			}
		}
		MediaCommand::Play { from } => {
			if let Some(t) = from {
				video.set_current_time(t);
			}
			if let Err(e) = video.play() {
				error!("error playing media: {e:?}");
			}
		}
	}
}

fn client_point(ev: &MouseEvent) -> Point {
	Point::new(ev.client_x() as f64, ev.client_y() as f64)
}

/// Transform for pointer events, from the canvas' on-screen box.
fn client_transform(canvas_ref: NodeRef<Canvas>, view_box: ViewBox) -> Option<ScreenTransform> {
	let canvas = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	ScreenTransform::new(
		SurfaceRect {
			left: rect.left(),
			top: rect.top(),
			width: rect.width(),
			height: rect.height(),
		},
		view_box,
	)
}

/// Transform for drawing, in canvas pixels.
fn canvas_transform(canvas: &HtmlCanvasElement, view_box: ViewBox) -> Option<ScreenTransform> {
	ScreenTransform::new(
		SurfaceRect {
			left: 0.0,
			top: 0.0,
			width: canvas.width() as f64,
			height: canvas.height() as f64,
		},
		view_box,
	)
}

fn fit_to_parent(canvas: &HtmlCanvasElement) {
	let (w, h) = canvas
		.parent_element()
		.map(|p| (p.client_width() as u32, p.client_height() as u32))
		.unwrap_or((800, 600));
	canvas.set_width(w);
	canvas.set_height(h);
}

#[component]
pub fn ConceptMapCanvas(
	dataset: Dataset,
	#[prop(default = MapConfig::default())] config: MapConfig,
	#[prop(default = false)] edit_mode: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let video_ref = NodeRef::<Video>::new();

	let persistence = match BrowserStore::local() {
		Ok(store) => Some(LayoutPersistence::new(store, config.storage_key)),
		Err(e) => {
			warn!("layout persistence unavailable: {e}");
			None
		}
	};
	let layout = match &persistence {
		Some(p) => p.load(&dataset.concepts, config.initial_view, config.fallback_region),
		None => LayoutPersistence::new(MemoryStore::default(), config.storage_key).load(
			&dataset.concepts,
			config.initial_view,
			config.fallback_region,
		),
	};
	info!("layout loaded from {:?}", layout.source);

	let speakers = dataset.speakers.clone();
	let state: SharedState = Rc::new(RefCell::new(ConceptMapState::new(dataset, layout, &config, edit_mode)));
	let persistence = Rc::new(persistence);
	let chrome = RwSignal::new(Chrome::of(&state.borrow()));
	let notice = RwSignal::new(None::<String>);
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) = (state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		fit_to_parent(&canvas);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("2d canvas context unavailable");
			return;
		};

		let canvas_resize = canvas.clone();
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || fit_to_parent(&canvas_resize)));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Ok(s) = state_anim.try_borrow() {
				let transform = canvas_transform(&canvas, s.viewport.view_box());
				render::render(
					&s,
					&ctx,
					canvas.width() as f64,
					canvas.height() as f64,
					transform.as_ref(),
				);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Media that already has metadata when mounted never fires `loadedmetadata`.
	let state_media = state.clone();
	Effect::new(move |_| {
		let Some(video) = video_ref.get() else {
			return;
		};
		if video.ready_state() >= web_sys::HtmlMediaElement::HAVE_METADATA {
			update(&state_media, chrome, |s| s.clock.on_metadata(video.duration()));
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		update(&state_md, chrome, |s| {
			let transform = client_transform(canvas_ref, s.viewport.view_box());
			s.pointer_down(client_point(&ev), PointerButton::from_dom(ev.button()), transform.as_ref());
		});
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let mut s = state_mm.borrow_mut();
		let transform = client_transform(canvas_ref, s.viewport.view_box());
		s.pointer_move(client_point(&ev), transform.as_ref());
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| update(&state_mu, chrome, |s| s.pointer_up());

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| update(&state_ml, chrome, |s| s.pointer_up());

	let state_click = state.clone();
	let on_click = move |ev: MouseEvent| {
		let mut s = state_click.borrow_mut();
		let transform = client_transform(canvas_ref, s.viewport.view_box());
		s.click(client_point(&ev), transform.as_ref());
	};

	let (s_zo, s_zi, s_rv, s_td, s_ti) = (state.clone(), state.clone(), state.clone(), state.clone(), state.clone());
	let on_zoom_out = move |_| update(&s_zo, chrome, |s| s.viewport.zoom_out());
	let on_zoom_in = move |_| update(&s_zi, chrome, |s| s.viewport.zoom_in());
	let on_reset = move |_| update(&s_rv, chrome, |s| s.viewport.reset());
	let on_text_down = move |_| update(&s_td, chrome, |s| s.viewport.decrease_text_scale());
	let on_text_up = move |_| update(&s_ti, chrome, |s| s.viewport.increase_text_scale());

	let state_filter = state.clone();
	let on_speaker = move |value: String| {
		let filter = SpeakerFilter::from_select(&value);
		update(&state_filter, chrome, |s| s.set_filter(filter));
	};

	// Engine time and media position move together in this one handler.
	let state_seek = state.clone();
	let on_seek = move |value: String| {
		let Ok(t) = value.parse::<f64>() else {
			return;
		};
		let command = update(&state_seek, chrome, |s| s.seek(t));
		apply_media(video_ref.get_untracked(), command);
	};

	let state_play = state.clone();
	let on_play_pause = move |_| {
		let command = update(&state_play, chrome, |s| s.toggle_play());
		apply_media(video_ref.get_untracked(), command);
	};

	let (s_meta, s_time, s_on_play, s_on_pause, s_end) =
		(state.clone(), state.clone(), state.clone(), state.clone(), state.clone());
	let on_metadata = move |_| {
		if let Some(video) = video_ref.get_untracked() {
			update(&s_meta, chrome, |s| s.clock.on_metadata(video.duration()));
		}
	};
	let on_time_update = move |_| {
		if let Some(video) = video_ref.get_untracked() {
			update(&s_time, chrome, |s| s.set_time(video.current_time()));
		}
	};
	let on_media_play = move |_| update(&s_on_play, chrome, |s| s.clock.on_play());
	let on_media_pause = move |_| update(&s_on_pause, chrome, |s| s.clock.on_pause());
	let on_media_ended = move |_| {
		let command = update(&s_end, chrome, |s| s.media_ended());
		apply_media(video_ref.get_untracked(), command);
	};

	let (state_save, persistence_save) = (state.clone(), persistence.clone());
	let on_save = move |_| {
		let Some(p) = &*persistence_save else {
			notice.set(Some("Layout storage is not available in this browser.".into()));
			return;
		};
		let message = match state_save.borrow().save_layout(p) {
			Ok(saved) => format!("Layout saved ({} positions). See console for seed values.", saved.positions.len()),
			Err(e) => {
				error!("failed to save layout: {e}");
				format!("Error saving layout: {e}")
			}
		};
		notice.set(Some(message));
	};

	let persistence_clear = persistence.clone();
	let on_clear = move |_| {
		let message = match (*persistence_clear).as_ref().map(|p| p.clear()) {
			Some(Ok(())) => "Saved layout cleared. Defaults apply on next load.".to_owned(),
			Some(Err(e)) => {
				error!("failed to clear layout: {e}");
				format!("Error clearing layout: {e}")
			}
			None => "Layout storage is not available in this browser.".to_owned(),
		};
		notice.set(Some(message));
	};

	let speaker_options = speakers
		.iter()
		.map(|(name, _)| view! { <option value=*name>{*name}</option> })
		.collect_view();
	let legend = speakers
		.iter()
		.map(|(name, color)| {
			view! {
				<div class="legend-item">
					<span class="legend-swatch" style=format!("background-color: {color}")></span>
					<span>{*name}</span>
				</div>
			}
		})
		.collect_view();

	view! {
		<div class="concept-map">
			<div class="media-panel">
				<video
					node_ref=video_ref
					src=config.media_src
					controls=true
					class="media-player"
					on:loadedmetadata=on_metadata
					on:timeupdate=on_time_update
					on:play=on_media_play
					on:pause=on_media_pause
					on:ended=on_media_ended
				/>
				<div class="timeline-header">
					<button class="icon-button" on:click=on_play_pause>
						{move || if chrome.with(|c| c.playing) { "Pause" } else { "Play" }}
					</button>
					<span>"Media Timeline"</span>
					<span>
						{move || chrome.with(|c| format!("{} / {}", format_time(c.time), format_time(c.duration)))}
					</span>
				</div>
				<input
					type="range"
					min="0"
					class="timeline"
					prop:max=move || chrome.with(|c| c.slider_max)
					prop:value=move || chrome.with(|c| c.time.floor())
					prop:disabled=move || chrome.with(|c| c.duration <= 0.0)
					on:input=move |ev| on_seek(event_target_value(&ev))
				/>
			</div>

			<div class="controls">
				<label>
					"Filter by Speaker: "
					<select
						prop:value=move || chrome.with(|c| c.speaker.clone())
						on:change=move |ev| on_speaker(event_target_value(&ev))
					>
						<option value="all">"All Speakers"</option>
						{speaker_options}
					</select>
				</label>
				<div class="control-group">
					<button on:click=on_zoom_out title="Zoom Out">"-"</button>
					<button on:click=on_zoom_in title="Zoom In">"+"</button>
					<button on:click=on_reset title="Reset View">"Reset"</button>
					<span>{move || format!("Zoom: {}%", (chrome.with(|c| c.zoom) * 100.0).round())}</span>
				</div>
				<div class="control-group">
					<span>"Text:"</span>
					<button on:click=on_text_down title="Decrease Font Size">"A-"</button>
					<button on:click=on_text_up title="Increase Font Size">"A+"</button>
					<span>{move || format!("{}%", (chrome.with(|c| c.text_scale) * 100.0).round())}</span>
				</div>
				<span class="hint">"Drag background to pan"</span>
				{edit_mode
					.then(|| {
						view! {
							<button class="save-button" on:click=on_save>"Save Layout"</button>
							<button class="clear-button" on:click=on_clear>"Clear Saved Layout"</button>
						}
					})}
			</div>

			{move || notice.get().map(|text| view! { <p class="notice">{text}</p> })}

			{edit_mode
				.then(|| {
					view! { <p class="edit-banner">"EDIT MODE ACTIVE: Arrange map, then \"Save Layout\"."</p> }
				})}
			<div class="canvas-frame">
				<canvas
					node_ref=canvas_ref
					class="concept-map-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:click=on_click
					style=move || {
						format!("display: block; width: 100%; height: 100%; cursor: {};", chrome.with(|c| c.cursor))
					}
				/>
			</div>

			<div class="legend">{legend}</div>
			<div class="footer">
				<p>
					{if edit_mode {
						"In Edit Mode, arrange map, then 'Save Layout'. Remove '?editMode=true' from the URL to leave it."
					} else {
						"Use the timeline to scrub. Click concepts (+/-) to expand or collapse."
					}}
				</p>
				<p class="legend-lines">"Dashed: not yet discussed. Solid: discussed."</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::concept_map::types::ConceptSeed;

	fn state(edit_mode: bool) -> ConceptMapState {
		let dataset = Dataset {
			concepts: vec![ConceptSeed {
				id: 1,
				text: "root",
				speaker: "All",
				width: 500.0,
				height: 70.0,
				parent: None,
				children: &[],
				timestamp: 0.0,
				default_position: Some(Point::new(400.0, 100.0)),
			}],
			relations: vec![],
			speakers: vec![("Kit", "#2563eb")],
		};
		let config = MapConfig::default();
		let layout = LayoutPersistence::new(MemoryStore::default(), config.storage_key).load(
			&dataset.concepts,
			config.initial_view,
			config.fallback_region,
		);
		ConceptMapState::new(dataset, layout, &config, edit_mode)
	}

	#[test]
	fn chrome_cursor_follows_pan() {
		let mut s = state(true);
		assert_eq!(Chrome::of(&s).cursor, "grab");
		s.pointer_down(Point::new(10.0, 10.0), PointerButton::Primary, None);
		assert_eq!(Chrome::of(&s).cursor, "grabbing");
		s.pointer_up();
		assert_eq!(Chrome::of(&s).cursor, "grab");
		assert_eq!(Chrome::of(&state(false)).cursor, "default");
	}

	#[test]
	fn chrome_speaker_matches_select_values() {
		let mut s = state(false);
		assert_eq!(Chrome::of(&s).speaker, "all");
		s.set_filter(SpeakerFilter::from_select("Kit"));
		assert_eq!(Chrome::of(&s).speaker, "Kit");
		s.set_filter(SpeakerFilter::from_select("all"));
		assert_eq!(Chrome::of(&s).speaker, "all");
	}
}
