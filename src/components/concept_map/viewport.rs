use std::fmt;
use std::str::FromStr;

use super::types::{Point, PointerButton};

pub const ZOOM_MIN: f64 = 0.3;
pub const ZOOM_MAX: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.1;
pub const TEXT_SCALE_MIN: f64 = 0.5;
pub const TEXT_SCALE_MAX: f64 = 2.0;
pub const TEXT_SCALE_STEP: f64 = 0.1;

/// Visible logical region: origin plus extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl ViewBox {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self { x, y, width, height }
	}
}

/// Space separated `x y width height`, shortest round-trip float formatting.
impl fmt::Display for ViewBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("view box must be four finite numbers, got {0:?}")]
pub struct ViewBoxParseError(pub String);

impl FromStr for ViewBox {
	type Err = ViewBoxParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let fail = || ViewBoxParseError(s.to_owned());
		let parts = s
			.split_whitespace()
			.map(|p| p.parse::<f64>().ok().filter(|v| v.is_finite()))
			.collect::<Option<Vec<_>>>()
			.ok_or_else(fail)?;
		match parts.as_slice() {
			&[x, y, width, height] => Ok(Self::new(x, y, width, height)),
			_ => Err(fail()),
		}
	}
}

/// Zoom, view box and text scale as one unit; what reset restores and a layout carries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewSettings {
	pub zoom: f64,
	pub view_box: ViewBox,
	pub text_scale: f64,
}

impl ViewSettings {
	pub fn clamped(self) -> Self {
		Self {
			zoom: self.zoom.clamp(ZOOM_MIN, ZOOM_MAX),
			text_scale: self.text_scale.clamp(TEXT_SCALE_MIN, TEXT_SCALE_MAX),
			..self
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub last: Point,
	pub moved: bool,
}

/// Sole owner of zoom, view box and text scale.
#[derive(Clone, Debug)]
pub struct Viewport {
	current: ViewSettings,
	defaults: ViewSettings,
	pan: PanState,
}

impl Viewport {
	pub fn new(current: ViewSettings, defaults: ViewSettings) -> Self {
		Self {
			current: current.clamped(),
			defaults: defaults.clamped(),
			pan: PanState::default(),
		}
	}

	pub fn settings(&self) -> ViewSettings {
		self.current
	}

	pub fn zoom(&self) -> f64 {
		self.current.zoom
	}

	pub fn view_box(&self) -> ViewBox {
		self.current.view_box
	}

	pub fn text_scale(&self) -> f64 {
		self.current.text_scale
	}

	pub fn zoom_in(&mut self) {
		self.current.zoom = (self.current.zoom + ZOOM_STEP).min(ZOOM_MAX);
	}

	pub fn zoom_out(&mut self) {
		self.current.zoom = (self.current.zoom - ZOOM_STEP).max(ZOOM_MIN);
	}

	pub fn increase_text_scale(&mut self) {
		self.current.text_scale = (self.current.text_scale + TEXT_SCALE_STEP).min(TEXT_SCALE_MAX);
	}

	pub fn decrease_text_scale(&mut self) {
		self.current.text_scale = (self.current.text_scale - TEXT_SCALE_STEP).max(TEXT_SCALE_MIN);
	}

	pub fn reset(&mut self) {
		self.current = self.defaults;
	}

	pub fn is_panning(&self) -> bool {
		self.pan.active
	}

	/// Whether the last pan gesture actually moved the view box.
	pub fn pan_moved(&self) -> bool {
		self.pan.moved
	}

	/// Starts a pan unless a node drag already owns the pointer stream.
	pub fn begin_pan(&mut self, at: Point, button: PointerButton, dragging: bool) -> bool {
		if button != PointerButton::Primary || dragging {
			return false;
		}
		self.pan = PanState {
			active: true,
			last: at,
			moved: false,
		};
		true
	}

	/// Screen delta over zoom, subtracted from the view box origin.
	pub fn continue_pan(&mut self, at: Point) {
		if !self.pan.active {
			return;
		}
		let (dx, dy) = (at.x - self.pan.last.x, at.y - self.pan.last.y);
		self.pan.last = at;
		if dx == 0.0 && dy == 0.0 {
			return;
		}
		self.pan.moved = true;
		self.current.view_box.x -= dx / self.current.zoom;
		self.current.view_box.y -= dy / self.current.zoom;
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn defaults() -> ViewSettings {
		ViewSettings {
			zoom: 1.1,
			view_box: ViewBox::new(102.72727272727266, -26.363636363636363, 1600.0, 1200.0),
			text_scale: 1.5,
		}
	}

	#[test]
	fn view_box_string_round_trips_exactly() {
		let text = "102.72727272727266 -26.363636363636363 1600 1200";
		let vb: ViewBox = text.parse().unwrap();
		assert_eq!(vb.to_string(), text);
	}

	#[test]
	fn view_box_rejects_wrong_arity_and_garbage() {
		assert!("1 2 3".parse::<ViewBox>().is_err());
		assert!("1 2 3 4 5".parse::<ViewBox>().is_err());
		assert!("1 2 three 4".parse::<ViewBox>().is_err());
		assert!("1 2 NaN 4".parse::<ViewBox>().is_err());
	}

	#[test]
	fn zoom_saturates_at_bounds() {
		let mut v = Viewport::new(defaults(), defaults());
		for _ in 0..100 {
			v.zoom_in();
		}
		assert_eq!(v.zoom(), ZOOM_MAX);
		for _ in 0..100 {
			v.zoom_out();
		}
		assert_eq!(v.zoom(), ZOOM_MIN);
	}

	#[test]
	fn text_scale_saturates_at_bounds() {
		let mut v = Viewport::new(defaults(), defaults());
		for _ in 0..50 {
			v.decrease_text_scale();
		}
		assert_eq!(v.text_scale(), TEXT_SCALE_MIN);
		for _ in 0..50 {
			v.increase_text_scale();
		}
		assert_eq!(v.text_scale(), TEXT_SCALE_MAX);
	}

	#[test]
	fn reset_restores_all_three_defaults() {
		let mut v = Viewport::new(defaults(), defaults());
		v.zoom_in();
		v.increase_text_scale();
		v.begin_pan(Point::new(0.0, 0.0), PointerButton::Primary, false);
		v.continue_pan(Point::new(40.0, 40.0));
		v.reset();
		assert_eq!(v.settings(), defaults());
	}

	#[test]
	fn pan_moves_origin_against_drag_in_logical_units() {
		let mut start = defaults();
		start.zoom = 2.0;
		start.view_box = ViewBox::new(0.0, 0.0, 1600.0, 1200.0);
		let mut v = Viewport::new(start, defaults());
		assert!(v.begin_pan(Point::new(100.0, 100.0), PointerButton::Primary, false));
		v.continue_pan(Point::new(120.0, 90.0));
		assert_eq!(v.view_box(), ViewBox::new(-10.0, 5.0, 1600.0, 1200.0));
		assert!(v.pan_moved());
		v.end_pan();
		v.continue_pan(Point::new(500.0, 500.0));
		assert_eq!(v.view_box(), ViewBox::new(-10.0, 5.0, 1600.0, 1200.0));
	}

	#[test]
	fn pan_requires_primary_button_and_no_drag() {
		let mut v = Viewport::new(defaults(), defaults());
		assert!(!v.begin_pan(Point::default(), PointerButton::Other, false));
		assert!(!v.begin_pan(Point::default(), PointerButton::Primary, true));
		assert!(!v.is_panning());
	}

	#[test]
	fn out_of_range_settings_are_clamped_on_construction() {
		let wild = ViewSettings {
			zoom: 9.0,
			text_scale: 0.1,
			..defaults()
		};
		let v = Viewport::new(wild, defaults());
		assert_eq!(v.zoom(), ZOOM_MAX);
		assert_eq!(v.text_scale(), TEXT_SCALE_MIN);
	}
}
