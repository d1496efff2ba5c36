use super::types::Point;
use super::viewport::ViewBox;

/// On-screen placement of the drawing surface, in client pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRect {
	pub left: f64,
	pub top: f64,
	pub width: f64,
	pub height: f64,
}

/// Screen-to-surface mapping for one frame: the view box is fitted into the
/// surface preserving aspect ratio and centred on the slack axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenTransform {
	surface: SurfaceRect,
	view_box: ViewBox,
	scale: f64,
	offset_x: f64,
	offset_y: f64,
}

impl ScreenTransform {
	/// Returns `None` while the surface has no measurable size yet.
	pub fn new(surface: SurfaceRect, view_box: ViewBox) -> Option<Self> {
		if surface.width <= 0.0
			|| surface.height <= 0.0
			|| view_box.width <= 0.0
			|| view_box.height <= 0.0
		{
			return None;
		}
		let scale = (surface.width / view_box.width).min(surface.height / view_box.height);
		Some(Self {
			surface,
			view_box,
			scale,
			offset_x: (surface.width - view_box.width * scale) / 2.0,
			offset_y: (surface.height - view_box.height * scale) / 2.0,
		})
	}

	pub fn scale(&self) -> f64 {
		self.scale
	}

	pub fn offset(&self) -> (f64, f64) {
		(self.offset_x, self.offset_y)
	}

	pub fn view_box(&self) -> ViewBox {
		self.view_box
	}

	/// Client point to view-box user space.
	pub fn to_surface(&self, client: Point) -> Point {
		Point::new(
			(client.x - self.surface.left - self.offset_x) / self.scale + self.view_box.x,
			(client.y - self.surface.top - self.offset_y) / self.scale + self.view_box.y,
		)
	}

	/// Client point to the unscaled logical space node positions live in.
	pub fn to_logical(&self, client: Point, zoom: f64) -> Point {
		let p = self.to_surface(client);
		Point::new(p.x / zoom, p.y / zoom)
	}
}

/// Maps a client point when a transform is available; an unmounted surface yields `None`.
pub fn client_to_logical(transform: Option<&ScreenTransform>, client: Point, zoom: f64) -> Option<Point> {
	transform.map(|t| t.to_logical(client, zoom))
}
