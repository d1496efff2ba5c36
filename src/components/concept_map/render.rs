use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::ConceptMapState;
use super::timesync::{EdgeStyle, NodeStyle};
use super::transform::ScreenTransform;
use super::types::{Concept, EXPANDER_RADIUS, Point, Relation};

const BACKGROUND: &str = "#ffffff";
const EDGE_COLOR: &str = "#64748b";
const EDGE_TEXT_COLOR: &str = "#334155";
const SPEAKING_NODE: &str = "orange";
const SPEAKING_EDGE: &str = "darkorange";
const CORNER_RADIUS: f64 = 10.0;
const CURVE_FACTOR: f64 = 0.25;
const ARROW_LENGTH: f64 = 10.0;
const ARROW_WIDTH: f64 = 7.0;

/// Node label size: roots are larger, narrow nodes smaller, never below 6px.
pub fn concept_font_size(concept: &Concept, text_scale: f64) -> f64 {
	let base = match (concept.is_root(), concept.text.chars().count() > 40, concept.width < 180.0) {
		(true, true, _) => 13.0,
		(true, false, _) => 15.0,
		(false, _, true) => 11.0,
		(false, _, false) => 12.0,
	};
	(base * text_scale).max(6.0)
}

pub fn edge_font_size(text_scale: f64) -> f64 {
	(10.0 * text_scale).max(5.0)
}

/// Quadratic curve between two node borders, bowed sideways, with its midpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCurve {
	pub start: Point,
	pub control: Point,
	pub end: Point,
	pub label: Point,
}

impl EdgeCurve {
	pub fn between(from: &Concept, to: &Concept) -> Self {
		let angle = (to.y - from.y).atan2(to.x - from.x);
		let (cos, sin) = (angle.cos(), angle.sin());
		let start_offset = from.width.min(from.height) / 2.0 + 2.0;
		let end_offset = to.width.min(to.height) / 2.0 + 7.0;
		let start = Point::new(from.x + start_offset * cos, from.y + start_offset * sin);
		let end = Point::new(to.x - end_offset * cos, to.y - end_offset * sin);

		let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
		let (dx, dy) = (end.x - start.x, end.y - start.y);
		let x_bias = if dx.abs() > dy.abs() { 2.0 } else { 1.0 };
		let y_bias = if dy.abs() > dx.abs() { 2.0 } else { 1.0 };
		let control = Point::new(mid.x - CURVE_FACTOR * dy * x_bias, mid.y + CURVE_FACTOR * dx * y_bias);

		let t = 0.5;
		let label = Point::new(
			(1.0 - t) * (1.0 - t) * start.x + 2.0 * (1.0 - t) * t * control.x + t * t * end.x,
			(1.0 - t) * (1.0 - t) * start.y + 2.0 * (1.0 - t) * t * control.y + t * t * end.y,
		);
		Self {
			start,
			control,
			end,
			label,
		}
	}
}

/// Greedy word wrap against a width measure. A single overlong word gets its own line.
pub fn wrap_words(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
	let mut lines: Vec<String> = Vec::new();
	let mut line = String::new();
	for word in text.split_whitespace() {
		let candidate = if line.is_empty() {
			word.to_owned()
		} else {
			format!("{line} {word}")
		};
		if measure(&candidate) <= max_width || line.is_empty() {
			line = candidate;
		} else {
			lines.push(std::mem::replace(&mut line, word.to_owned()));
		}
	}
	if !line.is_empty() {
		lines.push(line);
	}
	lines
}

pub fn render(
	state: &ConceptMapState,
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
	transform: Option<&ScreenTransform>,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	let Some(transform) = transform else {
		return;
	};
	let (offset_x, offset_y) = transform.offset();
	let view_box = transform.view_box();
	let zoom = state.viewport.zoom();

	ctx.save();
	let _ = ctx.translate(offset_x, offset_y);
	let _ = ctx.scale(transform.scale(), transform.scale());
	let _ = ctx.translate(-view_box.x, -view_box.y);
	let _ = ctx.scale(zoom, zoom);
	draw_concepts(state, ctx);
	draw_relations(state, ctx);
	ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d, dashed: bool, len: f64) {
	let pattern = if dashed {
		js_sys::Array::of2(&JsValue::from_f64(len), &JsValue::from_f64(len))
	} else {
		js_sys::Array::new()
	};
	let _ = ctx.set_line_dash(&pattern);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	ctx.line_to(x + w - r, y);
	ctx.quadratic_curve_to(x + w, y, x + w, y + r);
	ctx.line_to(x + w, y + h - r);
	ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
	ctx.line_to(x + r, y + h);
	ctx.quadratic_curve_to(x, y + h, x, y + h - r);
	ctx.line_to(x, y + r);
	ctx.quadratic_curve_to(x, y, x + r, y);
	ctx.close_path();
}

fn draw_concepts(state: &ConceptMapState, ctx: &CanvasRenderingContext2d) {
	let text_scale = state.viewport.text_scale();
	for concept in state.visible_concepts() {
		let style = state.node_style(concept);
		let color = state.dataset.speaker_color(&concept.speaker);
		let dragging = state.drag.dragged() == Some(concept.id);
		draw_concept_box(ctx, concept, style, color, dragging);
		draw_concept_text(ctx, concept, style, text_scale);
		if state.has_children(concept.id) {
			draw_expander(ctx, concept, style, color, state.is_expanded(concept.id), text_scale);
		}
	}
}

fn draw_concept_box(ctx: &CanvasRenderingContext2d, concept: &Concept, style: NodeStyle, color: &str, dragging: bool) {
	let (x, y) = (concept.x - concept.width / 2.0, concept.y - concept.height / 2.0);
	ctx.save();
	if style.speaking {
		ctx.set_shadow_color(SPEAKING_NODE);
		ctx.set_shadow_blur(12.0);
	}
	rounded_rect(ctx, x, y, concept.width, concept.height, CORNER_RADIUS);
	ctx.set_global_alpha(0.8 * style.opacity());
	ctx.set_fill_style_str(color);
	ctx.fill();

	ctx.set_global_alpha(1.0);
	set_dash(ctx, !style.discussed, 5.0);
	let (stroke, line_width) = match (style.speaking, dragging) {
		(true, _) => (SPEAKING_NODE, 4.0),
		(false, true) => (color, 3.0),
		(false, false) => (color, 2.0),
	};
	ctx.set_stroke_style_str(stroke);
	ctx.set_line_width(line_width);
	ctx.stroke();
	ctx.restore();
}

fn draw_concept_text(ctx: &CanvasRenderingContext2d, concept: &Concept, style: NodeStyle, text_scale: f64) {
	let size = concept_font_size(concept, text_scale);
	let weight = if concept.is_root() { "bold " } else { "" };
	ctx.save();
	ctx.set_global_alpha(style.opacity());
	ctx.set_font(&format!("{weight}{size}px sans-serif"));
	ctx.set_fill_style_str("white");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let lines = wrap_words(&concept.text, concept.width - 10.0, |s| {
		ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0)
	});
	let line_height = size * 1.2;
	let top = concept.y - line_height * (lines.len() as f64 - 1.0) / 2.0;
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(line, concept.x, top + line_height * i as f64);
	}
	ctx.restore();
}

fn draw_expander(
	ctx: &CanvasRenderingContext2d,
	concept: &Concept,
	style: NodeStyle,
	color: &str,
	expanded: bool,
	text_scale: f64,
) {
	let c = concept.expander_center();
	ctx.save();
	ctx.set_global_alpha(style.opacity());
	ctx.begin_path();
	let _ = ctx.arc(c.x, c.y, EXPANDER_RADIUS, 0.0, 2.0 * PI);
	ctx.set_fill_style_str("white");
	ctx.fill();
	ctx.set_fill_style_str(color);
	ctx.set_font(&format!("bold {}px sans-serif", (12.0 * text_scale).max(6.0)));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(if expanded { "-" } else { "+" }, c.x, c.y);
	ctx.restore();
}

fn draw_relations(state: &ConceptMapState, ctx: &CanvasRenderingContext2d) {
	let text_scale = state.viewport.text_scale();
	for (relation, from, to) in state.visible_relations() {
		let style = state.edge_style(relation, from, to);
		let curve = EdgeCurve::between(from, to);
		draw_curve(ctx, &curve, style);
		draw_edge_label(ctx, relation, &curve, style, text_scale);
	}
}

fn draw_curve(ctx: &CanvasRenderingContext2d, curve: &EdgeCurve, style: EdgeStyle) {
	let (stroke, width) = if style.speaking { (SPEAKING_EDGE, 3.0) } else { (EDGE_COLOR, 2.0) };
	ctx.save();
	ctx.set_global_alpha(style.opacity());
	ctx.set_stroke_style_str(stroke);
	ctx.set_line_width(width);
	set_dash(ctx, !style.discussed, 5.0);
	ctx.begin_path();
	ctx.move_to(curve.start.x, curve.start.y);
	ctx.quadratic_curve_to(curve.control.x, curve.control.y, curve.end.x, curve.end.y);
	ctx.stroke();

	// Arrowhead along the curve tangent at the end point.
	let (dx, dy) = (curve.end.x - curve.control.x, curve.end.y - curve.control.y);
	let len = dx.hypot(dy);
	if len > 0.001 {
		let (ux, uy) = (dx / len, dy / len);
		let back = Point::new(curve.end.x - ux * ARROW_LENGTH, curve.end.y - uy * ARROW_LENGTH);
		let (px, py) = (-uy * ARROW_WIDTH / 2.0, ux * ARROW_WIDTH / 2.0);
		set_dash(ctx, false, 0.0);
		ctx.set_fill_style_str(EDGE_COLOR);
		ctx.begin_path();
		ctx.move_to(curve.end.x, curve.end.y);
		ctx.line_to(back.x + px, back.y + py);
		ctx.line_to(back.x - px, back.y - py);
		ctx.close_path();
		ctx.fill();
	}
	ctx.restore();
}

fn draw_edge_label(
	ctx: &CanvasRenderingContext2d,
	relation: &Relation,
	curve: &EdgeCurve,
	style: EdgeStyle,
	text_scale: f64,
) {
	let size = edge_font_size(text_scale);
	let chars = relation.text.chars().count() as f64;
	let (w, h) = (chars * size * 0.8 + 20.0, size + 10.0);
	let (x, y) = (curve.label.x - (chars * size * 0.4 + 10.0), curve.label.y - (size * 0.5 + 5.0));
	let accent = if style.speaking { SPEAKING_EDGE } else { EDGE_COLOR };

	ctx.save();
	ctx.set_global_alpha(style.opacity());
	rounded_rect(ctx, x, y, w, h, 5.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.95)");
	ctx.fill();
	set_dash(ctx, !style.discussed, 3.0);
	ctx.set_stroke_style_str(accent);
	ctx.set_line_width(1.0);
	ctx.stroke();

	ctx.set_font(&format!("{size}px sans-serif"));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(if style.speaking { SPEAKING_EDGE } else { EDGE_TEXT_COLOR });
	let _ = ctx.fill_text(&relation.text, curve.label.x, curve.label.y + 1.0);
	ctx.restore();
}

#[cfg(test)]
mod tests {
	use super::*;

	fn concept(x: f64, y: f64, width: f64, parent: Option<u32>, text: &str) -> Concept {
		Concept {
			id: 1,
			text: text.into(),
			speaker: "All".into(),
			x,
			y,
			width,
			height: 50.0,
			parent,
			children: vec![],
			timestamp: 0.0,
		}
	}

	#[test]
	fn font_sizes_follow_role_and_width() {
		let long = "Design, Culture, Values, and Technoscience in the Age of Biology";
		assert_eq!(concept_font_size(&concept(0.0, 0.0, 500.0, None, long), 1.0), 13.0);
		assert_eq!(concept_font_size(&concept(0.0, 0.0, 500.0, None, "Short"), 1.0), 15.0);
		assert_eq!(concept_font_size(&concept(0.0, 0.0, 150.0, Some(1), "x"), 1.0), 11.0);
		assert_eq!(concept_font_size(&concept(0.0, 0.0, 200.0, Some(1), "x"), 2.0), 24.0);
		assert_eq!(concept_font_size(&concept(0.0, 0.0, 150.0, Some(1), "x"), 0.5), 6.0);
		assert_eq!(edge_font_size(0.4), 5.0);
	}

	#[test]
	fn horizontal_edge_bows_downward() {
		let a = concept(0.0, 0.0, 100.0, None, "a");
		let b = concept(200.0, 0.0, 100.0, Some(1), "b");
		let curve = EdgeCurve::between(&a, &b);
		assert_eq!(curve.start, Point::new(27.0, 0.0));
		assert_eq!(curve.end, Point::new(168.0, 0.0));
		assert_eq!(curve.control.x, 97.5);
		assert!((curve.control.y - 35.25).abs() < 1e-9);
		assert!((curve.label.y - 17.625).abs() < 1e-9);
	}

	#[test]
	fn wrap_breaks_on_width() {
		let lines = wrap_words("Story of Self and more", 8.0, |s| s.len() as f64);
		assert_eq!(lines, vec!["Story of", "Self and", "more"]);
		assert_eq!(wrap_words("Overlongword", 3.0, |s| s.len() as f64), vec!["Overlongword"]);
		assert!(wrap_words("", 10.0, |s| s.len() as f64).is_empty());
	}
}
