// Page-aware drawing surface.
//
// The composer works in a layout space with the origin at the top-left
// corner, y growing downward, one coordinate system per page. This module
// owns the translation of that space into per-page PDF content streams
// (bottom-left origin). It never decides page breaks on its own; `will_fit`
// answers the question and the composer calls `add_page`.

use pdf_writer::{Content, Name, Str};

use crate::fonts::{self, Font};
use crate::geometry::{self, CORNER_RATIO};

/// Fraction of the font size between the logical text top and the baseline.
const TEXT_ASCENT: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Rgb {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Text styling and constraints for a single `text` call.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Rgb,
    pub width: Option<f32>,
    pub align: Align,
    pub ellipsis: bool,
    pub char_spacing: f32,
    pub underline: bool,
}

impl TextStyle {
    pub fn new(font: Font, size: f32, color: Rgb) -> Self {
        TextStyle {
            font,
            size,
            color,
            width: None,
            align: Align::Left,
            ellipsis: false,
            char_spacing: 0.0,
            underline: false,
        }
    }

    pub fn width(mut self, w: f32) -> Self {
        self.width = Some(w);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Truncate with `...` instead of overflowing the width constraint.
    pub fn ellipsis(mut self) -> Self {
        self.ellipsis = true;
        self
    }

    pub fn char_spacing(mut self, spacing: f32) -> Self {
        self.char_spacing = spacing;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }
}

/// Fixed page geometry, tuned for the A4 report layout. The constants live
/// here rather than inline at call sites so other page sizes keep the same
/// proportions.
#[derive(Debug, Clone, Copy)]
pub struct PageMetrics {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Lowest logical y any block may extend to before a page break.
    pub content_bottom: f32,
}

impl Default for PageMetrics {
    fn default() -> Self {
        PageMetrics {
            width: 595.28,
            height: 841.89,
            margin: 50.0,
            content_bottom: 770.0,
        }
    }
}

/// Ordered per-page command streams plus the layout cursor.
pub struct Canvas {
    metrics: PageMetrics,
    done: Vec<Content>,
    current: Content,
    cursor_y: f32,
    open_saves: usize,
}

impl Canvas {
    pub fn new(metrics: PageMetrics) -> Self {
        Canvas {
            metrics,
            done: Vec::new(),
            current: Content::new(),
            cursor_y: metrics.margin,
            open_saves: 0,
        }
    }

    pub fn metrics(&self) -> PageMetrics {
        self.metrics
    }

    /// Zero-based index of the page currently drawn to.
    pub fn page_index(&self) -> usize {
        self.done.len()
    }

    pub fn page_count(&self) -> usize {
        self.done.len() + 1
    }

    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    pub fn set_cursor_y(&mut self, y: f32) {
        self.cursor_y = y;
    }

    pub fn move_down(&mut self, dy: f32) {
        self.cursor_y += dy;
    }

    /// Whether a block of `block_h` starting at the cursor stays above the
    /// bottom threshold. The decision to actually break belongs to the
    /// caller.
    pub fn will_fit(&self, block_h: f32) -> bool {
        self.cursor_y + block_h <= self.metrics.content_bottom
    }

    /// Start a new page and reset the cursor to the top margin.
    pub fn add_page(&mut self) {
        debug_assert_eq!(self.open_scopes(), 0, "graphics scope crossing a page break");
        self.done
            .push(std::mem::replace(&mut self.current, Content::new()));
        self.cursor_y = self.metrics.margin;
    }

    /// Number of unclosed `save` scopes (0 whenever no guard is alive).
    pub fn open_scopes(&self) -> usize {
        self.open_saves
    }

    /// Push the graphics state. The returned guard restores it when dropped,
    /// on every exit path, so clips and colors set inside the scope cannot
    /// leak into later drawing.
    pub fn save(&mut self) -> CanvasScope<'_> {
        self.current.save_state();
        self.open_saves += 1;
        CanvasScope { canvas: self }
    }

    fn flip_y(&self, y: f32) -> f32 {
        self.metrics.height - y
    }

    /// Axis-aligned filled rectangle with top-left corner `(x, y)`.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb) {
        let py = self.flip_y(y + h);
        self.current
            .save_state()
            .set_fill_rgb(fill.r, fill.g, fill.b)
            .rect(x, py, w, h)
            .fill_nonzero()
            .restore_state();
    }

    /// Rounded rectangle, filled and optionally stroked with a 1pt border.
    pub fn rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Rgb,
        stroke: Option<Rgb>,
    ) {
        let py = self.flip_y(y + h);
        self.current.save_state();
        self.current.set_fill_rgb(fill.r, fill.g, fill.b);
        Self::rounded_rect_path(&mut self.current, x, py, w, h, radius);
        self.current.fill_nonzero();
        if let Some(s) = stroke {
            self.current.set_stroke_rgb(s.r, s.g, s.b).set_line_width(1.0);
            Self::rounded_rect_path(&mut self.current, x, py, w, h, radius);
            self.current.stroke();
        }
        self.current.restore_state();
    }

    // Path only, in PDF coordinates with lower-left corner (x, y).
    fn rounded_rect_path(c: &mut Content, x: f32, y: f32, w: f32, h: f32, radius: f32) {
        let r = radius.min(w / 2.0).min(h / 2.0);
        let k = r * CORNER_RATIO;
        c.move_to(x + r, y);
        c.line_to(x + w - r, y);
        c.cubic_to(x + w - r + k, y, x + w, y + r - k, x + w, y + r);
        c.line_to(x + w, y + h - r);
        c.cubic_to(x + w, y + h - r + k, x + w - r + k, y + h, x + w - r, y + h);
        c.line_to(x + r, y + h);
        c.cubic_to(x + r - k, y + h, x, y + h - r + k, x, y + h - r);
        c.line_to(x, y + r);
        c.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
        c.close_path();
    }

    /// Filled pie wedge around `(cx, cy)`. Angles are in the layout space's
    /// clockwise-from-positive-x convention; the flip to PDF space negates
    /// them.
    pub fn wedge(&mut self, cx: f32, cy: f32, r: f32, start: f32, end: f32, fill: Rgb) {
        if (end - start).abs() <= f32::EPSILON {
            return;
        }
        let pcy = self.flip_y(cy);
        let segments = geometry::arc_segments(cx, pcy, r, -start, -end);
        let (sx, sy) = geometry::arc_point(cx, pcy, r, -start);
        let c = &mut self.current;
        c.save_state();
        c.set_fill_rgb(fill.r, fill.g, fill.b);
        c.move_to(cx, pcy);
        c.line_to(sx, sy);
        for s in &segments {
            c.cubic_to(s.x1, s.y1, s.x2, s.y2, s.x, s.y);
        }
        c.close_path();
        c.fill_nonzero();
        c.restore_state();
    }

    /// Place a previously registered image XObject with its top-left corner
    /// at `(x, y)`, scaled to `w` by `h`.
    pub fn image(&mut self, resource: &str, x: f32, y: f32, w: f32, h: f32) {
        let py = self.flip_y(y + h);
        self.current
            .save_state()
            .transform([w, 0.0, 0.0, h, x, py])
            .x_object(Name(resource.as_bytes()))
            .restore_state();
    }

    /// Draw a single line of styled text with its top at `y`.
    ///
    /// With a width constraint, `align` positions the line inside the box
    /// and `ellipsis` truncates overflow; without one the text starts at
    /// `x` unconditionally.
    pub fn text(&mut self, content: &str, x: f32, y: f32, style: &TextStyle) {
        let truncated;
        let s = match (style.width, style.ellipsis) {
            (Some(w), true) => {
                truncated = fonts::truncate_to_width(content, style.font, style.size, w);
                truncated.as_str()
            }
            _ => content,
        };
        if s.is_empty() {
            return;
        }
        let tw = fonts::text_width(s, style.font, style.size)
            + style.char_spacing * s.chars().count() as f32;
        let tx = match (style.width, style.align) {
            (Some(w), Align::Center) => x + (w - tw) / 2.0,
            (Some(w), Align::Right) => x + w - tw,
            _ => x,
        };
        let baseline = self.flip_y(y) - style.size * TEXT_ASCENT;
        let bytes = fonts::encode_winansi(s);

        let c = &mut self.current;
        // Character spacing is part of the graphics state, so isolate it.
        let scoped = style.char_spacing != 0.0;
        if scoped {
            c.save_state();
        }
        c.begin_text();
        c.set_font(Name(style.font.resource_name().as_bytes()), style.size);
        if scoped {
            c.set_char_spacing(style.char_spacing);
        }
        c.set_fill_rgb(style.color.r, style.color.g, style.color.b);
        c.next_line(tx, baseline);
        c.show(Str(&bytes));
        c.end_text();
        if scoped {
            c.restore_state();
        }

        if style.underline {
            let uy = baseline - style.size * 0.12;
            c.save_state()
                .set_stroke_rgb(style.color.r, style.color.g, style.color.b)
                .set_line_width(style.size / 14.0)
                .move_to(tx, uy)
                .line_to(tx + tw, uy)
                .stroke()
                .restore_state();
        }
    }

    /// Finish drawing and hand over the ordered page streams.
    pub fn into_pages(mut self) -> Vec<Content> {
        self.done.push(self.current);
        self.done
    }
}

/// Guard for a pushed graphics state; restores on drop.
pub struct CanvasScope<'a> {
    canvas: &'a mut Canvas,
}

impl CanvasScope<'_> {
    /// Clip all subsequent drawing in this scope to a circle.
    pub fn clip_circle(&mut self, cx: f32, cy: f32, r: f32) {
        let pcy = self.canvas.flip_y(cy);
        let segments = geometry::arc_segments(cx, pcy, r, 0.0, std::f32::consts::TAU);
        let (sx, sy) = geometry::arc_point(cx, pcy, r, 0.0);
        let c = &mut self.canvas.current;
        c.move_to(sx, sy);
        for s in &segments {
            c.cubic_to(s.x1, s.y1, s.x2, s.y2, s.x, s.y);
        }
        c.close_path();
        c.clip_nonzero();
        c.end_path();
    }
}

impl std::ops::Deref for CanvasScope<'_> {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        self.canvas
    }
}

impl std::ops::DerefMut for CanvasScope<'_> {
    fn deref_mut(&mut self) -> &mut Canvas {
        self.canvas
    }
}

impl Drop for CanvasScope<'_> {
    fn drop(&mut self) {
        self.canvas.current.restore_state();
        self.canvas.open_saves -= 1;
    }
}
