//! Software rasterizer for gauge scenes.
//!
//! Draws [`DrawCommand`]s into an RGBA8 frame. Stroke widths are half the
//! drawn thickness: a width-5 arc at radius `r - 5` fills the band from
//! `r - 10` to `r`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::color::Color;
use crate::error::GaugeError;
use crate::geometry::{Point, Rect};
use crate::resources::ImageSource;
use crate::scene::DrawCommand;

// ============================================================================
// CANVAS
// ============================================================================

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    /// Blends `color` over the pixel at `(x, y)` with coverage `alpha`.
    fn blend(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = (alpha * color.alpha()).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let Some(dst) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        let src = [color.r, color.g, color.b];
        for (d, s) in dst.iter_mut().zip(src) {
            *d = (f32::from(s) * a + f32::from(*d) * (1.0 - a)).round() as u8;
        }
        dst[3] = 0xff;
    }

    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let px = self.frame.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

// ============================================================================
// TRANSFORMS
// ============================================================================

/// Composition of rotations: `p -> R(angle) p + t`, with counter-clockwise
/// angles as seen on a y-down screen.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    angle: f64,
    cos: f64,
    sin: f64,
    tx: f64,
    ty: f64,
}

impl Transform {
    const IDENTITY: Transform = Transform {
        angle: 0.0,
        cos: 1.0,
        sin: 0.0,
        tx: 0.0,
        ty: 0.0,
    };

    fn rotate(angle: f64, p: Point) -> Point {
        let (sin, cos) = angle.to_radians().sin_cos();
        Point::new(cos * p.x + sin * p.y, -sin * p.x + cos * p.y)
    }

    fn apply(&self, p: Point) -> Point {
        Point::new(
            self.cos * p.x + self.sin * p.y + self.tx,
            -self.sin * p.x + self.cos * p.y + self.ty,
        )
    }

    fn invert(&self, p: Point) -> Point {
        let (x, y) = (p.x - self.tx, p.y - self.ty);
        Point::new(self.cos * x - self.sin * y, self.sin * x + self.cos * y)
    }

    /// Rotation by `angle` about `origin`, applied before this transform.
    fn then_rotate(&self, origin: Point, angle: f64) -> Transform {
        let total = self.angle + angle;
        let moved = self.apply(origin);
        let spun = Self::rotate(total, origin);
        let (sin, cos) = total.to_radians().sin_cos();
        Transform {
            angle: total,
            cos,
            sin,
            tx: moved.x - spun.x,
            ty: moved.y - spun.y,
        }
    }

    fn is_identity(&self) -> bool {
        self.angle == 0.0
    }
}

// ============================================================================
// RASTERIZER
// ============================================================================

struct Texture {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl Texture {
    fn texel(&self, u: f64, v: f64) -> Option<Color> {
        let x = (u * self.width as f64).floor();
        let y = (v * self.height as f64).floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f64 || y >= self.height as f64 {
            return None;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let px = self.rgba.get(idx..idx + 4)?;
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }
}

/// Turns scenes into pixels. Holds the font and the decoded textures.
pub struct Rasterizer {
    font: Option<Font<'static>>,
    textures: HashMap<PathBuf, Option<Texture>>,
    background: Color,
}

impl Rasterizer {
    /// Without a font, text commands are skipped.
    pub fn new(font: Option<Font<'static>>) -> Self {
        if font.is_none() {
            log::warn!("no font loaded; tick values and labels will not be drawn");
        }
        Self {
            font,
            textures: HashMap::new(),
            background: Color::BLACK,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Clears the canvas and draws `commands` in order. The current color
    /// starts out white.
    pub fn render<'c>(
        &mut self,
        canvas: &mut Canvas,
        commands: impl IntoIterator<Item = &'c DrawCommand>,
    ) {
        canvas.clear(self.background);
        let mut color = Color::WHITE;
        let mut stack: Vec<Transform> = Vec::new();
        let mut transform = Transform::IDENTITY;

        for command in commands {
            match command {
                DrawCommand::Color(c) => color = *c,
                DrawCommand::PushRotation { origin, angle } => {
                    stack.push(transform);
                    transform = transform.then_rotate(*origin, *angle);
                }
                DrawCommand::PopTransform => {
                    transform = stack.pop().unwrap_or(Transform::IDENTITY);
                }
                DrawCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                    width,
                } => {
                    let (lo, span) = arc_range(*start_angle, *end_angle, transform.angle);
                    draw_ring(
                        canvas,
                        transform.apply(*center),
                        *radius - *width,
                        *radius + *width,
                        Some((lo, span)),
                        color,
                    );
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    width,
                } => {
                    draw_ring(
                        canvas,
                        transform.apply(*center),
                        *radius - *width,
                        *radius + *width,
                        None,
                        color,
                    );
                }
                DrawCommand::Pie {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    let (lo, span) = arc_range(*start_angle, *end_angle, transform.angle);
                    draw_ring(
                        canvas,
                        transform.apply(*center),
                        f64::NEG_INFINITY,
                        *radius,
                        Some((lo, span)),
                        color,
                    );
                }
                DrawCommand::Line { points, width } => {
                    for pair in points.windows(2) {
                        draw_thick_line_aa(
                            canvas,
                            transform.apply(pair[0]),
                            transform.apply(pair[1]),
                            2.0 * *width,
                            color,
                        );
                    }
                }
                DrawCommand::Text {
                    rect,
                    text,
                    font_size,
                    ..
                } => {
                    if let Some(font) = &self.font {
                        let scale = Scale::uniform(*font_size as f32);
                        draw_text(canvas, transform.apply(rect.center()), text, font, scale, color);
                    }
                }
                DrawCommand::Image { rect, source } => {
                    if let Some(texture) = self.texture(source) {
                        draw_texture(canvas, texture, *rect, &transform, color);
                    }
                }
            }
        }
    }

    /// Decodes `source` once. Failures are logged once and remembered.
    fn texture(&mut self, source: &ImageSource) -> Option<&Texture> {
        self.textures
            .entry(source.path.clone())
            .or_insert_with(|| match load_source(source) {
                Ok(texture) => Some(texture),
                Err(err) => {
                    log::warn!("cannot decode {}: {err}", source.path.display());
                    None
                }
            })
            .as_ref()
    }
}

/// Lowest dial angle and span of an arc, after rotating the scene by
/// `rotation` degrees counter-clockwise.
fn arc_range(start: f64, end: f64, rotation: f64) -> (f64, f64) {
    (start.min(end) - rotation, (end - start).abs())
}

/// Dial angle of `(dx, dy)` on a y-down screen: clockwise degrees from 12.
fn dial_angle_of(dx: f64, dy: f64) -> f64 {
    dx.atan2(-dy).to_degrees()
}

fn in_arc(angle: f64, range: Option<(f64, f64)>) -> bool {
    match range {
        None => true,
        Some((_, span)) if span >= 360.0 => true,
        Some((lo, span)) => (angle - lo).rem_euclid(360.0) <= span,
    }
}

/// Fills the annulus `inner..outer` around `center`, optionally restricted
/// to an arc. Radial edges are antialiased.
fn draw_ring(
    canvas: &mut Canvas,
    center: Point,
    inner: f64,
    outer: f64,
    range: Option<(f64, f64)>,
    color: Color,
) {
    if outer <= 0.0 {
        return;
    }
    let reach = outer + 1.0;
    let min_x = (center.x - reach).floor().max(0.0) as i32;
    let max_x = (center.x + reach).ceil().min(canvas.width as f64) as i32;
    let min_y = (center.y - reach).floor().max(0.0) as i32;
    let max_y = (center.y + reach).ceil().min(canvas.height as f64) as i32;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            let dist = (dx * dx + dy * dy).sqrt();
            let aa = if dist > outer {
                1.0 - (dist - outer).min(1.0)
            } else if dist < inner {
                1.0 - (inner - dist).min(1.0)
            } else {
                1.0
            };
            if aa <= 0.0 || !in_arc(dial_angle_of(dx, dy), range) {
                continue;
            }
            canvas.blend(x, y, color, aa as f32);
        }
    }
}

fn draw_thick_line_aa(canvas: &mut Canvas, p0: Point, p1: Point, thickness: f64, color: Color) {
    let pad = thickness.ceil() + 1.0;
    let min_x = (p0.x.min(p1.x) - pad).floor() as i32;
    let max_x = (p0.x.max(p1.x) + pad).ceil() as i32;
    let min_y = (p0.y.min(p1.y) - pad).floor() as i32;
    let max_y = (p0.y.max(p1.y) + pad).ceil() as i32;
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let len_sq = dx * dx + dy * dy;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f64 + 0.5 - p0.x;
            let py = y as f64 + 0.5 - p0.y;
            let t = if len_sq > 0.0 {
                ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let dist = ((t * dx - px).powi(2) + (t * dy - py).powi(2)).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                canvas.blend(x, y, color, aa as f32);
            }
        }
    }
}

/// Draws `text` with its ink box centred on `center`.
fn draw_text(
    canvas: &mut Canvas,
    center: Point,
    text: &str,
    font: &Font<'static>,
    scale: Scale,
    color: Color,
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();

    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    if min_x > max_x {
        return;
    }
    let offset_x = center.x.round() as i32 - (max_x - min_x) / 2;
    let offset_y = center.y.round() as i32 - (max_y - min_y) / 2;
    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                canvas.blend(px, py, color, v);
            });
        }
    }
}

/// Stretches `texture` over `rect`, rotated by `transform`, tinted by
/// `tint`. Nearest-texel sampling.
fn draw_texture(
    canvas: &mut Canvas,
    texture: &Texture,
    rect: Rect,
    transform: &Transform,
    tint: Color,
) {
    if rect.size.width <= 0.0 || rect.size.height <= 0.0 {
        return;
    }
    let corners = [
        rect.origin,
        Point::new(rect.origin.x + rect.size.width, rect.origin.y),
        Point::new(rect.origin.x, rect.origin.y + rect.size.height),
        Point::new(
            rect.origin.x + rect.size.width,
            rect.origin.y + rect.size.height,
        ),
    ]
    .map(|p| transform.apply(p));
    let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    let x0 = min_x.floor().max(0.0) as i32;
    let x1 = max_x.ceil().min(canvas.width as f64) as i32;
    let y0 = min_y.floor().max(0.0) as i32;
    let y1 = max_y.ceil().min(canvas.height as f64) as i32;
    for y in y0..y1 {
        for x in x0..x1 {
            let screen = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let local = if transform.is_identity() {
                screen
            } else {
                transform.invert(screen)
            };
            let u = (local.x - rect.origin.x) / rect.size.width;
            let v = (local.y - rect.origin.y) / rect.size.height;
            if let Some(texel) = texture.texel(u, v) {
                canvas.blend(x, y, texel.modulate(tint), 1.0);
            }
        }
    }
}

// ============================================================================
// PNG
// ============================================================================

fn load_source(source: &ImageSource) -> Result<Texture, GaugeError> {
    match source.bytes {
        Some(bytes) => decode_texture(bytes, &source.path),
        None => load_texture(&source.path),
    }
}

fn load_texture(path: &Path) -> Result<Texture, GaugeError> {
    decode_texture(BufReader::new(File::open(path)?), path)
}

fn decode_texture(reader: impl Read, path: &Path) -> Result<Texture, GaugeError> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let pixels = &buf[..info.buffer_size()];
    let rgba = match info.color_type {
        png::ColorType::Rgba => pixels.to_vec(),
        png::ColorType::Rgb => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 0xff])
            .collect(),
        png::ColorType::GrayscaleAlpha => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => pixels.iter().flat_map(|&g| [g, g, g, 0xff]).collect(),
        png::ColorType::Indexed => {
            return Err(GaugeError::UnsupportedImage(path.display().to_string()))
        }
    };
    Ok(Texture {
        width: info.width as usize,
        height: info.height as usize,
        rgba,
    })
}

/// Writes an RGBA8 frame as a PNG file.
pub fn save_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<(), GaugeError> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    Ok(())
}

/// Renders `commands` into a fresh `width` x `height` RGBA8 buffer.
pub fn render_to_buffer<'c>(
    rasterizer: &mut Rasterizer,
    width: usize,
    height: usize,
    commands: impl IntoIterator<Item = &'c DrawCommand>,
) -> Vec<u8> {
    let mut frame = vec![0; width * height * 4];
    let mut canvas = Canvas::new(&mut frame, width, height);
    rasterizer.render(&mut canvas, commands);
    frame
}
