//! The six draw layers of a gauge. Each is a pure function of the
//! configuration and the geometry cache.

use crate::config::{GaugeConfig, MAX_SUBTICKS};
use crate::geometry::{Geometry, Rect, Size};
use crate::resources::ImageSource;
use crate::scene::{DrawCommand, Scene};
use crate::text::{TextMeasure, TickFormatter};

pub const SHADOW_WIDTH: f64 = 5.0;
pub const CADRAN_WIDTH: f64 = 1.5;
pub const MAJOR_TICK_WIDTH: f64 = 2.0;
pub const MINOR_TICK_WIDTH: f64 = 0.75;
/// Tick marks run from the rim inwards by this much.
pub const TICK_LENGTH: f64 = 10.0;
/// Tick labels are centred this far inside the rim.
pub const VALUE_INSET: f64 = 20.0;

// ============================================================================
// BACKGROUND
// ============================================================================

/// Colored bands: arcs of `sector_width` inside the rim, or pie wedges when
/// the width is zero.
pub fn sectors(config: &GaugeConfig, geometry: &Geometry) -> Scene {
    let mut scene = Scene::new();
    let width = config.sector_width;
    for band in config.sector_bands() {
        let start_angle = geometry.dial_angle(band.from);
        let end_angle = geometry.dial_angle(band.to);
        scene.add_command(DrawCommand::Color(band.color));
        if width > 0.0 {
            scene.add_command(DrawCommand::Arc {
                center: geometry.center,
                radius: geometry.radius - width,
                start_angle,
                end_angle,
                width,
            });
        } else {
            scene.add_command(DrawCommand::Pie {
                center: geometry.center,
                radius: geometry.radius,
                start_angle,
                end_angle,
            });
        }
    }
    scene
}

/// Arc trailing the needle from `min` to the current value.
pub fn shadow(config: &GaugeConfig, geometry: &Geometry) -> Scene {
    let mut scene = Scene::new();
    let Some(color) = config.shadow_color else {
        return scene;
    };
    scene.add_command(DrawCommand::Color(color));
    scene.add_command(DrawCommand::Arc {
        center: geometry.center,
        radius: geometry.radius - SHADOW_WIDTH,
        start_angle: geometry.dial_angle(config.min),
        end_angle: shadow_end(config, geometry),
        width: SHADOW_WIDTH,
    });
    scene
}

pub fn shadow_end(config: &GaugeConfig, geometry: &Geometry) -> f64 {
    geometry.dial_angle(config.value)
}

// ============================================================================
// FULL CADRAN
// ============================================================================

/// Rim of the dial: a full circle, or the arc between the two endpoints
/// closed by two radii.
pub fn outer_cadran(config: &GaugeConfig, geometry: &Geometry) -> Scene {
    let mut scene = Scene::new();
    let Some(color) = config.cadran_color else {
        return scene;
    };
    let (center, r) = (geometry.center, geometry.radius);
    let (start, end) = (config.start_angle, config.end_angle);
    scene.add_command(DrawCommand::Color(color));
    if start == end {
        scene.add_command(DrawCommand::Circle {
            center,
            radius: r,
            width: CADRAN_WIDTH,
        });
    } else {
        scene.add_command(DrawCommand::Line {
            points: vec![center.polar(r, start), center, center.polar(r, end)],
            width: CADRAN_WIDTH,
        });
        scene.add_command(DrawCommand::Arc {
            center,
            radius: r,
            start_angle: start,
            end_angle: end,
            width: CADRAN_WIDTH,
        });
    }
    scene
}

/// Major ticks with their labels, and minor ticks between them. Ticks are
/// spread evenly over the whole span; nothing is drawn when the spacing
/// leaves fewer than two ticks.
pub fn values(
    config: &GaugeConfig,
    geometry: &Geometry,
    formatter: &dyn TickFormatter,
    measure: &dyn TextMeasure,
) -> Scene {
    let mut scene = Scene::new();
    let Some(color) = config.cadran_color else {
        return scene;
    };
    let ticks = config.tick_values();
    if ticks.len() < 2 {
        return scene;
    }
    scene.add_command(DrawCommand::Color(color));

    let (center, r) = (geometry.center, geometry.radius);
    let delta = Geometry::span(config) / (ticks.len() - 1) as f64;
    let subtick = config.subtick.min(MAX_SUBTICKS);
    let sub_delta = delta / (f64::from(subtick) + 1.0);
    let last_index = ticks.len() - 1;

    for (i, value) in ticks.iter().enumerate() {
        let angle = config.start_angle + i as f64 * delta;
        let first = i == 0;
        let last = i == last_index;
        if (!first && !last) || (first && config.display_first) || (last && config.display_last) {
            scene.add_command(DrawCommand::Line {
                points: vec![
                    center.polar(r - 1.0, angle),
                    center.polar(r - TICK_LENGTH, angle),
                ],
                width: MAJOR_TICK_WIDTH,
            });
            let text = formatter.format_tick(*value);
            let size = measure.measure(&text, config.value_font_size, true);
            scene.add_command(DrawCommand::Text {
                rect: Rect::centered(center.polar(r - VALUE_INSET, angle), size),
                text,
                font_size: config.value_font_size,
                bold: true,
            });
        }
        if last {
            continue;
        }
        for n in 1..=subtick {
            let sub_angle = angle + f64::from(n) * sub_delta;
            scene.add_command(DrawCommand::Line {
                points: vec![
                    center.polar(r, sub_angle),
                    center.polar(r - TICK_LENGTH, sub_angle),
                ],
                width: MINOR_TICK_WIDTH,
            });
        }
    }
    scene
}

// ============================================================================
// LABEL
// ============================================================================

/// Text or icon placed at `label_radius_ratio` of the radius, at
/// `label_angle_ratio` of the way from the start angle to the end angle.
/// The icon wins over the text. No color is set: the label is drawn in the
/// color left by the layers before it.
pub fn label(
    config: &GaugeConfig,
    geometry: &Geometry,
    measure: &dyn TextMeasure,
    icon: Option<&ImageSource>,
) -> Scene {
    let mut scene = Scene::new();
    let angle =
        config.start_angle + config.label_angle_ratio * (config.end_angle - config.start_angle);
    let anchor = geometry
        .center
        .polar(geometry.radius * config.label_radius_ratio, angle);

    if let Some(icon) = icon {
        let longest = icon.size.width.max(icon.size.height);
        if longest <= 0.0 {
            return scene;
        }
        let scale = geometry.radius * config.label_icon_scale / longest;
        let size = Size::new(icon.size.width * scale, icon.size.height * scale);
        scene.add_command(DrawCommand::Image {
            rect: Rect::centered(anchor, size),
            source: icon.clone(),
        });
    } else if !config.label.is_empty() {
        let size = measure.measure(&config.label, config.label_font_size, true);
        scene.add_command(DrawCommand::Text {
            rect: Rect::centered(anchor, size),
            text: config.label.clone(),
            font_size: config.label_font_size,
            bold: true,
        });
    }
    scene
}

// ============================================================================
// NEEDLE
// ============================================================================

/// Square needle image over the whole dial, inside a rotation node at
/// `value_to_angle(value)`. The rotation node is updated in place on value
/// changes.
pub fn needle(config: &GaugeConfig, geometry: &Geometry, image: &ImageSource) -> Scene {
    let mut scene = Scene::new();
    let Some(color) = config.needle_color else {
        return scene;
    };
    let r = geometry.radius;
    scene.add_command(DrawCommand::PushRotation {
        origin: geometry.center,
        angle: geometry.value_to_angle(config.value),
    });
    scene.add_command(DrawCommand::Color(color));
    scene.add_command(DrawCommand::Image {
        rect: Rect::centered(geometry.center, Size::new(2.0 * r, 2.0 * r)),
        source: image.clone(),
    });
    scene.add_command(DrawCommand::PopTransform);
    scene
}
