use bon::Builder;

use crate::color::Color;
use crate::error::GaugeError;
use crate::geometry::Rect;

/// A color that may be absent, meaning "not drawn".
pub type Paint = Option<Color>;

/// Bundled needle image, used when no other match is found.
pub const DEFAULT_NEEDLE_IMAGE: &str = "needle.png";

pub const DEFAULT_TICK: f64 = 10.0;

/// Most major ticks a dial draws. Finer spacings draw no ticks at all.
pub const MAX_TICKS: usize = 2000;

/// Most minor ticks between two major ticks.
pub const MAX_SUBTICKS: u32 = 100;

/// Widest dial span, in degrees.
pub const MAX_SPAN: f64 = 360.0;

/// One entry of a sector list. Lists read as
/// `[start?, color, upper, color, upper, ..., color, upper?]`: a leading
/// value sets the lower bound of the first sector (otherwise `min`), and a
/// trailing color without an upper bound extends to `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectorToken {
    Value(f64),
    Color(Color),
}

impl From<f64> for SectorToken {
    fn from(value: f64) -> Self {
        SectorToken::Value(value)
    }
}

impl From<Color> for SectorToken {
    fn from(color: Color) -> Self {
        SectorToken::Color(color)
    }
}

/// A colored band of the dial between two values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub color: Color,
    pub from: f64,
    pub to: f64,
}

/// Which endpoint of the dial span was just written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

#[derive(Debug, Clone, Builder)]
pub struct GaugeConfig {
    /// Widget bounding box in screen space (y-down).
    #[builder(default = Rect::new(0.0, 0.0, 100.0, 100.0))]
    pub bounds: Rect,

    // Range
    #[builder(default = 0.0)]
    pub min: f64,
    #[builder(default = 100.0)]
    pub max: f64,
    #[builder(default = 0.0)]
    pub value: f64,

    // Dial span, clockwise degrees from 12 o'clock
    #[builder(default = -90.0)]
    pub start_angle: f64,
    #[builder(default = 135.0)]
    pub end_angle: f64,

    // Ticks
    #[builder(default = DEFAULT_TICK)]
    pub tick: f64,
    #[builder(default = 0)]
    pub subtick: u32,
    #[builder(default = true)]
    pub display_first: bool,
    #[builder(default = true)]
    pub display_last: bool,
    #[builder(default = 15.0)]
    pub value_font_size: f64,

    // Sectors
    #[builder(default)]
    pub sectors: Vec<SectorToken>,
    #[builder(default = 0.0)]
    pub sector_width: f64,

    // Colors
    #[builder(default = Some(Color::WHITE))]
    pub cadran_color: Paint,
    #[builder(default = None)]
    pub shadow_color: Paint,
    #[builder(default = Some(Color::new(0x6b, 0xf2, 0xff)))]
    pub needle_color: Paint,

    // Images, by name
    #[builder(into, default = DEFAULT_NEEDLE_IMAGE.to_string())]
    pub needle_image: String,
    #[builder(into, default)]
    pub label_icon: String,

    // Center label
    #[builder(into, default)]
    pub label: String,
    #[builder(default = 0.5)]
    pub label_icon_scale: f64,
    #[builder(default = 15.0)]
    pub label_font_size: f64,
    #[builder(default = 0.3)]
    pub label_radius_ratio: f64,
    #[builder(default = 0.5)]
    pub label_angle_ratio: f64,

    #[builder(default = 1.5)]
    pub thickness: f64,

    /// Report out-of-range pointer angles instead of rejecting them.
    #[builder(default = false)]
    pub extended_touch: bool,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GaugeConfig {
    /// Applies every field constraint. The dial span is restored by moving
    /// the start angle, as if the end angle had just been written.
    pub fn normalized(mut self) -> Self {
        self.start_angle = clamp_angle(self.start_angle);
        self.end_angle = clamp_angle(self.end_angle);
        self.restore_span(Endpoint::End);
        if !(self.tick > 0.0) {
            self.tick = DEFAULT_TICK;
        }
        self.subtick = self.subtick.min(MAX_SUBTICKS);
        self.value_font_size = self.value_font_size.max(1.0);
        self.label_font_size = self.label_font_size.max(1.0);
        self.label_icon_scale = self.label_icon_scale.clamp(0.0, 1.0);
        self.label_radius_ratio = self.label_radius_ratio.clamp(-1.0, 1.0);
        self.label_angle_ratio = self.label_angle_ratio.clamp(0.0, 1.0);
        self.sector_width = self.sector_width.max(0.0);
        self.thickness = self.thickness.max(0.0);
        self.value = self.clamp_value(self.value);
        self
    }

    /// Clamps into `[min, max]`. Never panics, even when a caller has
    /// broken `min < max`.
    pub fn clamp_value(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Keeps `|end - start| <= 360` by shifting the endpoint that was not
    /// just written.
    pub fn restore_span(&mut self, written: Endpoint) {
        match written {
            Endpoint::Start => {
                if self.end_angle - self.start_angle > MAX_SPAN {
                    self.end_angle = self.start_angle + MAX_SPAN;
                } else if self.start_angle - self.end_angle > MAX_SPAN {
                    self.end_angle = self.start_angle - MAX_SPAN;
                }
            }
            Endpoint::End => {
                if self.end_angle - self.start_angle > MAX_SPAN {
                    self.start_angle = self.end_angle - MAX_SPAN;
                } else if self.start_angle - self.end_angle > MAX_SPAN {
                    self.start_angle = self.end_angle + MAX_SPAN;
                }
            }
        }
    }

    /// Major tick values from `min` to `max` stepping by `tick`. Empty when
    /// the spacing would give more than [`MAX_TICKS`] ticks.
    pub fn tick_values(&self) -> Vec<f64> {
        let steps = ((self.max - self.min) / self.tick + 1e-9).floor();
        if !steps.is_finite() || steps < 0.0 {
            return Vec::new();
        }
        if steps >= MAX_TICKS as f64 {
            log::warn!(
                "tick {} over [{}, {}] exceeds {MAX_TICKS} ticks; drawing none",
                self.tick,
                self.min,
                self.max
            );
            return Vec::new();
        }
        (0..=steps as usize)
            .map(|i| self.min + i as f64 * self.tick)
            .collect()
    }

    /// Resolves the sector tokens into bands. Permissive: malformed lists
    /// still produce whatever bands they describe, possibly zero-width.
    pub fn sector_bands(&self) -> Vec<Sector> {
        let mut tokens = self.sectors.iter().peekable();
        let mut lower = match tokens.peek() {
            Some(SectorToken::Value(v)) => {
                let v = *v;
                tokens.next();
                v
            }
            _ => self.min,
        };
        let mut pending: Option<Color> = None;
        let mut bands = Vec::new();
        for token in tokens {
            match *token {
                SectorToken::Color(color) => {
                    if let Some(previous) = pending.replace(color) {
                        bands.push(Sector {
                            color: previous,
                            from: lower,
                            to: lower,
                        });
                    }
                }
                SectorToken::Value(upper) => {
                    if let Some(color) = pending.take() {
                        bands.push(Sector {
                            color,
                            from: lower,
                            to: upper,
                        });
                    }
                    lower = upper;
                }
            }
        }
        if let Some(color) = pending {
            bands.push(Sector {
                color,
                from: lower,
                to: self.max,
            });
        }
        bands
    }
}

fn clamp_angle(angle: f64) -> f64 {
    angle.clamp(-MAX_SPAN, MAX_SPAN)
}

/// Strict check of a sector list: alternating colors and bounds, bounds
/// increasing. Lists accepted here render identically through
/// [`GaugeConfig::sector_bands`].
pub fn validate_sectors(tokens: &[SectorToken]) -> Result<(), GaugeError> {
    let body = match tokens.first() {
        Some(SectorToken::Value(_)) => &tokens[1..],
        _ => tokens,
    };
    let mut last_bound = match tokens.first() {
        Some(SectorToken::Value(v)) => Some(*v),
        _ => None,
    };
    for (i, token) in body.iter().enumerate() {
        match (i % 2, token) {
            (0, SectorToken::Color(_)) => {}
            (0, SectorToken::Value(v)) => {
                return Err(GaugeError::InvalidSectors(format!(
                    "expected a color before bound {v}"
                )));
            }
            (_, SectorToken::Color(c)) => {
                return Err(GaugeError::InvalidSectors(format!(
                    "color {} follows another color without a bound",
                    c.to_hex()
                )));
            }
            (_, SectorToken::Value(v)) => {
                if !v.is_finite() {
                    return Err(GaugeError::InvalidSectors(format!("bound {v} is not finite")));
                }
                if let Some(previous) = last_bound {
                    if *v <= previous {
                        return Err(GaugeError::InvalidSectors(format!(
                            "bound {v} does not increase past {previous}"
                        )));
                    }
                }
                last_bound = Some(*v);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(0xff, 0, 0);
    const GREEN: Color = Color::new(0, 0xff, 0);

    #[test]
    fn builder_defaults_match_the_widget() {
        let config = GaugeConfig::default();
        assert_eq!((config.min, config.max), (0.0, 100.0));
        assert_eq!((config.start_angle, config.end_angle), (-90.0, 135.0));
        assert_eq!(config.tick, 10.0);
        assert_eq!(config.subtick, 0);
        assert_eq!(config.cadran_color, Some(Color::WHITE));
        assert_eq!(config.needle_color, Some(Color::new(0x6b, 0xf2, 0xff)));
        assert_eq!(config.shadow_color, None);
        assert_eq!(config.needle_image, "needle.png");
        assert!(config.label.is_empty() && config.label_icon.is_empty());
        assert!(!config.extended_touch);
    }

    #[test]
    fn normalized_clamps_fields() {
        let config = GaugeConfig::builder()
            .value(250.0)
            .start_angle(-500.0)
            .end_angle(400.0)
            .label_radius_ratio(3.0)
            .label_angle_ratio(-1.0)
            .value_font_size(0.0)
            .tick(-5.0)
            .build()
            .normalized();
        assert_eq!(config.value, 100.0);
        assert_eq!(config.end_angle, 360.0);
        assert_eq!(config.start_angle, 0.0);
        assert_eq!(config.label_radius_ratio, 1.0);
        assert_eq!(config.label_angle_ratio, 0.0);
        assert_eq!(config.value_font_size, 1.0);
        assert_eq!(config.tick, DEFAULT_TICK);
    }

    #[test]
    fn span_restored_by_moving_the_other_endpoint() {
        let mut config = GaugeConfig::default();
        config.start_angle = -300.0;
        config.restore_span(Endpoint::Start);
        assert_eq!((config.start_angle, config.end_angle), (-300.0, 60.0));

        let mut config = GaugeConfig::default();
        config.end_angle = 300.0;
        config.restore_span(Endpoint::End);
        assert_eq!((config.start_angle, config.end_angle), (-60.0, 300.0));
    }

    #[test]
    fn clamp_is_idempotent_and_never_panics() {
        let config = GaugeConfig::default();
        assert_eq!(config.clamp_value(-3.0), 0.0);
        assert_eq!(config.clamp_value(config.clamp_value(300.0)), 100.0);
        let inverted = GaugeConfig::builder().min(10.0).max(0.0).build();
        let _ = inverted.clamp_value(5.0);
    }

    #[test]
    fn tick_values_include_both_ends() {
        let config = GaugeConfig::default();
        let ticks = config.tick_values();
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[10], 100.0);
        let coarse = GaugeConfig::builder().tick(200.0).build();
        assert_eq!(coarse.tick_values(), vec![0.0]);
        let fractional = GaugeConfig::builder().max(1.0).tick(0.1).build();
        assert_eq!(fractional.tick_values().len(), 11);
    }

    #[test]
    fn tiny_tick_spacing_gives_no_ticks() {
        let config = GaugeConfig::builder().tick(1e-15).build().normalized();
        assert_eq!(config.tick, 1e-15);
        assert!(config.tick_values().is_empty());

        let limit = GaugeConfig::builder()
            .max((MAX_TICKS - 1) as f64)
            .tick(1.0)
            .build();
        assert_eq!(limit.tick_values().len(), MAX_TICKS);
        let over = GaugeConfig::builder().max(MAX_TICKS as f64).tick(1.0).build();
        assert!(over.tick_values().is_empty());
    }

    #[test]
    fn subticks_are_capped() {
        let config = GaugeConfig::builder().subtick(u32::MAX).build().normalized();
        assert_eq!(config.subtick, MAX_SUBTICKS);
    }

    #[test]
    fn sector_bands_follow_token_order() {
        let config = GaugeConfig::builder()
            .sectors(vec![
                SectorToken::Value(0.0),
                RED.into(),
                40.0.into(),
                GREEN.into(),
            ])
            .build();
        assert_eq!(
            config.sector_bands(),
            vec![
                Sector { color: RED, from: 0.0, to: 40.0 },
                Sector { color: GREEN, from: 40.0, to: 100.0 },
            ]
        );
    }

    #[test]
    fn sector_bands_tolerate_malformed_lists() {
        let config = GaugeConfig::builder()
            .min(10.0)
            .sectors(vec![RED.into(), GREEN.into(), 30.0.into(), 20.0.into()])
            .build();
        assert_eq!(
            config.sector_bands(),
            vec![
                Sector { color: RED, from: 10.0, to: 10.0 },
                Sector { color: GREEN, from: 10.0, to: 30.0 },
            ]
        );
        assert!(GaugeConfig::default().sector_bands().is_empty());
    }

    #[test]
    fn validate_sectors_rejects_bad_shapes() {
        use SectorToken::{Color as C, Value as V};
        assert!(validate_sectors(&[]).is_ok());
        assert!(validate_sectors(&[V(0.0), C(RED), V(50.0), C(GREEN)]).is_ok());
        assert!(validate_sectors(&[C(RED), V(50.0)]).is_ok());
        assert!(validate_sectors(&[C(RED), C(GREEN)]).is_err());
        assert!(validate_sectors(&[V(0.0), V(10.0)]).is_err());
        assert!(matches!(
            validate_sectors(&[C(RED), V(50.0), C(GREEN), V(20.0)]),
            Err(GaugeError::InvalidSectors(_))
        ));
    }
}
