use std::fmt;

use crate::color::Color;
use crate::config::{
    validate_sectors, Endpoint, GaugeConfig, Paint, SectorToken, DEFAULT_NEEDLE_IMAGE,
    DEFAULT_TICK, MAX_SPAN, MAX_SUBTICKS,
};
use crate::error::GaugeError;
use crate::geometry::{Geometry, Point, Rect, Size};
use crate::layers;
use crate::resources::{ImageDirectory, ImageSource, ResourceResolver};
use crate::router::{self, Layer, Property, RedrawStats};
use crate::scene::{DrawCommand, Scene};
use crate::text::{ApproxMetrics, IntegerTicks, TextMeasure, TickFormatter};

// ============================================================================
// COMMANDS
// ============================================================================

/// Command enum for gauge updates sent from another thread
#[derive(Debug, Clone, PartialEq)]
pub enum GaugeCommand {
    SetValue(f64),
    SetRange(f64, f64),
    SetMin(f64),
    SetMax(f64),
    SetStartAngle(f64),
    SetEndAngle(f64),
    SetTick(f64),
    SetSubtick(u32),
    SetDisplayFirst(bool),
    SetDisplayLast(bool),
    SetValueFontSize(f64),
    SetCadranColor(Paint),
    SetShadowColor(Paint),
    SetNeedleColor(Paint),
    SetNeedleImage(String),
    SetSectors(Vec<SectorToken>),
    SetSectorWidth(f64),
    SetLabel(String),
    SetLabelIcon(String),
    SetLabelIconScale(f64),
    SetLabelFontSize(f64),
    SetLabelRadiusRatio(f64),
    SetLabelAngleRatio(f64),
    SetThickness(f64),
    SetBounds(Rect),
    SetExtendedTouch(bool),
}

// ============================================================================
// SPEED METER
// ============================================================================

/// A circular gauge: its configuration, the derived geometry and one
/// retained scene per draw layer.
///
/// Every setter normalizes its input, then rebuilds exactly the layers the
/// property feeds (see [`router::invalidation`]). Value writes only move the
/// needle rotation and the shadow end.
pub struct SpeedMeter {
    config: GaugeConfig,
    geometry: Geometry,

    sectors: Scene,
    shadow: Scene,
    outer_cadran: Scene,
    values: Scene,
    label: Scene,
    needle: Scene,

    formatter: Box<dyn TickFormatter>,
    measure: Box<dyn TextMeasure>,
    resources: Box<dyn ResourceResolver>,
    needle_source: ImageSource,
    icon_source: Option<ImageSource>,

    stats: RedrawStats,
}

impl fmt::Debug for SpeedMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeedMeter")
            .field("config", &self.config)
            .field("geometry", &self.geometry)
            .field("needle_source", &self.needle_source)
            .field("icon_source", &self.icon_source)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl SpeedMeter {
    /// Integer tick labels, approximate text metrics and the bundled image
    /// directory.
    pub fn new(config: GaugeConfig) -> Result<Self, GaugeError> {
        Self::with_parts(
            config,
            Box::new(IntegerTicks),
            Box::new(ApproxMetrics::default()),
            Box::new(ImageDirectory::bundled()),
        )
    }

    /// Builds a gauge from explicit capabilities. Redraw counters start at
    /// zero once every layer has been built.
    pub fn with_parts(
        config: GaugeConfig,
        formatter: Box<dyn TickFormatter>,
        measure: Box<dyn TextMeasure>,
        resources: Box<dyn ResourceResolver>,
    ) -> Result<Self, GaugeError> {
        let config = config.normalized();
        if let Err(err) = validate_sectors(&config.sectors) {
            log::warn!("{err}; drawing the sectors anyway");
        }
        let needle_source = resources.resolve(&config.needle_image, Some(DEFAULT_NEEDLE_IMAGE))?;
        let icon_source = resolve_icon(resources.as_ref(), &config.label_icon)?;
        let geometry = Geometry::compute(&config);

        let mut meter = Self {
            config,
            geometry,
            sectors: Scene::new(),
            shadow: Scene::new(),
            outer_cadran: Scene::new(),
            values: Scene::new(),
            label: Scene::new(),
            needle: Scene::new(),
            formatter,
            measure,
            resources,
            needle_source,
            icon_source,
            stats: RedrawStats::default(),
        };
        for layer in Layer::ORDER {
            meter.redraw(layer);
        }
        meter.stats = RedrawStats::default();
        Ok(meter)
    }

    /// Replaces the tick label formatter.
    pub fn with_formatter(mut self, formatter: impl TickFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self.redraw(Layer::FullCadran);
        self
    }

    pub fn with_text_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self.redraw(Layer::FullCadran);
        self.redraw(Layer::Label);
        self
    }

    /// Replaces the image resolver and resolves the needle and icon again.
    pub fn with_resources(
        mut self,
        resources: impl ResourceResolver + 'static,
    ) -> Result<Self, GaugeError> {
        self.needle_source =
            resources.resolve(&self.config.needle_image, Some(DEFAULT_NEEDLE_IMAGE))?;
        self.icon_source = resolve_icon(&resources, &self.config.label_icon)?;
        self.resources = Box::new(resources);
        self.redraw(Layer::Label);
        self.redraw(Layer::Needle);
        Ok(self)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn stats(&self) -> RedrawStats {
        self.stats
    }

    pub fn value(&self) -> f64 {
        self.config.value
    }

    pub fn needle_source(&self) -> &ImageSource {
        &self.needle_source
    }

    pub fn icon_source(&self) -> Option<&ImageSource> {
        self.icon_source.as_ref()
    }

    /// Needle rotation for `value`, counter-clockwise degrees.
    pub fn value_to_angle(&self, value: f64) -> f64 {
        self.geometry.value_to_angle(value)
    }

    /// Position of `value` on the dial, clockwise degrees from 12 o'clock.
    pub fn dial_angle(&self, value: f64) -> f64 {
        self.geometry.dial_angle(value)
    }

    /// Value under a screen point, if any.
    pub fn get_value(&self, point: Point) -> Option<f64> {
        self.geometry
            .point_to_value(point, self.config.extended_touch)
    }

    pub fn angle_to_value(&self, dial_degrees: f64) -> Option<f64> {
        self.geometry.angle_to_value(dial_degrees)
    }

    /// True when `point` falls on the dial.
    pub fn collide_point(&self, point: Point) -> bool {
        self.get_value(point).is_some()
    }

    /// The six layer scenes in drawing order: sectors, shadow, outer
    /// cadran, values, label, needle.
    pub fn scenes(&self) -> [&Scene; 6] {
        [
            &self.sectors,
            &self.shadow,
            &self.outer_cadran,
            &self.values,
            &self.label,
            &self.needle,
        ]
    }

    /// Every primitive of the current frame, in drawing order.
    pub fn frame(&self) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.scenes().into_iter().flat_map(|scene| scene.iter())
    }

    // ------------------------------------------------------------------------
    // Range and span
    // ------------------------------------------------------------------------

    pub fn set_min(&mut self, min: f64) {
        self.config.min = min;
        self.config.value = self.config.clamp_value(self.config.value);
        self.invalidate(&[Property::Min]);
    }

    pub fn set_max(&mut self, max: f64) {
        self.config.max = max;
        self.config.value = self.config.clamp_value(self.config.value);
        self.invalidate(&[Property::Max]);
    }

    /// Sets both bounds with a single geometry update.
    pub fn set_range(&mut self, min: f64, max: f64) {
        self.config.min = min;
        self.config.max = max;
        self.config.value = self.config.clamp_value(self.config.value);
        self.invalidate(&[Property::Min, Property::Max]);
    }

    /// Sets the start angle, moving the end angle if the span would exceed
    /// a full turn.
    pub fn set_start_angle(&mut self, degrees: f64) {
        self.config.start_angle = degrees.clamp(-MAX_SPAN, MAX_SPAN);
        self.config.restore_span(Endpoint::Start);
        self.invalidate(&[Property::StartAngle]);
    }

    /// Sets the end angle, moving the start angle if the span would exceed
    /// a full turn.
    pub fn set_end_angle(&mut self, degrees: f64) {
        self.config.end_angle = degrees.clamp(-MAX_SPAN, MAX_SPAN);
        self.config.restore_span(Endpoint::End);
        self.invalidate(&[Property::EndAngle]);
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.config.bounds = bounds;
        self.invalidate(&[Property::Position, Property::Size]);
    }

    pub fn set_position(&mut self, origin: Point) {
        self.config.bounds.origin = origin;
        self.invalidate(&[Property::Position]);
    }

    pub fn set_size(&mut self, size: Size) {
        self.config.bounds.size = size;
        self.invalidate(&[Property::Size]);
    }

    // ------------------------------------------------------------------------
    // Ticks
    // ------------------------------------------------------------------------

    /// Non-positive spacing falls back to the default.
    pub fn set_tick(&mut self, tick: f64) {
        self.config.tick = if tick > 0.0 { tick } else { DEFAULT_TICK };
        self.invalidate(&[Property::Tick]);
    }

    /// Capped at [`MAX_SUBTICKS`].
    pub fn set_subtick(&mut self, subtick: u32) {
        self.config.subtick = subtick.min(MAX_SUBTICKS);
        self.invalidate(&[Property::Subtick]);
    }

    pub fn set_display_first(&mut self, display: bool) {
        self.config.display_first = display;
        self.invalidate(&[Property::DisplayFirst]);
    }

    pub fn set_display_last(&mut self, display: bool) {
        self.config.display_last = display;
        self.invalidate(&[Property::DisplayLast]);
    }

    pub fn set_value_font_size(&mut self, size: f64) {
        self.config.value_font_size = size.max(1.0);
        self.invalidate(&[Property::ValueFontSize]);
    }

    pub fn set_cadran_color(&mut self, color: Paint) {
        self.config.cadran_color = color;
        self.invalidate(&[Property::CadranColor]);
    }

    // ------------------------------------------------------------------------
    // Background
    // ------------------------------------------------------------------------

    /// Permissive: a malformed list is drawn as far as it goes and only
    /// logged.
    pub fn set_sectors(&mut self, sectors: Vec<SectorToken>) {
        if let Err(err) = validate_sectors(&sectors) {
            log::warn!("{err}; drawing the sectors anyway");
        }
        self.config.sectors = sectors;
        self.invalidate(&[Property::Sectors]);
    }

    /// Rejects lists that are not alternating colors and increasing bounds.
    /// The current sectors are kept on error.
    pub fn set_sectors_checked(&mut self, sectors: Vec<SectorToken>) -> Result<(), GaugeError> {
        validate_sectors(&sectors)?;
        self.config.sectors = sectors;
        self.invalidate(&[Property::Sectors]);
        Ok(())
    }

    pub fn set_sector_width(&mut self, width: f64) {
        self.config.sector_width = width.max(0.0);
        self.invalidate(&[Property::SectorWidth]);
    }

    pub fn set_shadow_color(&mut self, color: Paint) {
        self.config.shadow_color = color;
        self.invalidate(&[Property::ShadowColor]);
    }

    // ------------------------------------------------------------------------
    // Label
    // ------------------------------------------------------------------------

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.config.label = label.into();
        self.invalidate(&[Property::Label]);
    }

    /// Resolves and sets the label icon. An empty name removes it. On error
    /// the previous icon stays.
    pub fn set_label_icon(&mut self, name: &str) -> Result<(), GaugeError> {
        self.icon_source = resolve_icon(self.resources.as_ref(), name)?;
        self.config.label_icon = name.to_string();
        self.invalidate(&[Property::LabelIcon]);
        Ok(())
    }

    pub fn set_label_icon_scale(&mut self, scale: f64) {
        self.config.label_icon_scale = scale.clamp(0.0, 1.0);
        self.invalidate(&[Property::LabelIconScale]);
    }

    pub fn set_label_font_size(&mut self, size: f64) {
        self.config.label_font_size = size.max(1.0);
        self.invalidate(&[Property::LabelFontSize]);
    }

    pub fn set_label_radius_ratio(&mut self, ratio: f64) {
        self.config.label_radius_ratio = ratio.clamp(-1.0, 1.0);
        self.invalidate(&[Property::LabelRadiusRatio]);
    }

    pub fn set_label_angle_ratio(&mut self, ratio: f64) {
        self.config.label_angle_ratio = ratio.clamp(0.0, 1.0);
        self.invalidate(&[Property::LabelAngleRatio]);
    }

    // ------------------------------------------------------------------------
    // Needle
    // ------------------------------------------------------------------------

    pub fn set_needle_color(&mut self, color: Paint) {
        self.config.needle_color = color;
        self.invalidate(&[Property::NeedleColor]);
    }

    /// Resolves and sets the needle image, falling back to the bundled
    /// needle. On error the previous image stays.
    pub fn set_needle_image(&mut self, name: &str) -> Result<(), GaugeError> {
        self.needle_source = self
            .resources
            .resolve(name, Some(DEFAULT_NEEDLE_IMAGE))?;
        self.config.needle_image = name.to_string();
        self.invalidate(&[Property::NeedleImage]);
        Ok(())
    }

    /// Clamps into `[min, max]` and moves the needle.
    pub fn set_value(&mut self, value: f64) {
        self.config.value = self.config.clamp_value(value);
        self.invalidate(&[Property::Value]);
    }

    // ------------------------------------------------------------------------
    // Inert
    // ------------------------------------------------------------------------

    pub fn set_thickness(&mut self, thickness: f64) {
        self.config.thickness = thickness.max(0.0);
        self.invalidate(&[Property::Thickness]);
    }

    pub fn set_extended_touch(&mut self, extended: bool) {
        self.config.extended_touch = extended;
        self.invalidate(&[Property::ExtendedTouch]);
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    pub fn apply(&mut self, command: GaugeCommand) -> Result<(), GaugeError> {
        match command {
            GaugeCommand::SetValue(v) => self.set_value(v),
            GaugeCommand::SetRange(min, max) => self.set_range(min, max),
            GaugeCommand::SetMin(v) => self.set_min(v),
            GaugeCommand::SetMax(v) => self.set_max(v),
            GaugeCommand::SetStartAngle(v) => self.set_start_angle(v),
            GaugeCommand::SetEndAngle(v) => self.set_end_angle(v),
            GaugeCommand::SetTick(v) => self.set_tick(v),
            GaugeCommand::SetSubtick(n) => self.set_subtick(n),
            GaugeCommand::SetDisplayFirst(b) => self.set_display_first(b),
            GaugeCommand::SetDisplayLast(b) => self.set_display_last(b),
            GaugeCommand::SetValueFontSize(v) => self.set_value_font_size(v),
            GaugeCommand::SetCadranColor(c) => self.set_cadran_color(c),
            GaugeCommand::SetShadowColor(c) => self.set_shadow_color(c),
            GaugeCommand::SetNeedleColor(c) => self.set_needle_color(c),
            GaugeCommand::SetNeedleImage(name) => self.set_needle_image(&name)?,
            GaugeCommand::SetSectors(tokens) => self.set_sectors(tokens),
            GaugeCommand::SetSectorWidth(v) => self.set_sector_width(v),
            GaugeCommand::SetLabel(text) => self.set_label(text),
            GaugeCommand::SetLabelIcon(name) => self.set_label_icon(&name)?,
            GaugeCommand::SetLabelIconScale(v) => self.set_label_icon_scale(v),
            GaugeCommand::SetLabelFontSize(v) => self.set_label_font_size(v),
            GaugeCommand::SetLabelRadiusRatio(v) => self.set_label_radius_ratio(v),
            GaugeCommand::SetLabelAngleRatio(v) => self.set_label_angle_ratio(v),
            GaugeCommand::SetThickness(v) => self.set_thickness(v),
            GaugeCommand::SetBounds(rect) => self.set_bounds(rect),
            GaugeCommand::SetExtendedTouch(b) => self.set_extended_touch(b),
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------------

    fn invalidate(&mut self, properties: &[Property]) {
        let (geometry, layers, value) = router::merge(properties);
        if geometry {
            self.geometry = Geometry::compute(&self.config);
            self.stats.geometry += 1;
        }
        for layer in layers {
            self.redraw(layer);
        }
        if value {
            self.move_needle();
        }
    }

    fn redraw(&mut self, layer: Layer) {
        let (config, geometry) = (&self.config, &self.geometry);
        match layer {
            Layer::Background => {
                self.sectors = layers::sectors(config, geometry);
                self.shadow = layers::shadow(config, geometry);
            }
            Layer::FullCadran => {
                self.outer_cadran = layers::outer_cadran(config, geometry);
                self.values = layers::values(
                    config,
                    geometry,
                    self.formatter.as_ref(),
                    self.measure.as_ref(),
                );
            }
            Layer::Label => {
                self.label = layers::label(
                    config,
                    geometry,
                    self.measure.as_ref(),
                    self.icon_source.as_ref(),
                );
            }
            Layer::Needle => {
                self.config.value = self.config.clamp_value(self.config.value);
                self.needle = layers::needle(&self.config, &self.geometry, &self.needle_source);
            }
        }
        self.stats.record(layer);
        log::debug!("redrew {layer:?} layer");
    }

    /// Moves the needle rotation and the shadow end in place.
    fn move_needle(&mut self) {
        let value = self.config.value;
        self.needle
            .update_rotation(self.geometry.value_to_angle(value));
        self.shadow
            .update_arc_end(layers::shadow_end(&self.config, &self.geometry));
        self.stats.value += 1;
        log::trace!("value {value}");
    }
}

fn resolve_icon(
    resources: &dyn ResourceResolver,
    name: &str,
) -> Result<Option<ImageSource>, GaugeError> {
    if name.is_empty() {
        return Ok(None);
    }
    resources.resolve(name, None).map(Some)
}

/// Parses a command-line style sector list: `COLOR:UPPER` pairs, with a bare
/// color last for a band that runs to `max`, and an optional bare leading
/// number for the start of the first band.
pub fn parse_sectors<S: AsRef<str>>(items: &[S]) -> Result<Vec<SectorToken>, GaugeError> {
    let mut tokens = Vec::with_capacity(items.len() * 2);
    for (i, item) in items.iter().enumerate() {
        let item = item.as_ref().trim();
        if i == 0 {
            if let Ok(start) = item.parse::<f64>() {
                tokens.push(SectorToken::Value(start));
                continue;
            }
        }
        match item.split_once(':') {
            Some((color, upper)) => {
                tokens.push(SectorToken::Color(Color::from_hex(color)?));
                let upper = upper.trim().parse::<f64>().map_err(|_| {
                    GaugeError::InvalidSectors(format!("bad upper bound in {item:?}"))
                })?;
                tokens.push(SectorToken::Value(upper));
            }
            None => tokens.push(SectorToken::Color(Color::from_hex(item)?)),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MemoryImages;

    const RED: Color = Color::new(0xff, 0, 0);
    const GREEN: Color = Color::new(0, 0xff, 0);

    fn images() -> MemoryImages {
        MemoryImages::new()
            .with_image("needle.png", Size::new(128.0, 128.0))
            .with_image("fuel.png", Size::new(64.0, 32.0))
    }

    fn meter(config: GaugeConfig) -> SpeedMeter {
        SpeedMeter::with_parts(
            config,
            Box::new(IntegerTicks),
            Box::new(ApproxMetrics::default()),
            Box::new(images()),
        )
        .unwrap()
    }

    fn dial() -> SpeedMeter {
        meter(
            GaugeConfig::builder()
                .bounds(Rect::new(0.0, 0.0, 200.0, 200.0))
                .shadow_color(Some(RED))
                .build(),
        )
    }

    #[test]
    fn construction_builds_every_layer_and_resets_stats() {
        let gauge = dial();
        assert_eq!(gauge.stats(), RedrawStats::default());
        assert!(!gauge.scenes()[2].is_empty());
        assert!(!gauge.scenes()[5].is_empty());
    }

    #[test]
    fn needle_color_only_touches_the_needle() {
        let mut gauge = dial();
        gauge.set_needle_color(Some(GREEN));
        let stats = gauge.stats();
        assert_eq!(stats.needle, 1);
        assert_eq!(stats.background, 0);
        assert_eq!(stats.full_cadran, 0);
        assert_eq!(stats.label, 0);
        assert_eq!(stats.geometry, 0);
        assert!(gauge
            .frame()
            .any(|c| *c == DrawCommand::Color(GREEN)));
    }

    #[test]
    fn geometry_writes_rebuild_all_layers_once() {
        let mut gauge = dial();
        gauge.set_bounds(Rect::new(10.0, 10.0, 300.0, 300.0));
        let stats = gauge.stats();
        assert_eq!(stats.geometry, 1);
        assert_eq!(
            (stats.background, stats.full_cadran, stats.label, stats.needle),
            (1, 1, 1, 1)
        );
        assert_eq!(gauge.geometry().radius, 150.0);
    }

    #[test]
    fn value_writes_take_the_fast_path() {
        let mut gauge = dial();
        gauge.set_value(40.0);
        let stats = gauge.stats();
        assert_eq!(stats.value, 1);
        assert_eq!(stats.layer_total(), 0);
        assert!(matches!(
            gauge.scenes()[5].commands()[0],
            DrawCommand::PushRotation { angle, .. } if angle.abs() < 1e-9
        ));
        assert!(matches!(
            gauge.scenes()[1].commands()[1],
            DrawCommand::Arc { end_angle, .. } if end_angle.abs() < 1e-9
        ));
    }

    #[test]
    fn fast_path_matches_full_rebuild() {
        let mut fast = dial();
        fast.set_value(73.0);
        let rebuilt = meter(
            GaugeConfig::builder()
                .bounds(Rect::new(0.0, 0.0, 200.0, 200.0))
                .shadow_color(Some(RED))
                .value(73.0)
                .build(),
        );
        assert!(fast.frame().eq(rebuilt.frame()));
    }

    #[test]
    fn values_are_clamped() {
        let mut gauge = dial();
        gauge.set_value(250.0);
        assert_eq!(gauge.value(), 100.0);
        gauge.set_value(-1.0);
        assert_eq!(gauge.value(), 0.0);
        gauge.set_value(80.0);
        gauge.set_max(50.0);
        assert_eq!(gauge.value(), 50.0);
    }

    #[test]
    fn span_correction_keeps_the_written_endpoint() {
        let mut gauge = dial();
        gauge.set_start_angle(-300.0);
        assert_eq!(gauge.config().start_angle, -300.0);
        assert_eq!(gauge.config().end_angle, 60.0);

        let mut gauge = dial();
        gauge.set_end_angle(300.0);
        assert_eq!(gauge.config().start_angle, -60.0);
        assert_eq!(gauge.config().end_angle, 300.0);

        gauge.set_end_angle(-500.0);
        assert_eq!(gauge.config().end_angle, -360.0);
        assert_eq!(gauge.config().start_angle, -60.0);
    }

    #[test]
    fn tick_commands_cannot_blow_up_the_cadran() {
        let mut gauge = dial();
        gauge.apply(GaugeCommand::SetTick(1e-15)).unwrap();
        assert!(gauge.scenes()[3].is_empty());
        gauge.apply(GaugeCommand::SetTick(50.0)).unwrap();
        gauge.apply(GaugeCommand::SetSubtick(u32::MAX)).unwrap();
        assert_eq!(gauge.config().subtick, MAX_SUBTICKS);
        assert_eq!(gauge.stats().full_cadran, 3);
    }

    #[test]
    fn label_writes_touch_only_the_label() {
        let mut gauge = dial();
        gauge.set_label("km/h");
        gauge.set_label_angle_ratio(2.0);
        assert_eq!(gauge.config().label_angle_ratio, 1.0);
        let stats = gauge.stats();
        assert_eq!(stats.label, 2);
        assert_eq!(stats.layer_total(), 2);
    }

    #[test]
    fn inert_properties_redraw_nothing() {
        let mut gauge = dial();
        gauge.set_thickness(4.0);
        gauge.set_extended_touch(true);
        assert_eq!(gauge.stats(), RedrawStats::default());
        assert!(gauge.config().extended_touch);
    }

    #[test]
    fn pointer_queries() {
        let gauge = dial();
        assert_eq!(gauge.get_value(Point::new(50.0, 100.0)).map(f64::round), Some(0.0));
        assert_eq!(gauge.get_value(Point::new(100.0, 50.0)).map(f64::round), Some(40.0));
        assert!(gauge.collide_point(Point::new(100.0, 100.0)));
        assert!(!gauge.collide_point(Point::new(0.0, 0.0)));
        // Between the end (135°) and the start (-90°) going clockwise.
        assert!(!gauge.collide_point(Point::new(70.0, 150.0)));
    }

    #[test]
    fn icon_resolution_errors_keep_previous_state() {
        let mut gauge = dial();
        gauge.set_label_icon("fuel.png").unwrap();
        assert_eq!(gauge.icon_source().map(|s| s.size), Some(Size::new(64.0, 32.0)));
        let err = gauge.set_label_icon("missing.png").unwrap_err();
        assert!(matches!(err, GaugeError::ResourceNotFound { .. }));
        assert_eq!(gauge.config().label_icon, "fuel.png");
        gauge.set_label_icon("").unwrap();
        assert!(gauge.icon_source().is_none());
    }

    #[test]
    fn needle_image_falls_back_to_default() {
        let mut gauge = dial();
        gauge.set_needle_image("custom.png").unwrap();
        assert_eq!(gauge.needle_source().path.to_str(), Some("needle.png"));
        assert_eq!(gauge.config().needle_image, "custom.png");
    }

    #[test]
    fn checked_sectors_reject_bad_lists() {
        let mut gauge = dial();
        let bad = vec![SectorToken::Color(RED), SectorToken::Color(GREEN)];
        assert!(gauge.set_sectors_checked(bad.clone()).is_err());
        assert!(gauge.config().sectors.is_empty());
        assert_eq!(gauge.stats().background, 0);

        gauge.set_sectors(bad);
        assert_eq!(gauge.stats().background, 1);
        assert_eq!(gauge.config().sector_bands().len(), 2);
    }

    #[test]
    fn frame_follows_layer_order() {
        let mut gauge = dial();
        gauge.set_sectors(vec![SectorToken::Color(GREEN)]);
        let first = gauge.frame().next().cloned();
        assert_eq!(first, Some(DrawCommand::Color(GREEN)));
        let total: usize = gauge.scenes().iter().map(|s| s.len()).sum();
        assert_eq!(gauge.frame().count(), total);
        assert_eq!(gauge.frame().last(), Some(&DrawCommand::PopTransform));
    }

    #[test]
    fn custom_formatter_rebuilds_ticks() {
        let gauge = dial().with_formatter(|v: f64| format!("{v}%"));
        assert!(gauge.scenes()[3].iter().any(
            |c| matches!(c, DrawCommand::Text { text, .. } if text == "100%")
        ));
    }

    #[test]
    fn commands_map_to_setters() {
        let mut gauge = dial();
        gauge.apply(GaugeCommand::SetValue(55.0)).unwrap();
        gauge.apply(GaugeCommand::SetRange(0.0, 200.0)).unwrap();
        gauge.apply(GaugeCommand::SetLabel("rpm".into())).unwrap();
        assert_eq!(gauge.value(), 55.0);
        assert_eq!(gauge.config().max, 200.0);
        assert_eq!(gauge.config().label, "rpm");
        assert!(gauge
            .apply(GaugeCommand::SetLabelIcon("nope.png".into()))
            .is_err());
    }

    #[test]
    fn parse_sectors_reads_cli_pairs() {
        let tokens = parse_sectors(&["10", "#ff0000:40", "#00ff00"]).unwrap();
        assert_eq!(
            tokens,
            vec![
                SectorToken::Value(10.0),
                SectorToken::Color(RED),
                SectorToken::Value(40.0),
                SectorToken::Color(GREEN),
            ]
        );
        assert!(parse_sectors(&["#ff0000:x"]).is_err());
        assert!(parse_sectors(&["nothex"]).is_err());
    }
}
