use proptest::prelude::*;
use speedmeter::{GaugeConfig, Geometry, Point, Rect, SpeedMeter};

fn geometry(min: f64, max: f64, start: f64, end: f64) -> Geometry {
    let config = GaugeConfig::builder()
        .bounds(Rect::new(0.0, 0.0, 200.0, 200.0))
        .min(min)
        .max(max)
        .start_angle(start)
        .end_angle(end)
        .build()
        .normalized();
    Geometry::compute(&config)
}

/// Point at `dial_degrees` on a circle of `radius` around the gauge centre.
fn on_dial(geometry: &Geometry, radius: f64, dial_degrees: f64) -> Point {
    geometry.center.polar(radius, dial_degrees)
}

#[test]
fn default_dial_fixture() {
    let g = geometry(0.0, 100.0, -90.0, 135.0);
    assert_eq!(g.a, -2.25);
    assert_eq!(g.b, 90.0);
    assert_eq!(g.value_to_angle(0.0), 90.0);
    assert_eq!(g.value_to_angle(100.0), -135.0);
    assert_eq!(g.dial_angle(100.0), 135.0);
    assert_eq!(g.center, Point::new(100.0, 100.0));
    assert_eq!(g.radius, 100.0);
}

#[test]
fn centre_maps_to_three_o_clock() {
    let g = geometry(0.0, 100.0, -90.0, 135.0);
    let v = g.point_to_value(g.center, false).unwrap();
    assert!((v - 80.0).abs() < 1e-9);
    assert_eq!(g.angle_to_value(90.0).map(|v| v.round()), Some(80.0));
}

#[test]
fn zero_radius_reports_nothing() {
    let config = GaugeConfig::builder()
        .bounds(Rect::new(10.0, 10.0, 0.0, 50.0))
        .build();
    let meter = SpeedMeter::new(config).unwrap();
    assert_eq!(meter.geometry().radius, 0.0);
    assert_eq!(meter.get_value(Point::new(10.0, 35.0)), None);
}

#[test]
fn extended_touch_reports_out_of_range() {
    let g = geometry(0.0, 100.0, -90.0, 135.0);
    // 7 o'clock: 15° past the end (135° + 15° = 150°), far from the start.
    let p = on_dial(&g, 50.0, 150.0);
    assert_eq!(g.point_to_value(p, false), None);
    let v = g.point_to_value(p, true).unwrap();
    assert!(v > 100.0, "{v}");
    // 8 o'clock: nearer the start (-90° is 270°, 240° is 30° before it).
    let p = on_dial(&g, 50.0, 240.0);
    let v = g.point_to_value(p, true).unwrap();
    assert!(v < 0.0, "{v}");
}

proptest! {
    #[test]
    fn prop_round_trip(
        min in -1000.0f64..1000.0,
        width in 0.1f64..1000.0,
        start in -360.0f64..360.0,
        span in prop_oneof![-359.0f64..-1.0, 1.0f64..359.0],
        t in 0.0f64..=1.0,
    ) {
        let end = start + span;
        prop_assume!((-360.0..=360.0).contains(&end));
        let max = min + width;
        let g = geometry(min, max, start, end);
        let value = min + t * width;
        let back = g.angle_to_value(g.dial_angle(value));
        prop_assert!(back.is_some(), "no value for {value}");
        let back = back.unwrap_or(f64::NAN);
        prop_assert!((back - value).abs() <= 1e-6 * width, "{value} -> {back}");
    }

    #[test]
    fn prop_full_circle_round_trip(
        min in -100.0f64..100.0,
        width in 1.0f64..500.0,
        start in -360.0f64..360.0,
        t in 0.0f64..0.999,
    ) {
        let g = geometry(min, min + width, start, start);
        let value = min + t * width;
        let back = g.angle_to_value(g.dial_angle(value)).unwrap_or(f64::NAN);
        prop_assert!((back - value).abs() <= 1e-6 * width, "{value} -> {back}");
    }

    #[test]
    fn prop_full_circle_covers_every_direction(
        start in -360.0f64..360.0,
        offset in 0.001f64..359.999,
        radius in 1.0f64..99.0,
    ) {
        let g = geometry(0.0, 100.0, start, start);
        let v = g.point_to_value(on_dial(&g, radius, start + offset), false);
        prop_assert!(matches!(v, Some(v) if (0.0..=100.0).contains(&v)), "{v:?}");
    }

    #[test]
    fn prop_outside_radius_is_no_value(angle in -180.0f64..180.0, extra in 0.01f64..50.0) {
        let g = geometry(0.0, 100.0, -90.0, 135.0);
        let p = on_dial(&g, g.radius + extra, angle);
        prop_assert_eq!(g.point_to_value(p, true), None);
    }

    #[test]
    fn prop_clamp_is_idempotent(value in -1.0e6f64..1.0e6) {
        let mut meter = SpeedMeter::new(GaugeConfig::default()).unwrap();
        meter.set_value(value);
        let once = meter.value();
        prop_assert_eq!(once, value.clamp(0.0, 100.0));
        meter.set_value(once);
        prop_assert_eq!(meter.value(), once);
    }

    #[test]
    fn prop_span_rule_moves_the_other_endpoint(start in -360.0f64..360.0, end in -360.0f64..360.0) {
        let mut meter = SpeedMeter::new(GaugeConfig::default()).unwrap();
        meter.set_start_angle(start);
        let before = meter.config().start_angle;
        meter.set_end_angle(end);
        let config = meter.config();
        prop_assert_eq!(config.end_angle, end);
        if end - before > 360.0 {
            prop_assert_eq!(config.start_angle, end - 360.0);
        } else if before - end > 360.0 {
            prop_assert_eq!(config.start_angle, end + 360.0);
        } else {
            prop_assert_eq!(config.start_angle, before);
        }
        prop_assert!((config.end_angle - config.start_angle).abs() <= 360.0);
    }

    #[test]
    fn prop_pointer_values_stay_in_range(angle in -180.0f64..180.0, radius in 0.0f64..100.0) {
        let g = geometry(0.0, 100.0, -90.0, 135.0);
        if let Some(v) = g.point_to_value(on_dial(&g, radius, angle), false) {
            prop_assert!((0.0..=100.0).contains(&v), "{v}");
        }
    }
}
