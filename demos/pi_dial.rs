use std::f64::consts::PI;

use speedmeter::text::{find_system_font, load_font};
use speedmeter::viewer::{self, ViewerConfig};
use speedmeter::{FontMetrics, GaugeConfig, Rasterizer, SpeedMeter};

/// Writes multiples of π/4 as fractions: "0", "π/4", "π/2", "3π/4", "π", ...
fn pi_fraction(value: f64) -> String {
    let quarters = (value / (PI / 4.0)).round() as i64;
    let (num, den) = reduce(quarters, 4);
    match (num, den) {
        (0, _) => "0".to_string(),
        (1, 1) => "π".to_string(),
        (-1, 1) => "-π".to_string(),
        (n, 1) => format!("{n}π"),
        (1, d) => format!("π/{d}"),
        (-1, d) => format!("-π/{d}"),
        (n, d) => format!("{n}π/{d}"),
    }
}

fn reduce(num: i64, den: i64) -> (i64, i64) {
    let (mut a, mut b) = (num.abs(), den);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    let g = a.max(1);
    (num / g, den / g)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // A full-circle dial over one turn, labelled in fractions of π.
    let config = GaugeConfig::builder()
        .min(0.0)
        .max(2.0 * PI)
        .tick(PI / 4.0)
        .subtick(2)
        .start_angle(0.0)
        .end_angle(0.0)
        .display_last(false)
        .label("θ")
        .label_radius_ratio(0.0)
        .build();

    let font = find_system_font().and_then(|path| load_font(&path).ok());
    let mut meter = SpeedMeter::new(config)?.with_formatter(pi_fraction);
    if let Some(font) = &font {
        meter = meter.with_text_measure(FontMetrics::new(font.clone()));
    }

    println!("Drag the needle around the circle; right click prints the angle.");
    let viewer_config = ViewerConfig::builder().title("Angle").build();
    viewer::run(meter, Rasterizer::new(font), &viewer_config, None)?;
    Ok(())
}
