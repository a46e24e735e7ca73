use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use speedmeter::text::{find_system_font, load_font};
use speedmeter::viewer::{self, ViewerConfig};
use speedmeter::{
    Color, FontMetrics, GaugeCommand, GaugeConfig, Rasterizer, SectorToken, SpeedMeter,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // A tachometer with a red zone, a shadow trailing the needle and minor ticks.
    let config = GaugeConfig::builder()
        .min(0.0)
        .max(8.0)
        .tick(1.0)
        .subtick(4)
        .start_angle(-120.0)
        .end_angle(120.0)
        .sectors(vec![
            SectorToken::Value(6.5),
            Color::from_hex("#ff6d00")?.into(),
            7.0.into(),
            Color::from_hex("#d50000")?.into(),
        ])
        .sector_width(6.0)
        .shadow_color(Some(Color::from_hex("#6bf2ff40")?))
        .label("x1000 rpm")
        .label_radius_ratio(0.45)
        .label_angle_ratio(0.5)
        .build();

    let font = find_system_font().and_then(|path| load_font(&path).ok());
    let mut meter = SpeedMeter::new(config)?;
    if let Some(font) = &font {
        meter = meter.with_text_measure(FontMetrics::new(font.clone()));
    }

    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut rpm: f64 = 1.0;
        loop {
            // Random walk, pulled back towards idle.
            rpm = (rpm + rng.random_range(-0.4..0.5) - 0.02 * (rpm - 1.0)).clamp(0.0, 8.0);
            let commands = [
                GaugeCommand::SetValue(rpm),
                GaugeCommand::SetNeedleColor(Some(if rpm > 6.5 {
                    Color::new(0xff, 0x50, 0x50)
                } else {
                    Color::new(0x6b, 0xf2, 0xff)
                })),
            ];
            if commands.iter().any(|cmd| sender.send(cmd.clone()).is_err()) {
                break;
            }
            thread::sleep(Duration::from_millis(100));
        }
    });

    println!("Tachometer driven by a random walk. Click or drag to move the needle.");
    let viewer_config = ViewerConfig::builder().title("Dashboard").build();
    viewer::run(meter, Rasterizer::new(font), &viewer_config, Some(receiver))?;
    Ok(())
}
