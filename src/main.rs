use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use clap::Parser;

use speedmeter::raster::{render_to_buffer, save_png};
use speedmeter::text::{find_system_font, load_font};
use speedmeter::viewer::{self, ViewerConfig};
use speedmeter::{
    parse_sectors, Color, FontMetrics, GaugeCommand, GaugeConfig, GaugeError, Rasterizer, Rect,
    SpeedMeter,
};

#[derive(Parser)]
#[command(name = "speedmeter")]
#[command(about = "Circular gauge with a draggable needle")]
#[command(version)]
struct Cli {
    /// Value range
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    range: Option<Vec<f64>>,

    /// Dial span, clockwise degrees from 12 o'clock; equal angles give a full circle
    #[arg(long, num_args = 2, value_names = ["START", "END"], allow_negative_numbers = true)]
    angles: Option<Vec<f64>>,

    /// Major tick spacing in value units
    #[arg(long, default_value_t = 10.0)]
    tick: f64,

    /// Minor ticks between two major ticks
    #[arg(long, default_value_t = 0)]
    subtick: u32,

    /// Initial value
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    value: f64,

    /// Sector band width; 0 draws pie wedges
    #[arg(long, default_value_t = 0.0)]
    sector_width: f64,

    /// Sector as COLOR:UPPER, or a bare COLOR last to run to the maximum.
    /// A bare number first sets where the first sector starts.
    #[arg(long = "sector", value_name = "COLOR:UPPER", allow_negative_numbers = true)]
    sectors: Vec<String>,

    /// Shadow arc color (#rrggbb or #rrggbbaa)
    #[arg(long)]
    shadow: Option<String>,

    /// Rim and tick color; empty hides them
    #[arg(long, default_value = "#ffffff")]
    cadran_color: String,

    /// Needle tint; empty hides the needle
    #[arg(long, default_value = "#6bf2ff")]
    needle_color: String,

    /// Text in the middle of the dial
    #[arg(long, default_value = "")]
    label: String,

    /// Icon drawn instead of the label text
    #[arg(long, default_value = "")]
    label_icon: String,

    /// Needle image path or bundled image name
    #[arg(long, default_value = "needle.png")]
    needle_image: String,

    /// TrueType font for tick values and the label
    #[arg(long)]
    font: Option<PathBuf>,

    /// Window side in logical pixels
    #[arg(long, default_value_t = 400)]
    size: u32,

    /// Window title
    #[arg(long, default_value = "Speedmeter")]
    title: String,

    /// Frame rate limit
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Read values from stdin, one per line
    #[arg(long)]
    stdin: bool,

    /// Render one frame to a PNG file instead of opening a window
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,
}

impl Cli {
    fn gauge_config(&self) -> Result<GaugeConfig, GaugeError> {
        let (min, max) = match self.range.as_deref() {
            Some([a, b]) => (a.min(*b), a.max(*b)),
            _ => (0.0, 100.0),
        };
        let (start_angle, end_angle) = match self.angles.as_deref() {
            Some([start, end]) => (*start, *end),
            _ => (-90.0, 135.0),
        };
        let side = f64::from(self.size);
        let shadow_color = match &self.shadow {
            Some(hex) => Color::parse_optional(hex)?,
            None => None,
        };
        Ok(GaugeConfig::builder()
            .bounds(Rect::new(0.0, 0.0, side, side))
            .min(min)
            .max(max)
            .value(self.value)
            .start_angle(start_angle)
            .end_angle(end_angle)
            .tick(self.tick)
            .subtick(self.subtick)
            .sectors(parse_sectors(self.sectors.as_slice())?)
            .sector_width(self.sector_width)
            .cadran_color(Color::parse_optional(&self.cadran_color)?)
            .shadow_color(shadow_color)
            .needle_color(Color::parse_optional(&self.needle_color)?)
            .needle_image(self.needle_image.as_str())
            .label_icon(self.label_icon.as_str())
            .label(self.label.as_str())
            .build())
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("speedmeter: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), GaugeError> {
    let config = cli.gauge_config()?;
    let font = match cli.font.clone().or_else(find_system_font) {
        Some(path) => match load_font(&path) {
            Ok(font) => Some(font),
            Err(err) => {
                log::warn!("{err}");
                None
            }
        },
        None => None,
    };

    let mut meter = SpeedMeter::new(config)?;
    if let Some(font) = &font {
        meter = meter.with_text_measure(FontMetrics::new(font.clone()));
    }
    let viewer_config = ViewerConfig::builder()
        .title(cli.title.as_str())
        .window_width(cli.size)
        .window_height(cli.size)
        .max_framerate(cli.fps)
        .build();
    let mut rasterizer = Rasterizer::new(font).with_background(viewer_config.background);

    if let Some(path) = &cli.snapshot {
        let side = cli.size as usize;
        let frame = render_to_buffer(&mut rasterizer, side, side, meter.frame());
        save_png(path, cli.size, cli.size, &frame)?;
        log::info!("wrote {}", path.display());
        return Ok(());
    }

    let receiver = cli.stdin.then(spawn_stdin_reader);
    viewer::run(meter, rasterizer, &viewer_config, receiver)
}

/// Forwards every number read from stdin as a value write.
fn spawn_stdin_reader() -> Receiver<GaugeCommand> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match line.trim().parse::<f64>() {
                Ok(value) => {
                    if sender.send(GaugeCommand::SetValue(value)).is_err() {
                        break;
                    }
                }
                Err(_) => log::warn!("ignoring non-numeric input {line:?}"),
            }
        }
    });
    receiver
}
