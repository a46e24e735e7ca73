//! A window hosting one gauge.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bon::Builder;
use pixels::{Pixels, SurfaceTexture, TextureError};
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::color::Color;
use crate::error::GaugeError;
use crate::gauge::{GaugeCommand, SpeedMeter};
use crate::geometry::{Point, Rect};
use crate::raster::{Canvas, Rasterizer};

#[derive(Debug, Clone, Builder)]
pub struct ViewerConfig {
    #[builder(into, default = "Speedmeter".to_string())]
    pub title: String,
    #[builder(default = 400)]
    pub window_width: u32,
    #[builder(default = 400)]
    pub window_height: u32,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
    #[builder(default = Color::new(0x12, 0x12, 0x12))]
    pub background: Color,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Left click or drag moves the needle to the pointer; right click logs the
/// value under the pointer. Commands from `receiver` are applied before each
/// frame. The gauge is resized to fill the window.
pub fn run(
    mut meter: SpeedMeter,
    rasterizer: Rasterizer,
    config: &ViewerConfig,
    receiver: Option<Receiver<GaugeCommand>>,
) -> Result<(), GaugeError> {
    let mut rasterizer = rasterizer.with_background(config.background);
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(
            f64::from(config.window_width),
            f64::from(config.window_height),
        ))
        .build(&event_loop)?;
    let window = Arc::new(window);

    let size = window.inner_size();
    let mut fb_width = size.width as usize;
    let mut fb_height = size.height as usize;
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;
    meter.set_bounds(Rect::new(0.0, 0.0, fb_width as f64, fb_height as f64));

    let frame_duration = Duration::from_secs_f64(1.0 / config.max_framerate.max(1.0));
    let mut last_frame = Instant::now();
    let mut cursor = Point::default();
    let mut dragging = false;
    let window_clone = window.clone();

    event_loop.run(move |event, window_target| {
        window_target.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => window_target.exit(),
                WindowEvent::Resized(new_size) => {
                    if new_size.width == 0 || new_size.height == 0 {
                        return;
                    }
                    fb_width = new_size.width as usize;
                    fb_height = new_size.height as usize;
                    if let Err(err) = resize(&mut pixels, new_size.width, new_size.height) {
                        log::error!("resize failed: {err}");
                        window_target.exit();
                        return;
                    }
                    meter.set_bounds(Rect::new(0.0, 0.0, fb_width as f64, fb_height as f64));
                }
                WindowEvent::CursorMoved { position, .. } => {
                    cursor = to_point(position);
                    if dragging {
                        move_needle(&mut meter, cursor);
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => {
                        dragging = true;
                        move_needle(&mut meter, cursor);
                    }
                    (MouseButton::Left, ElementState::Released) => dragging = false,
                    (MouseButton::Right, ElementState::Pressed) => {
                        match meter.get_value(cursor) {
                            Some(value) => log::info!("value under pointer: {value:.2}"),
                            None => log::info!("pointer is off the dial"),
                        }
                    }
                    _ => {}
                },
                WindowEvent::RedrawRequested => {
                    if let Some(receiver) = &receiver {
                        for command in receiver.try_iter() {
                            if let Err(err) = meter.apply(command) {
                                log::warn!("command rejected: {err}");
                            }
                        }
                    }
                    let mut canvas = Canvas::new(pixels.frame_mut(), fb_width, fb_height);
                    rasterizer.render(&mut canvas, meter.frame());
                    if let Err(err) = pixels.render() {
                        log::error!("render failed: {err}");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if last_frame.elapsed() >= frame_duration {
                    window_clone.request_redraw();
                    last_frame = Instant::now();
                }
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn resize(pixels: &mut Pixels<'_>, width: u32, height: u32) -> Result<(), TextureError> {
    pixels.resize_buffer(width, height)?;
    pixels.resize_surface(width, height)
}

fn to_point(position: PhysicalPosition<f64>) -> Point {
    Point::new(position.x, position.y)
}

/// Points off the dial leave the value alone.
fn move_needle(meter: &mut SpeedMeter, cursor: Point) {
    if let Some(value) = meter.get_value(cursor) {
        meter.set_value(value);
    }
}
