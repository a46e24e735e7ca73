//! Retained drawing primitives.
//!
//! Angles in arc and pie commands are dial angles: degrees, clockwise from
//! 12 o'clock. A `Color` command sets the color used by every following
//! command until the next `Color`, across layer boundaries.

use crate::color::Color;
use crate::geometry::{Point, Rect};
use crate::resources::ImageSource;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Color(Color),
    /// Stroked arc between two dial angles (in either order).
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        width: f64,
    },
    /// Stroked full circle.
    Circle {
        center: Point,
        radius: f64,
        width: f64,
    },
    /// Filled wedge from the centre between two dial angles.
    Pie {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    /// Stroked open polyline.
    Line {
        points: Vec<Point>,
        width: f64,
    },
    /// Text centred in `rect`.
    Text {
        rect: Rect,
        text: String,
        font_size: f64,
        bold: bool,
    },
    /// Image stretched over `rect`, tinted by the current color.
    Image {
        rect: Rect,
        source: ImageSource,
    },
    /// Rotates everything up to the matching `PopTransform` by `angle`
    /// degrees counter-clockwise around `origin`.
    PushRotation {
        origin: Point,
        angle: f64,
    },
    PopTransform,
}

/// Ordered primitives produced by one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Sets the angle of the first rotation node in place. Returns `false`
    /// when the scene has none.
    pub fn update_rotation(&mut self, new_angle: f64) -> bool {
        for command in &mut self.commands {
            if let DrawCommand::PushRotation { angle, .. } = command {
                *angle = new_angle;
                return true;
            }
        }
        false
    }

    /// Moves the end of the first arc in place. Returns `false` when the
    /// scene has none.
    pub fn update_arc_end(&mut self, new_end: f64) -> bool {
        for command in &mut self.commands {
            if let DrawCommand::Arc { end_angle, .. } = command {
                *end_angle = new_end;
                return true;
            }
        }
        false
    }
}

impl<'a> IntoIterator for &'a Scene {
    type Item = &'a DrawCommand;
    type IntoIter = std::slice::Iter<'a, DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_updates_in_place() {
        let mut scene = Scene::new();
        scene.add_command(DrawCommand::Color(Color::WHITE));
        scene.add_command(DrawCommand::PushRotation {
            origin: Point::new(1.0, 2.0),
            angle: 0.0,
        });
        scene.add_command(DrawCommand::PopTransform);
        assert!(scene.update_rotation(45.0));
        assert_eq!(
            scene.commands()[1],
            DrawCommand::PushRotation {
                origin: Point::new(1.0, 2.0),
                angle: 45.0
            }
        );
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn updates_on_empty_scene_report_nothing() {
        let mut scene = Scene::new();
        assert!(!scene.update_rotation(1.0));
        assert!(!scene.update_arc_end(1.0));
        assert!(scene.is_empty());
    }
}
