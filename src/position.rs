//! Single-shot capture of the recipient name position.

use egui::{Color32, Pos2, Stroke};
use serde::{Deserialize, Serialize};

use crate::error::PositionError;

/// Marker drawn at the captured position.
pub const MARKER_RADIUS: f32 = 10.0;
pub const MARKER_FILL: Color32 = Color32::RED;
pub const MARKER_STROKE: Stroke = Stroke {
    width: 2.0,
    color: Color32::WHITE,
};

/// Where the recipient's name goes, in surface-local pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamePosition {
    pub x: f32,
    pub y: f32,
}

impl NamePosition {
    /// Convert a pointer position into surface-local coordinates.
    pub fn from_pointer(pointer: Pos2, surface_origin: Pos2) -> Self {
        let local = pointer - surface_origin;
        Self {
            x: local.x,
            y: local.y,
        }
    }

    pub fn to_vec2(self) -> egui::Vec2 {
        egui::vec2(self.x, self.y)
    }
}

impl std::fmt::Display for NamePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X: {}, Y: {}", self.x.round(), self.y.round())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerMode {
    #[default]
    Idle,
    Armed,
}

/// `Idle -> Armed` on request (only with a template), `Armed -> Idle` on the next click.
#[derive(Debug, Default)]
pub struct PositionMarker {
    mode: MarkerMode,
}

impl PositionMarker {
    pub fn mode(&self) -> MarkerMode {
        self.mode
    }

    pub fn is_armed(&self) -> bool {
        self.mode == MarkerMode::Armed
    }

    /// # Errors
    /// [`PositionError::NoTemplate`] when no template is visible.
    pub fn arm(&mut self, template_visible: bool) -> Result<(), PositionError> {
        if !template_visible {
            return Err(PositionError::NoTemplate);
        }
        self.mode = MarkerMode::Armed;
        log::debug!("Position marker armed");
        Ok(())
    }

    /// Consume a click on the surface. Returns a position only when armed.
    pub fn capture(&mut self, pointer: Pos2, surface_origin: Pos2) -> Option<NamePosition> {
        if self.mode != MarkerMode::Armed {
            return None;
        }
        self.mode = MarkerMode::Idle;
        let position = NamePosition::from_pointer(pointer, surface_origin);
        log::debug!("Position marker captured {position} and disarmed");
        Some(position)
    }
}

/// Paint the position marker on top of a surface whose top-left corner is `surface_origin`.
pub fn paint_marker(painter: &egui::Painter, surface_origin: Pos2, position: NamePosition) {
    let center = surface_origin + position.to_vec2();
    painter.circle(center, MARKER_RADIUS, MARKER_FILL, MARKER_STROKE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_requires_template() {
        let mut marker = PositionMarker::default();
        assert_eq!(marker.arm(false), Err(PositionError::NoTemplate));
        assert_eq!(marker.mode(), MarkerMode::Idle);
    }

    #[test]
    fn test_capture_relative_to_surface_origin() {
        let mut marker = PositionMarker::default();
        marker.arm(true).unwrap();
        let position = marker
            .capture(Pos2::new(150.0, 250.0), Pos2::new(50.0, 50.0))
            .unwrap();
        assert_eq!(position, NamePosition { x: 100.0, y: 200.0 });
    }

    #[test]
    fn test_capture_is_single_shot() {
        let mut marker = PositionMarker::default();
        assert_eq!(marker.capture(Pos2::new(1.0, 1.0), Pos2::ZERO), None);

        marker.arm(true).unwrap();
        assert!(marker.is_armed());
        assert!(marker.capture(Pos2::new(1.0, 1.0), Pos2::ZERO).is_some());
        assert_eq!(marker.mode(), MarkerMode::Idle);
        assert!(!marker.is_armed());
        assert_eq!(marker.capture(Pos2::new(2.0, 2.0), Pos2::ZERO), None);
    }

    #[test]
    fn test_display_rounds() {
        let position = NamePosition { x: 99.6, y: 200.4 };
        assert_eq!(position.to_string(), "X: 100, Y: 200");
    }
}
