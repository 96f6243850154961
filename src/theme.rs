//! Theme cycling: light, dark and gradient.
//!
//! The theme lives in memory only and starts as [`Theme::Light`] on every launch.

use std::time::Duration;

use egui::{Color32, Rect, Visuals};
use web_time::Instant;

/// Theme choice, cycled in declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Gradient,
}

impl Theme {
    pub const ALL: [Self; 3] = [Self::Light, Self::Dark, Self::Gradient];

    /// The next theme, wrapping around after the last one.
    pub fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Gradient,
            Self::Gradient => Self::Light,
        }
    }

    /// Name written to the document's `data-theme` attribute.
    pub fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Gradient => "gradient",
        }
    }

    /// Glyph shown on the toggle button: moon, sun, star.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "🌙",
            Self::Dark => "☀",
            Self::Gradient => "⭐",
        }
    }

    pub fn visuals(self) -> Visuals {
        match self {
            Self::Light => Visuals::light(),
            Self::Dark => Visuals::dark(),
            Self::Gradient => {
                let mut visuals = Visuals::dark();
                visuals.panel_fill = Color32::from_rgb(0x2a, 0x1b, 0x4d);
                visuals.window_fill = Color32::from_rgb(0x32, 0x22, 0x5c);
                visuals.extreme_bg_color = Color32::from_rgb(0x1c, 0x12, 0x36);
                visuals.selection.bg_fill = Color32::from_rgb(0x8a, 0x4f, 0xd8);
                visuals.hyperlink_color = Color32::from_rgb(0xf7, 0xb2, 0xe6);
                visuals
            }
        }
    }

    /// Top and bottom colors of the background gradient, if this theme paints one.
    pub fn gradient(self) -> Option<(Color32, Color32)> {
        match self {
            Self::Gradient => Some((
                Color32::from_rgb(0x66, 0x7e, 0xea),
                Color32::from_rgb(0x76, 0x4b, 0xa2),
            )),
            Self::Light | Self::Dark => None,
        }
    }

    /// Apply to the egui context and, on the web, to the document root.
    pub fn apply(self, ctx: &egui::Context) {
        let preference = match self {
            Self::Light => egui::ThemePreference::Light,
            Self::Dark | Self::Gradient => egui::ThemePreference::Dark,
        };
        ctx.set_theme(preference);
        ctx.set_visuals(self.visuals());
        set_document_theme(self.name());
        log::debug!("Applied theme '{}'", self.name());
    }
}

#[cfg(target_arch = "wasm32")]
fn set_document_theme(name: &str) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    if let Err(e) = root.set_attribute("data-theme", name) {
        log::warn!("Failed to set data-theme attribute: {e:?}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn set_document_theme(_name: &str) {}

/// Paint a vertical two-color gradient over `rect`.
pub fn paint_gradient(painter: &egui::Painter, rect: Rect, (top, bottom): (Color32, Color32)) {
    let mut mesh = egui::Mesh::default();
    mesh.colored_vertex(rect.left_top(), top);
    mesh.colored_vertex(rect.right_top(), top);
    mesh.colored_vertex(rect.left_bottom(), bottom);
    mesh.colored_vertex(rect.right_bottom(), bottom);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(1, 3, 2);
    painter.add(egui::Shape::mesh(mesh));
}

/// Brief rotation of the toggle button after a click.
#[derive(Debug, Default)]
pub struct ThemeSpin {
    started: Option<Instant>,
}

impl ThemeSpin {
    pub const ANGLE_DEGREES: f32 = 30.0;
    pub const DURATION: Duration = Duration::from_millis(300);

    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Current rotation in radians: 30° while the spin is active, 0 afterwards.
    pub fn angle(&self) -> f32 {
        self.angle_at(Instant::now())
    }

    fn angle_at(&self, now: Instant) -> f32 {
        match self.started {
            Some(started) if now.saturating_duration_since(started) < Self::DURATION => {
                Self::ANGLE_DEGREES.to_radians()
            }
            _ => 0.0,
        }
    }

    /// Time left until the button reverts, if spinning.
    pub fn remaining(&self) -> Option<Duration> {
        let elapsed = self.started?.elapsed();
        Self::DURATION.checked_sub(elapsed).filter(|d| !d.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_order() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.next(), Theme::Dark);
        assert_eq!(Theme::Dark.next(), Theme::Gradient);
        assert_eq!(Theme::Gradient.next(), Theme::Light);
    }

    #[test]
    fn test_three_steps_return_to_start() {
        for theme in Theme::ALL {
            assert_eq!(theme.next().next().next(), theme);
        }
    }

    #[test]
    fn test_cycling_stays_in_set() {
        let mut theme = Theme::Light;
        for _ in 0..100 {
            theme = theme.next();
            assert!(Theme::ALL.contains(&theme));
        }
    }

    #[test]
    fn test_names_and_icons() {
        let names: Vec<_> = Theme::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(names, ["light", "dark", "gradient"]);
        assert_eq!(Theme::Light.icon(), "🌙");
        assert_eq!(Theme::Dark.icon(), "☀");
        assert_eq!(Theme::Gradient.icon(), "⭐");
        assert!(Theme::Gradient.gradient().is_some());
        assert!(Theme::Dark.gradient().is_none());
    }

    #[test]
    fn test_spin_reverts() {
        let mut spin = ThemeSpin::default();
        assert_eq!(spin.angle(), 0.0);

        spin.start();
        let started = spin.started.unwrap();
        assert_eq!(spin.angle_at(started), 30f32.to_radians());
        assert_eq!(spin.angle_at(started + Duration::from_millis(299)), 30f32.to_radians());
        assert_eq!(spin.angle_at(started + ThemeSpin::DURATION), 0.0);
    }
}
