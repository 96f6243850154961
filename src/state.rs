//! Application state and the handlers that react to user actions.
//!
//! The egui layer owns one [`StudioState`] and forwards uploads, surface
//! clicks and button presses to it. Everything that must be shown to the user
//! as a blocking alert is queued as a [`Notice`].

use std::collections::VecDeque;

use egui::Pos2;

use crate::error::{PositionError, TemplateError};
use crate::position::{MarkerMode, NamePosition, PositionMarker};
use crate::storage::{self, KeyValueStore};
use crate::template::{SelectedFile, TemplateImage};
use crate::theme::Theme;

pub const SAVE_TEMPLATE_FAILED: &str = "Unable to save template. The file might be too large.";
pub const SAVE_POSITION_FAILED: &str = "Unable to save the name position.";
pub const NO_TEMPLATE: &str = "Please upload a certificate template first.";
pub const ARM_INSTRUCTIONS: &str = "Click on the certificate where the recipient's name should appear.";

/// A message the user has to acknowledge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub struct StudioState {
    store: Box<dyn KeyValueStore>,

    /// The base image on the drawing surface; `None` shows the placeholder.
    template: Option<TemplateImage>,

    /// Bumped whenever `template` is replaced so the UI can refresh its texture.
    generation: u64,

    marker: PositionMarker,

    /// Last captured or restored name position, shown in the coordinate readout.
    position: Option<NamePosition>,

    /// Whether the marker is currently painted on the surface.
    marker_visible: bool,

    theme: Theme,

    notices: VecDeque<Notice>,
}

impl StudioState {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        log::info!("Using {} for certificate records", store.describe());
        Self {
            store,
            template: None,
            generation: 0,
            marker: PositionMarker::default(),
            position: None,
            marker_visible: false,
            theme: Theme::default(),
            notices: VecDeque::new(),
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn template(&self) -> Option<&TemplateImage> {
        self.template.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_surface_visible(&self) -> bool {
        self.template.is_some()
    }

    /// Size of the drawing surface, equal to the template's intrinsic size.
    pub fn surface_size(&self) -> Option<[usize; 2]> {
        self.template.as_ref().map(TemplateImage::size)
    }

    pub fn position(&self) -> Option<NamePosition> {
        self.position
    }

    /// Position of the marker to paint, if any.
    pub fn marker_position(&self) -> Option<NamePosition> {
        self.position.filter(|_| self.marker_visible)
    }

    pub fn marker_mode(&self) -> MarkerMode {
        self.marker.mode()
    }

    pub fn is_armed(&self) -> bool {
        self.marker.is_armed()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.notices.push_back(Notice::new(message));
    }

    /// Decode an uploaded file, show it on the surface and persist it.
    ///
    /// A decode failure leaves the surface as it was and queues a notice.
    /// A storage failure is reported but the template stays on screen.
    ///
    /// # Errors
    /// The decode error, after it has been queued as a notice.
    pub fn upload(&mut self, file: &SelectedFile) -> Result<(), TemplateError> {
        let template = match TemplateImage::decode(file) {
            Ok(template) => template,
            Err(err) => {
                log::warn!("Could not decode '{}': {err}", file.name);
                self.notify(format!("Could not read the selected image: {err}"));
                return Err(err);
            }
        };
        log::info!(
            "Loaded template '{}' ({}x{})",
            template.name,
            template.width,
            template.height
        );

        if let Some(position) = self.position {
            // Records carry no link to each other, so the old position survives.
            log::warn!("Stored name position ({position}) was captured on a previous template");
        }

        let (data_url, width, height) = (template.data_url.clone(), template.width, template.height);
        self.template = Some(template);
        self.generation += 1;
        self.marker_visible = false;

        if let Err(err) = storage::save_template(self.store.as_mut(), &data_url, width, height) {
            log::error!("Failed to save template: {err}");
            self.notify(SAVE_TEMPLATE_FAILED);
        }
        Ok(())
    }

    /// Arm the single-shot position capture. Requires a visible template.
    ///
    /// # Errors
    /// [`PositionError::NoTemplate`] when nothing is loaded.
    pub fn arm_position(&mut self) -> Result<(), PositionError> {
        if let Err(err) = self.marker.arm(self.is_surface_visible()) {
            log::debug!("Refusing to arm position marker: {err}");
            self.notify(NO_TEMPLATE);
            return Err(err);
        }
        self.notify(ARM_INSTRUCTIONS);
        Ok(())
    }

    /// Handle a click on the surface whose top-left corner is at `surface_origin`.
    ///
    /// Only the first click after arming is captured.
    pub fn click_surface(&mut self, pointer: Pos2, surface_origin: Pos2) -> Option<NamePosition> {
        let position = self.marker.capture(pointer, surface_origin)?;

        if let Err(err) = storage::save_position(self.store.as_mut(), position) {
            log::error!("Failed to save name position: {err}");
            self.notify(SAVE_POSITION_FAILED);
        }
        self.position = Some(position);
        self.marker_visible = true;
        self.notify(format!("Name position set at {position}"));
        Some(position)
    }

    pub fn cycle_theme(&mut self) -> Theme {
        self.theme = self.theme.next();
        log::debug!("Theme switched to '{}'", self.theme.name());
        self.theme
    }

    /// Load the previously stored template and position, if any.
    ///
    /// Missing or unreadable records are skipped.
    pub fn restore(&mut self) {
        match storage::load_template(self.store.as_ref()) {
            Ok(Some(record)) => match TemplateImage::from_data_url(&record.data_url) {
                Ok(template) => {
                    if (template.width, template.height) != (record.width, record.height) {
                        log::warn!(
                            "Stored template is {}x{} but decodes to {}x{}",
                            record.width,
                            record.height,
                            template.width,
                            template.height
                        );
                    }
                    log::info!("Restored template saved at {}", record.timestamp);
                    self.template = Some(template);
                    self.generation += 1;
                }
                Err(err) => log::warn!("Ignoring stored template: {err}"),
            },
            Ok(None) => {}
            Err(err) => log::warn!("Could not read stored template: {err}"),
        }

        match storage::load_position(self.store.as_ref()) {
            Ok(Some(position)) => {
                self.position = Some(position);
                self.marker_visible = self.template.is_some();
            }
            Ok(None) => {}
            Err(err) => log::warn!("Could not read stored name position: {err}"),
        }
    }
}
