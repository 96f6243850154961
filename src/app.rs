use egui::{Color32, Pos2, Rect, Sense, TextureOptions};

use crate::file_picker;
use crate::position;
use crate::settings::{LogLevel, StudioSettings};
use crate::state::StudioState;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::theme::{self, ThemeSpin};

const PLACEHOLDER_TEXT: &str = "Upload a certificate template (SVG, PNG or JPG) to preview it here.";

pub struct CertificateApp {
    settings: StudioSettings,
    state: StudioState,

    texture: Option<egui::TextureHandle>,
    /// Template generation the texture was built from.
    texture_generation: u64,

    spin: ThemeSpin,
}

impl CertificateApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous settings (if any).
        // Note that you must enable the `persistence` feature for this to work.
        let settings: StudioSettings = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            Default::default()
        };
        settings.apply_log_level();

        let mut state = StudioState::new(open_store(&settings));
        if settings.restore_on_launch {
            state.restore();
        }

        // Every launch starts with the light theme.
        state.theme().apply(&cc.egui_ctx);

        Self {
            settings,
            state,
            texture: None,
            texture_generation: 0,
            spin: ThemeSpin::default(),
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture_generation == self.state.generation() {
            return;
        }
        self.texture_generation = self.state.generation();
        // Oversized templates are shown downscaled; the surface keeps its intrinsic size.
        let max_side = ctx.input(|i| i.max_texture_side);
        self.texture = self.state.template().map(|template| {
            ctx.load_texture(
                "certificate_template",
                template.display_image(max_side),
                TextureOptions::LINEAR,
            )
        });
    }

    fn poll_upload(&mut self) {
        if let Some(file) = file_picker::take_selected_template() {
            if let Err(e) = self.state.upload(&file) {
                log::debug!("Upload of '{}' rejected: {e}", file.name);
            }
        }
    }

    fn theme_button(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(egui::vec2(28.0, 28.0), Sense::click());
        let response = response.on_hover_text(format!("Theme: {}", self.state.theme().name()));
        if response.clicked() {
            self.state.cycle_theme().apply(ui.ctx());
            self.spin.start();
        }

        let visuals = ui.style().interact(&response);
        let text_color = visuals.text_color();
        ui.painter().rect_filled(rect, visuals.corner_radius, visuals.bg_fill);

        let galley = ui.painter().layout_no_wrap(
            self.state.theme().icon().to_owned(),
            egui::FontId::proportional(16.0),
            text_color,
        );
        // Rotate around the button center
        let angle = self.spin.angle();
        let pos = rect.center() - egui::emath::Rot2::from_angle(angle) * (galley.size() / 2.0);
        ui.painter()
            .add(egui::epaint::TextShape::new(pos, galley, text_color).with_angle(angle));

        if let Some(remaining) = self.spin.remaining() {
            ui.ctx().request_repaint_after(remaining);
        }
    }

    fn settings_menu(&mut self, ui: &mut egui::Ui) {
        egui::ComboBox::from_label("Log level")
            .selected_text(self.settings.log_level.name())
            .show_ui(ui, |ui| {
                for level in LogLevel::ALL {
                    if ui
                        .selectable_value(&mut self.settings.log_level, level, level.name())
                        .changed()
                    {
                        self.settings.apply_log_level();
                    }
                }
            });
        ui.checkbox(&mut self.settings.show_coordinates, "Show coordinates");
        ui.checkbox(&mut self.settings.restore_on_launch, "Restore template on launch");
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Upload template…").clicked() {
                file_picker::open_template_picker();
            }
            if ui.button("Set name position").clicked() {
                // Failure is already reported to the user as a notice.
                if let Err(e) = self.state.arm_position() {
                    log::debug!("{e}");
                }
            }
            if self.state.is_armed() {
                ui.label("Click on the template to place the name");
            }
        });

        if self.settings.show_coordinates {
            let readout = match self.state.position() {
                Some(position) => format!("Name position: {position}"),
                None => "Name position: not set".to_owned(),
            };
            ui.label(readout);
        }
    }

    /// The drawing surface: the template at its natural size plus the marker.
    fn surface(&mut self, ui: &mut egui::Ui) {
        let (Some(texture), Some([width, height])) = (&self.texture, self.state.surface_size()) else {
            ui.centered_and_justified(|ui| {
                ui.label(PLACEHOLDER_TEXT);
            });
            return;
        };
        let texture_id = texture.id();

        egui::ScrollArea::both().show(ui, |ui| {
            let size = egui::vec2(width as f32, height as f32);
            let (rect, response) = ui.allocate_exact_size(size, Sense::click());
            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            ui.painter().image(texture_id, rect, uv, Color32::WHITE);

            let armed = self.state.is_armed();
            let response = if armed {
                response.on_hover_cursor(egui::CursorIcon::Crosshair)
            } else {
                response
            };
            if response.clicked() {
                if let Some(pointer) = response.interact_pointer_pos() {
                    self.state.click_surface(pointer, rect.min);
                }
            }

            if let Some(position) = self.state.marker_position() {
                position::paint_marker(ui.painter(), rect.min, position);
            }
        });
    }

    fn notice_modal(&mut self, ctx: &egui::Context) {
        let Some(message) = self.state.current_notice().map(|n| n.message.clone()) else {
            return;
        };
        let mut dismissed = false;
        let modal = egui::Modal::new(egui::Id::new("notice")).show(ctx, |ui| {
            ui.set_max_width(360.0);
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
        if dismissed || modal.should_close() {
            self.state.dismiss_notice();
        }
    }
}

impl eframe::App for CertificateApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_upload();
        self.ensure_texture(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open template…").clicked() {
                        file_picker::open_template_picker();
                    }
                    // NOTE: no File->Quit on web pages!
                    if !cfg!(target_arch = "wasm32") && ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Settings", |ui| self.settings_menu(ui));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.theme_button(ui);
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(colors) = self.state.theme().gradient() {
                theme::paint_gradient(ui.painter(), ui.max_rect(), colors);
            }

            ui.heading("Certificate Template");
            ui.separator();
            self.controls(ui);
            ui.separator();
            self.surface(ui);
        });

        self.notice_modal(ctx);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_store(settings: &StudioSettings) -> Box<dyn KeyValueStore> {
    let dir = settings
        .storage_dir
        .as_ref()
        .map(std::path::PathBuf::from)
        .or_else(|| eframe::storage_dir(crate::APP_ID));
    match dir {
        Some(dir) => Box::new(crate::storage::FileStore::new(dir)),
        None => {
            log::warn!("No storage directory available; records will not survive a restart");
            Box::new(MemoryStore::new())
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn open_store(_settings: &StudioSettings) -> Box<dyn KeyValueStore> {
    match crate::storage::LocalStorage::new() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("{e}; records will not survive a reload");
            Box::new(MemoryStore::new())
        }
    }
}
