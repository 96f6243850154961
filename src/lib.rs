#![warn(clippy::all, rust_2018_idioms)]
//! Certificate template studio: upload a template image, mark where the
//! recipient's name goes and keep both in local storage.

mod app;
pub mod error;
mod file_picker;
pub mod position;
pub mod settings;
pub mod state;
pub mod storage;
pub mod template;
pub mod theme;

pub use app::CertificateApp;

/// Used for the window title and the native storage directory.
pub const APP_ID: &str = "certificate_studio";

#[cfg(not(target_arch = "wasm32"))]
impl CertificateApp {
    /// Run the app with the provided `NativeOptions`.
    ///
    /// # Errors
    /// Window or graphics context creation failures from eframe.
    pub fn run(options: eframe::NativeOptions) -> Result<(), eframe::Error> {
        eframe::run_native(
            APP_ID,
            options,
            Box::new(|cc| Ok(Box::new(CertificateApp::new(cc)))),
        )
    }
}
