//! Decoding of uploaded certificate templates.
//!
//! A template arrives as raw bytes plus the file name and declared MIME type.
//! SVG documents are rasterized with `resvg` at their intrinsic size, anything
//! else goes through the `image` crate. The uploaded bytes are kept as a data
//! URL so the template can be persisted and restored verbatim.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use egui::ColorImage;
use image::RgbaImage;

use crate::error::TemplateError;

pub const SVG_MIME: &str = "image/svg+xml";
const FALLBACK_MIME: &str = "application/octet-stream";

/// A file handed over by a picker, not yet decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    /// Declared MIME type; empty when the platform does not know it.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    ///
    /// # Errors
    /// [`TemplateError::Io`] if the file cannot be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn read(path: &std::path::Path) -> Result<Self, TemplateError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, String::new(), bytes))
    }

    /// The declared MIME type, or one guessed from the file name.
    pub fn effective_mime(&self) -> &str {
        if self.mime.is_empty() {
            guess_mime(&self.name)
        } else {
            self.mime.as_str()
        }
    }

    pub fn kind(&self) -> TemplateKind {
        TemplateKind::detect(&self.mime, &self.name)
    }
}

/// How a template is decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateKind {
    Svg,
    Raster,
}

impl TemplateKind {
    /// SVG if either the declared type or the file suffix says so; raster otherwise.
    pub fn detect(mime: &str, file_name: &str) -> Self {
        if mime == SVG_MIME || file_name.to_lowercase().ends_with(".svg") {
            Self::Svg
        } else {
            Self::Raster
        }
    }
}

fn guess_mime(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    let ext = lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match ext {
        "svg" => SVG_MIME,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => FALLBACK_MIME,
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a base64 data URL into its MIME type and decoded bytes.
///
/// # Errors
/// [`TemplateError::MalformedDataUrl`] for anything but `data:<mime>;base64,<payload>`,
/// [`TemplateError::Base64`] for a bad payload.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>), TemplateError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| TemplateError::MalformedDataUrl("missing 'data:' prefix".to_owned()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| TemplateError::MalformedDataUrl("missing ',' separator".to_owned()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| TemplateError::MalformedDataUrl("only base64 payloads are supported".to_owned()))?;
    let bytes = STANDARD.decode(payload)?;
    Ok((mime.to_owned(), bytes))
}

/// The decoded base image shown on the drawing surface.
#[derive(Clone)]
pub struct TemplateImage {
    pub name: String,
    pub kind: TemplateKind,
    pub width: u32,
    pub height: u32,
    pub pixels: RgbaImage,
    pub data_url: String,
}

impl std::fmt::Debug for TemplateImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateImage")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl TemplateImage {
    /// # Errors
    /// Fails when the bytes are not a decodable raster image or SVG document.
    pub fn decode(file: &SelectedFile) -> Result<Self, TemplateError> {
        let kind = file.kind();
        let pixels = match kind {
            TemplateKind::Svg => rasterize_svg(&file.bytes)?,
            TemplateKind::Raster => image::load_from_memory(&file.bytes)?.to_rgba8(),
        };
        let (width, height) = pixels.dimensions();
        log::debug!("Decoded {:?} template '{}': {}x{}", kind, file.name, width, height);
        Ok(Self {
            name: file.name.clone(),
            kind,
            width,
            height,
            pixels,
            data_url: encode_data_url(file.effective_mime(), &file.bytes),
        })
    }

    /// Rebuild a template from a persisted data URL.
    ///
    /// # Errors
    /// See [`decode_data_url`] and [`Self::decode`].
    pub fn from_data_url(data_url: &str) -> Result<Self, TemplateError> {
        let (mime, bytes) = decode_data_url(data_url)?;
        Self::decode(&SelectedFile::new("stored template", mime, bytes))
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(self.size(), self.pixels.as_raw())
    }

    /// Pixels for display, downscaled so neither side exceeds `max_side`.
    ///
    /// The surface keeps the intrinsic size; only the texture shrinks.
    pub fn display_image(&self, max_side: usize) -> ColorImage {
        let longest = self.width.max(self.height) as usize;
        if longest <= max_side {
            return self.to_color_image();
        }
        let scale = max_side as f64 / longest as f64;
        let width = ((f64::from(self.width) * scale).floor() as u32).clamp(1, max_side as u32);
        let height = ((f64::from(self.height) * scale).floor() as u32).clamp(1, max_side as u32);
        log::info!(
            "Template {}x{} exceeds the texture limit of {max_side}; displaying at {width}x{height}",
            self.width,
            self.height
        );
        let resized = image::imageops::resize(&self.pixels, width, height, image::imageops::FilterType::Triangle);
        ColorImage::from_rgba_unmultiplied([width as usize, height as usize], resized.as_raw())
    }
}

/// Rasterize an SVG document at 1:1 scale.
///
/// The intrinsic size is the document size rounded up to whole pixels.
fn rasterize_svg(svg_data: &[u8]) -> Result<RgbaImage, TemplateError> {
    let options = svg_options();
    let tree = resvg::usvg::Tree::from_data(svg_data, &options)?;
    let size = tree.size();
    let width = (size.width().ceil() as u32).max(1);
    let height = (size.height().ceil() as u32).max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(TemplateError::Rasterize { width, height })?;
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let mut rgba = RgbaImage::new(width, height);
    for (dst, src) in rgba.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(rgba)
}

#[cfg(not(target_arch = "wasm32"))]
fn svg_options() -> resvg::usvg::Options<'static> {
    let mut options = resvg::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    options
}

// No system fonts in the browser
#[cfg(target_arch = "wasm32")]
fn svg_options() -> resvg::usvg::Options<'static> {
    resvg::usvg::Options::default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    pub(crate) const SVG_120X80: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="80">
  <rect width="120" height="80" fill="#336699"/>
</svg>"##;

    #[test]
    fn test_detect_svg_by_mime_or_suffix() {
        assert_eq!(TemplateKind::detect("image/svg+xml", "cert"), TemplateKind::Svg);
        assert_eq!(TemplateKind::detect("", "Cert.SVG"), TemplateKind::Svg);
        assert_eq!(TemplateKind::detect("image/png", "cert.png"), TemplateKind::Raster);
        assert_eq!(TemplateKind::detect("", "cert"), TemplateKind::Raster);
    }

    #[test]
    fn test_effective_mime_falls_back_to_extension() {
        let file = SelectedFile::new("photo.JPEG", "", vec![]);
        assert_eq!(file.effective_mime(), "image/jpeg");

        let file = SelectedFile::new("photo.jpeg", "image/x-custom", vec![]);
        assert_eq!(file.effective_mime(), "image/x-custom");

        let file = SelectedFile::new("notes", "", vec![]);
        assert_eq!(file.effective_mime(), FALLBACK_MIME);
    }

    #[test]
    fn test_data_url_format() {
        let url = encode_data_url("image/png", b"abc");
        assert_eq!(url, "data:image/png;base64,YWJj");

        let (mime, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"abc");
    }

    #[test]
    fn test_decode_data_url_rejects_malformed() {
        assert!(matches!(
            decode_data_url("image/png;base64,YWJj"),
            Err(TemplateError::MalformedDataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(TemplateError::MalformedDataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,***"),
            Err(TemplateError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_raster_intrinsic_size() {
        let file = SelectedFile::new("cert.png", "image/png", png_bytes(64, 32));
        let template = TemplateImage::decode(&file).unwrap();
        assert_eq!(template.kind, TemplateKind::Raster);
        assert_eq!((template.width, template.height), (64, 32));
        assert!(template.data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_decode_svg_intrinsic_size() {
        let file = SelectedFile::new("cert.svg", "", SVG_120X80.as_bytes().to_vec());
        let template = TemplateImage::decode(&file).unwrap();
        assert_eq!(template.kind, TemplateKind::Svg);
        assert_eq!((template.width, template.height), (120, 80));
        assert_eq!(template.pixels.get_pixel(10, 10).0, [0x33, 0x66, 0x99, 255]);
        assert!(template.data_url.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_data_url_round_trip_is_pixel_identical() {
        let file = SelectedFile::new("cert.png", "image/png", png_bytes(40, 30));
        let original = TemplateImage::decode(&file).unwrap();
        let restored = TemplateImage::from_data_url(&original.data_url).unwrap();
        assert_eq!(restored.size(), original.size());
        assert_eq!(restored.pixels.as_raw(), original.pixels.as_raw());
    }

    #[test]
    fn test_display_image_fits_texture_limit() {
        let file = SelectedFile::new("wide.png", "image/png", png_bytes(17000, 8));
        let template = TemplateImage::decode(&file).unwrap();
        assert_eq!(template.size(), [17000, 8]);

        let display = template.display_image(16384);
        assert_eq!(display.size[0], 16384);
        assert!(display.size[1] >= 1 && display.size[1] <= 8);
        assert_eq!(display.pixels.len(), display.size[0] * display.size[1]);
    }

    #[test]
    fn test_display_image_untouched_within_limit() {
        let file = SelectedFile::new("cert.png", "image/png", png_bytes(64, 32));
        let template = TemplateImage::decode(&file).unwrap();
        assert_eq!(template.display_image(16384).size, [64, 32]);
        assert_eq!(template.display_image(32).size, [32, 16]);
    }

    #[test]
    fn test_decode_garbage_is_an_error() {
        let file = SelectedFile::new("broken.png", "image/png", b"not an image".to_vec());
        assert!(matches!(TemplateImage::decode(&file), Err(TemplateError::Raster(_))));

        let file = SelectedFile::new("broken.svg", SVG_MIME, b"<svg".to_vec());
        assert!(matches!(TemplateImage::decode(&file), Err(TemplateError::Svg(_))));
    }
}
