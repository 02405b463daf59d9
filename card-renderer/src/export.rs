//! Scene export to image/document formats.
//!
//! Renders a card [`Scene`] to PNG or a print-ready PDF using an SVG
//! intermediate representation and the resvg/tiny-skia rasterization pipeline.

use std::fmt::Write;
use std::sync::{Arc, OnceLock};

use card_core::element::{Element, ElementKind};
use card_core::Scene;

use crate::error::{RenderError, RenderResult};
use crate::image::{decode_data_uri, ImageFormat};

/// Font stack used for every text element.
const FONT_FAMILY: &str = "Montserrat, Arial, Helvetica, sans-serif";

/// Configuration for scene export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// DPI for print export (default: 96.0).
    pub dpi: f32,
    /// Background color as RGBA bytes.
    pub background: [u8; 4],
    /// Pixel density multiplier (e.g. 3.0 for high-resolution output).
    pub scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dpi: 96.0,
            background: [0x05, 0x05, 0x05, 255],
            scale: 1.0,
        }
    }
}

/// Exports a [`Scene`] to various image and document formats.
pub struct SceneExporter {
    config: ExportConfig,
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The exporter's configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export the scene to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(&self, scene: &Scene) -> RenderResult<Vec<u8>> {
        let svg_string = self.render_to_svg(scene)?;
        let pixmap = rasterize_svg(&svg_string)?;

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export the scene to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns an error if scene elements cannot be represented as SVG.
    pub fn render_to_svg(&self, scene: &Scene) -> RenderResult<String> {
        let elements = scene.paint_order();
        Ok(svg_document(
            scene,
            self.config.scale,
            Some(self.config.background),
            &elements,
        ))
    }

    /// Export the scene to PDF bytes.
    ///
    /// Renders the scene as a raster image and embeds it in a PDF page sized
    /// to the card at the configured DPI.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or PDF generation fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn render_to_pdf(&self, scene: &Scene) -> RenderResult<Vec<u8>> {
        let png_data = self.render_to_png(scene)?;
        let (out_w, out_h) = output_dimensions(scene, self.config.scale);

        // Page size follows the unscaled card: pixels / dpi * 25.4
        let page_width_mm = scene.viewport_width / self.config.dpi * 25.4;
        let page_height_mm = scene.viewport_height / self.config.dpi * 25.4;

        let (doc, page1, layer1) = printpdf::PdfDocument::new(
            "Wishcard",
            printpdf::Mm(page_width_mm),
            printpdf::Mm(page_height_mm),
            "Card",
        );

        let current_layer = doc.get_page(page1).get_layer(layer1);

        // Decode PNG using printpdf's bundled image crate for compatibility
        let dynamic_image = printpdf::image_crate::load_from_memory(&png_data)
            .map_err(|e| RenderError::Export(format!("Failed to decode PNG for PDF: {e}")))?;

        let pdf_image = printpdf::Image::from_dynamic_image(&dynamic_image);

        // printpdf places images at 300 DPI unless told otherwise; pin the
        // image DPI so the raster fills the page exactly.
        let image_dpi = out_w as f32 / page_width_mm * 25.4;
        let transform = printpdf::ImageTransform {
            translate_x: Some(printpdf::Mm(0.0)),
            translate_y: Some(printpdf::Mm(0.0)),
            dpi: Some(image_dpi),
            ..Default::default()
        };

        tracing::debug!(out_w, out_h, image_dpi, "embedding card in PDF page");
        pdf_image.add_to_layer(current_layer, transform);

        doc.save_to_bytes()
            .map_err(|e| RenderError::Export(format!("PDF save failed: {e}")))
    }
}

/// Output dimensions (width, height) in pixels for a pixel density.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn output_dimensions(scene: &Scene, scale: f32) -> (u32, u32) {
    let out_w = (scene.viewport_width.max(1.0) * scale).round() as u32;
    let out_h = (scene.viewport_height.max(1.0) * scale).round() as u32;
    (out_w.max(1), out_h.max(1))
}

/// Build an SVG document for `elements` at the given pixel density.
///
/// `background` of `None` leaves the canvas transparent.
pub(crate) fn svg_document(
    scene: &Scene,
    scale: f32,
    background: Option<[u8; 4]>,
    elements: &[&Element],
) -> String {
    let (out_w, out_h) = output_dimensions(scene, scale);
    let view_w = scene.viewport_width.max(1.0);
    let view_h = scene.viewport_height.max(1.0);

    let mut svg = String::with_capacity(8192);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
    );

    if let Some(bg) = background {
        let bg_alpha = f32::from(bg[3]) / 255.0;
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"rgba({},{},{},{})\"/>",
            bg[0], bg[1], bg[2], bg_alpha,
        );
    }

    for element in elements {
        render_element_svg(&mut svg, element);
    }

    svg.push_str("</svg>");
    svg
}

/// Check that resvg can decode every embedded photo in the scene.
///
/// resvg silently drops images it cannot decode, which would export a card
/// without its photo.
///
/// # Errors
///
/// Returns [`RenderError::UnsupportedImage`] for photos in other formats.
pub(crate) fn ensure_embeddable_photos(scene: &Scene) -> RenderResult<()> {
    for element in scene.paint_order() {
        if let ElementKind::Photo { src, .. } = &element.kind {
            let bytes = decode_data_uri(src)?;
            match ImageFormat::from_magic_bytes(&bytes) {
                ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Gif => {}
                other => {
                    return Err(RenderError::UnsupportedImage(format!(
                        "{other:?} photos cannot be embedded in SVG"
                    )))
                }
            }
        }
    }
    Ok(())
}

/// Shared font database, loaded from the system once.
fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

/// Rasterize an SVG string to a tiny-skia Pixmap.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn rasterize_svg(svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
    let opt = usvg::Options {
        fontdb: font_database(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg_string, &opt)
        .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

    let px_w = tree.size().width().round() as u32;
    let px_h = tree.size().height().round() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
        .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    Ok(pixmap)
}

/// Render a single element to SVG.
fn render_element_svg(svg: &mut String, element: &Element) {
    let tf = &element.transform;
    let (cx, cy) = tf.center();
    let rotated = tf.rotation.abs() > f32::EPSILON;
    if rotated {
        let _ = write!(
            svg,
            "<g transform=\"rotate({} {cx} {cy})\">",
            tf.rotation.to_degrees()
        );
    }

    match &element.kind {
        ElementKind::Rect { fill, opacity } => {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" fill-opacity=\"{opacity}\"/>",
                tf.x,
                tf.y,
                tf.width,
                tf.height,
                fill.to_hex(),
            );
        }

        ElementKind::Polygon {
            points,
            fill,
            opacity,
        } => {
            let mut coords = String::with_capacity(points.len() * 16);
            for [px, py] in points {
                let _ = write!(coords, "{},{} ", tf.x + px, tf.y + py);
            }
            let _ = write!(
                svg,
                "<polygon points=\"{}\" fill=\"{}\" fill-opacity=\"{opacity}\"/>",
                coords.trim_end(),
                fill.to_hex(),
            );
        }

        ElementKind::Circle {
            fill,
            stroke,
            stroke_width,
            opacity,
        } => {
            let inset = if stroke.is_some() { stroke_width / 2.0 } else { 0.0 };
            let rx = (tf.width / 2.0 - inset).max(0.0);
            let ry = (tf.height / 2.0 - inset).max(0.0);
            let fill = fill.map_or_else(|| "none".to_string(), |c| c.to_hex());
            let _ = write!(
                svg,
                "<ellipse cx=\"{cx}\" cy=\"{cy}\" rx=\"{rx}\" ry=\"{ry}\" fill=\"{fill}\" opacity=\"{opacity}\"",
            );
            if let Some(stroke) = stroke {
                let _ = write!(
                    svg,
                    " stroke=\"{}\" stroke-width=\"{stroke_width}\"",
                    stroke.to_hex()
                );
            }
            svg.push_str("/>");
        }

        ElementKind::Text {
            content,
            font_size,
            color,
            weight,
            italic,
            anchor,
            letter_spacing,
            opacity,
        } => {
            let escaped = escape_xml(content);
            let text_x = anchor.anchor_x(tf.x, tf.width);
            let text_y = tf.y + font_size;
            let style = if *italic { "italic" } else { "normal" };
            let _ = write!(
                svg,
                "<text x=\"{text_x}\" y=\"{text_y}\" font-size=\"{font_size}\" font-weight=\"{weight}\" font-style=\"{style}\" letter-spacing=\"{letter_spacing}\" text-anchor=\"{}\" fill=\"{}\" fill-opacity=\"{opacity}\" font-family=\"{FONT_FAMILY}\">{escaped}</text>",
                anchor.as_svg(),
                color.to_hex(),
            );
        }

        ElementKind::Photo { src, scale } => {
            let clip_id = format!("clip-{}", element.id);
            let r = tf.width.min(tf.height) / 2.0;
            let escaped_src = escape_xml(src);
            let _ = write!(
                svg,
                "<clipPath id=\"{clip_id}\"><circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\"/></clipPath>\
                 <g clip-path=\"url(#{clip_id})\">\
                 <image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid slice\" \
                 transform=\"translate({cx} {cy}) scale({scale}) translate({} {})\" xlink:href=\"{escaped_src}\"/></g>",
                tf.x,
                tf.y,
                tf.width,
                tf.height,
                -cx,
                -cy,
            );
        }

        ElementKind::Glyph {
            glyph,
            color,
            opacity,
        } => {
            let k = tf.width.min(tf.height) / glyph.view_box();
            let rule = if glyph.even_odd() { "evenodd" } else { "nonzero" };
            let _ = write!(
                svg,
                "<path d=\"{}\" fill=\"{}\" fill-opacity=\"{opacity}\" fill-rule=\"{rule}\" transform=\"translate({} {}) scale({k})\"/>",
                glyph.path_data(),
                color.to_hex(),
                tf.x,
                tf.y,
            );
        }

        ElementKind::Group { .. } => {}
    }

    if rotated {
        svg.push_str("</g>");
    }
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
