//! Fallback strategy: paint the card directly with tiny-skia.
//!
//! Shapes are painted natively and photos are decoded with the `image`
//! crate, so formats resvg refuses to embed still export. Text and glyph
//! runs are rasterized as transparent SVG overlays and composited in paint
//! order.

use card_core::element::{Color, Element, ElementKind};
use card_core::{RenderedCard, Scene};
use tiny_skia::{
    FillRule, FilterQuality, IntSize, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Rect,
    Stroke, Transform,
};

use crate::error::{RenderError, RenderResult};
use crate::export::{output_dimensions, rasterize_svg, svg_document};
use crate::image::{load_image_from_data_uri, TextureData};

use super::Rasterize;

/// Pixel density of the fallback export.
pub const COMPOSITOR_SCALE: f32 = 2.0;

/// Direct tiny-skia compositor.
pub struct RasterCompositor {
    scale: f32,
    background: [u8; 4],
}

impl RasterCompositor {
    /// Create a compositor at the default pixel density on the card background.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scale: COMPOSITOR_SCALE,
            background: [0x05, 0x05, 0x05, 255],
        }
    }

    fn paint_scene(&self, scene: &Scene) -> RenderResult<Pixmap> {
        let (out_w, out_h) = output_dimensions(scene, self.scale);
        let mut pixmap = Pixmap::new(out_w, out_h)
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;
        let [r, g, b, a] = self.background;
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

        let base = Transform::from_scale(self.scale, self.scale);
        let mut overlay_run: Vec<&Element> = Vec::new();

        for element in scene.paint_order() {
            if matches!(
                element.kind,
                ElementKind::Text { .. } | ElementKind::Glyph { .. }
            ) {
                overlay_run.push(element);
                continue;
            }
            self.flush_overlay(&mut pixmap, scene, &mut overlay_run)?;
            paint_element(&mut pixmap, base, element)?;
        }
        self.flush_overlay(&mut pixmap, scene, &mut overlay_run)?;

        Ok(pixmap)
    }

    /// Composite the pending text/glyph run over the pixmap.
    fn flush_overlay(
        &self,
        pixmap: &mut Pixmap,
        scene: &Scene,
        run: &mut Vec<&Element>,
    ) -> RenderResult<()> {
        if run.is_empty() {
            return Ok(());
        }
        let svg = svg_document(scene, self.scale, None, run);
        let overlay = rasterize_svg(&svg)?;
        pixmap.draw_pixmap(
            0,
            0,
            overlay.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        tracing::trace!(elements = run.len(), "composited text overlay");
        run.clear();
        Ok(())
    }
}

impl Default for RasterCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterize for RasterCompositor {
    fn name(&self) -> &'static str {
        "tiny-skia-compositor"
    }

    fn rasterize(&self, card: &RenderedCard) -> RenderResult<Vec<u8>> {
        tracing::debug!(
            elements = card.scene.element_count(),
            scale = self.scale,
            "compositing card directly"
        );
        let pixmap = self.paint_scene(&card.scene)?;
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }
}

/// Paint one non-text element.
fn paint_element(pixmap: &mut Pixmap, base: Transform, element: &Element) -> RenderResult<()> {
    let tf = &element.transform;
    let (cx, cy) = tf.center();
    let ts = if tf.rotation.abs() > f32::EPSILON {
        base.pre_concat(Transform::from_rotate_at(tf.rotation.to_degrees(), cx, cy))
    } else {
        base
    };

    match &element.kind {
        ElementKind::Rect { fill, opacity } => {
            if let Some(rect) = Rect::from_xywh(tf.x, tf.y, tf.width, tf.height) {
                pixmap.fill_rect(rect, &solid(*fill, *opacity), ts, None);
            }
        }

        ElementKind::Polygon {
            points,
            fill,
            opacity,
        } => {
            let mut pb = PathBuilder::new();
            for (i, [px, py]) in points.iter().enumerate() {
                if i == 0 {
                    pb.move_to(tf.x + px, tf.y + py);
                } else {
                    pb.line_to(tf.x + px, tf.y + py);
                }
            }
            pb.close();
            if let Some(path) = pb.finish() {
                pixmap.fill_path(&path, &solid(*fill, *opacity), FillRule::Winding, ts, None);
            }
        }

        ElementKind::Circle {
            fill,
            stroke,
            stroke_width,
            opacity,
        } => {
            let inset = if stroke.is_some() { stroke_width / 2.0 } else { 0.0 };
            let oval = Rect::from_xywh(
                tf.x + inset,
                tf.y + inset,
                (tf.width - 2.0 * inset).max(0.0),
                (tf.height - 2.0 * inset).max(0.0),
            )
            .and_then(PathBuilder::from_oval);
            let Some(path) = oval else {
                return Ok(());
            };
            if let Some(fill) = fill {
                pixmap.fill_path(&path, &solid(*fill, *opacity), FillRule::Winding, ts, None);
            }
            if let Some(stroke) = stroke {
                let pen = Stroke {
                    width: *stroke_width,
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &solid(*stroke, *opacity), &pen, ts, None);
            }
        }

        ElementKind::Photo { src, scale } => {
            let texture = load_image_from_data_uri(src)?;
            paint_photo(pixmap, ts, element, &texture, *scale)?;
        }

        ElementKind::Text { .. } | ElementKind::Glyph { .. } | ElementKind::Group { .. } => {}
    }

    Ok(())
}

/// Cover-fit the photo into its box, zoom about the centre, clip to a circle.
#[allow(clippy::cast_precision_loss)]
fn paint_photo(
    pixmap: &mut Pixmap,
    ts: Transform,
    element: &Element,
    texture: &TextureData,
    zoom: f32,
) -> RenderResult<()> {
    let tf = &element.transform;
    let (cx, cy) = tf.center();
    let image = texture_to_pixmap(texture)?;

    let (iw, ih) = (texture.width as f32, texture.height as f32);
    let cover = (tf.width / iw).max(tf.height / ih);
    let k = cover * zoom;
    let image_ts = ts.pre_concat(Transform::from_row(
        k,
        0.0,
        0.0,
        k,
        cx - iw * k / 2.0,
        cy - ih * k / 2.0,
    ));

    let r = tf.width.min(tf.height) / 2.0;
    let clip = PathBuilder::from_circle(cx, cy, r)
        .ok_or_else(|| RenderError::Export("Photo frame has no area".to_string()))?;
    let mut mask = Mask::new(pixmap.width(), pixmap.height())
        .ok_or_else(|| RenderError::Export("Failed to create clip mask".to_string()))?;
    mask.fill_path(&clip, FillRule::Winding, true, ts);

    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, image_ts, Some(&mask));
    Ok(())
}

/// Convert straight-alpha RGBA into a premultiplied pixmap.
fn texture_to_pixmap(texture: &TextureData) -> RenderResult<Pixmap> {
    let size = IntSize::from_wh(texture.width, texture.height)
        .ok_or_else(|| RenderError::Resource("Photo has no pixels".to_string()))?;
    let mut data = texture.data.clone();
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            // Rounded c * a / 255, always <= 255.
            *c = u8::try_from((u16::from(*c) * a + 127) / 255).unwrap_or(u8::MAX);
        }
    }
    Pixmap::from_vec(data, size)
        .ok_or_else(|| RenderError::Resource("Photo pixel buffer size mismatch".to_string()))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn solid(color: Color, opacity: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    paint.set_color_rgba8(color.r, color.g, color.b, alpha);
    paint.anti_alias = true;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_core::{render, CardData, Theme, UserInfo, FALLBACK_WISH};

    fn bmp_data_uri() -> String {
        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([200, 40, 40, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Bmp)
            .expect("encode bmp");
        crate::image::encode_data_uri(bytes.get_ref())
    }

    #[test]
    fn test_composites_card_at_double_density() {
        let card = CardData::new(UserInfo::new("Ana"), FALLBACK_WISH, Theme::Gold).expect("card");
        let png = RasterCompositor::new()
            .rasterize(&render(&card))
            .expect("png");

        let img = image::load_from_memory(&png).expect("decode").to_rgba8();
        assert_eq!(img.dimensions(), (800, 1000));
    }

    #[test]
    fn test_paints_bitmap_photo() {
        let mut user = UserInfo::new("Ana");
        user.user_image = Some(bmp_data_uri());
        let card = CardData::new(user, FALLBACK_WISH, Theme::Gold).expect("card");
        let rendered = render(&card);

        let png = RasterCompositor::new().rasterize(&rendered).expect("png");
        let img = image::load_from_memory(&png).expect("decode").to_rgba8();

        let photo = rendered
            .scene
            .get_element(card_core::ElementId::named("headshot-photo"))
            .expect("photo element");
        let (cx, cy) = photo.transform.center();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pixel = img.get_pixel((cx * 2.0) as u32, (cy * 2.0) as u32);
        assert!(pixel.0[0].abs_diff(200) <= 4, "red {}", pixel.0[0]);
        assert!(pixel.0[1].abs_diff(40) <= 4, "green {}", pixel.0[1]);
    }

    #[test]
    fn test_premultiplies_alpha() {
        let texture = TextureData {
            width: 1,
            height: 1,
            data: vec![255, 128, 0, 128],
        };
        let pixmap = texture_to_pixmap(&texture).expect("pixmap");
        let px = pixmap.pixel(0, 0).expect("pixel");
        assert_eq!(px.red(), 128);
        assert_eq!(px.green(), 64);
        assert_eq!(px.alpha(), 128);
    }
}
