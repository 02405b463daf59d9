//! Card layout: turns a [`CardData`] snapshot into a [`Scene`].
//!
//! Layout is a pure function of the card. Sparkle positions come from a
//! fixed-seed generator so two renders of the same card are identical.

use std::f32::consts::PI;

use crate::element::{Color, Element, ElementId, ElementKind, Glyph, TextAnchor, Transform};
use crate::{CardData, Scene, AGENCY_LABEL, CAMPAIGN_YEAR, SITE_LABEL};

/// Card width in CSS pixels.
pub const CARD_WIDTH: f32 = 400.0;
/// Card height in CSS pixels (4:5 aspect).
pub const CARD_HEIGHT: f32 = 500.0;
/// Stable name of the card's root element.
pub const ROOT_HANDLE: &str = "final-card";

/// Page background.
pub const BACKGROUND: Color = Color::rgb(0x05, 0x05, 0x05);
/// Agency green.
pub const ACCENT: Color = Color::rgb(0x27, 0xae, 0x60);
const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
const WISH_TEXT: Color = Color::rgb(0xe4, 0xe4, 0xe7);
const FRAME_FILL: Color = Color::rgb(0x18, 0x18, 0x1b);
const PLACEHOLDER: Color = Color::rgb(0x27, 0x27, 0x2a);

const SPARKLE_COUNT: usize = 15;
const SPARKLE_SEED: u32 = 2026;
/// Four-pointed star in a 24-unit box.
const SPARKLE_STAR: [[f32; 2]; 8] = [
    [12.0, 0.0],
    [14.59, 9.41],
    [24.0, 12.0],
    [14.59, 14.59],
    [12.0, 24.0],
    [9.41, 14.59],
    [0.0, 12.0],
    [9.41, 9.41],
];
const TEXT_BOX_WIDTH: f32 = CARD_WIDTH - 80.0;
const WISH_FONT_SIZE: f32 = 13.0;
const WISH_BOX_HEIGHT: f32 = 120.0;
const WISH_ADVANCE: f32 = 0.55;
const WISH_LEADING: f32 = 1.5;
const NAME_FONT_SIZE: f32 = 26.0;
const NAME_BOX_HEIGHT: f32 = 40.0;
const NAME_ADVANCE: f32 = 0.72;
const NAME_LEADING: f32 = 1.25;
const HEADSHOT_DIAMETER: f32 = 120.0;
const HEADSHOT_INSET: f32 = 10.0;

// Layers, back to front.
const Z_BACKDROP: i32 = 0;
const Z_DECOR: i32 = 1;
const Z_CONTENT: i32 = 2;
const Z_PHOTO: i32 = 3;
const Z_BADGE: i32 = 4;

/// Explicit handle to the root element of a rendered card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardHandle(ElementId);

impl CardHandle {
    /// The handle every rendered card's root carries.
    #[must_use]
    pub fn root() -> Self {
        Self(ElementId::named(ROOT_HANDLE))
    }

    /// ID of the root element.
    #[must_use]
    pub fn id(self) -> ElementId {
        self.0
    }
}

/// A laid-out card ready for rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCard {
    /// Scene holding every element of the card.
    pub scene: Scene,
    /// Handle to the root group.
    pub root: CardHandle,
}

impl RenderedCard {
    /// Look up the root element; `None` when the scene lost it.
    #[must_use]
    pub fn root_element(&self) -> Option<&Element> {
        self.scene.get_element(self.root.id())
    }
}

/// Lay out a card.
#[must_use]
pub fn render(card: &CardData) -> RenderedCard {
    let mut layout = Layout::default();

    layout.backdrop();
    layout.sparkles();
    layout.accents();
    layout.header();
    let wish_bottom = layout.wish(card.wish());
    let headshot_bottom = layout.headshot(card, wish_bottom + 14.0);
    layout.identity(&card.user_info().name, headshot_bottom + 10.0);
    layout.footer();

    let root = CardHandle::root();
    let mut scene = Scene::new(CARD_WIDTH, CARD_HEIGHT);
    let children: Vec<ElementId> = layout.elements.iter().map(|e| e.id).collect();
    scene.add_element(
        Element::named(ROOT_HANDLE, ElementKind::Group { children })
            .with_transform(Transform::rect(0.0, 0.0, CARD_WIDTH, CARD_HEIGHT, Z_BACKDROP)),
    );
    for element in layout.elements {
        scene.add_element(element.with_parent(root.id()));
    }

    tracing::trace!(
        elements = scene.element_count(),
        photo = card.user_info().has_photo(),
        "card laid out"
    );

    RenderedCard { scene, root }
}

#[derive(Default)]
struct Layout {
    elements: Vec<Element>,
}

impl Layout {
    fn push(&mut self, name: &str, kind: ElementKind, transform: Transform) {
        self.elements
            .push(Element::named(name, kind).with_transform(transform));
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        name: &str,
        content: String,
        font_size: f32,
        color: Color,
        weight: u16,
        italic: bool,
        letter_spacing: f32,
        opacity: f32,
        y: f32,
    ) {
        self.push(
            name,
            ElementKind::Text {
                content,
                font_size,
                color,
                weight,
                italic,
                anchor: TextAnchor::Middle,
                letter_spacing,
                opacity,
            },
            Transform::rect(40.0, y, CARD_WIDTH - 80.0, font_size * 1.25, Z_CONTENT),
        );
    }

    fn backdrop(&mut self) {
        self.push(
            "backdrop",
            ElementKind::Rect {
                fill: BACKGROUND,
                opacity: 1.0,
            },
            Transform::rect(0.0, 0.0, CARD_WIDTH, CARD_HEIGHT, Z_BACKDROP),
        );
        self.push(
            "backdrop-glow",
            ElementKind::Circle {
                fill: Some(ACCENT),
                stroke: None,
                stroke_width: 0.0,
                opacity: 0.03,
            },
            Transform::rect(-50.0, 0.0, CARD_WIDTH + 100.0, CARD_HEIGHT, Z_BACKDROP),
        );

        // Bottom-right geometric pattern, drawn in a 200-unit box scaled to 256px.
        let size = 256.0;
        let unit = size / 200.0;
        for (idx, (reach, opacity)) in [(60.0, 0.8), (100.0, 0.4), (140.0, 0.16)]
            .into_iter()
            .enumerate()
        {
            let inset = (200.0 - reach) * unit;
            self.push(
                &format!("corner-{idx}"),
                ElementKind::Polygon {
                    points: vec![[size, inset], [size, size], [inset, size]],
                    fill: ACCENT,
                    opacity,
                },
                Transform::rect(CARD_WIDTH - size, CARD_HEIGHT - size, size, size, Z_BACKDROP),
            );
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn sparkles(&mut self) {
        let mut rng = Lcg(SPARKLE_SEED);
        for idx in 0..SPARKLE_COUNT {
            let top = rng.next_unit() * CARD_HEIGHT;
            let left = rng.next_unit() * CARD_WIDTH;
            let size = rng.next_unit().mul_add(12.0, 4.0);
            let fill = if idx % 3 == 0 { ACCENT } else { WHITE };
            let k = size / 24.0;
            let points = SPARKLE_STAR.iter().map(|[x, y]| [x * k, y * k]).collect();
            self.push(
                &format!("sparkle-{idx}"),
                ElementKind::Polygon {
                    points,
                    fill,
                    opacity: 0.6,
                },
                Transform::rect(left, top, size, size, Z_DECOR),
            );
        }
    }

    fn accents(&mut self) {
        self.push(
            "accent-top-left",
            ElementKind::Polygon {
                points: vec![[0.0, 0.0], [128.0, 0.0], [0.0, 128.0]],
                fill: ACCENT,
                opacity: 1.0,
            },
            Transform::rect(0.0, 0.0, 128.0, 128.0, Z_DECOR),
        );
    }

    fn header(&mut self) {
        self.push(
            "agency-label",
            ElementKind::Text {
                content: AGENCY_LABEL.to_string(),
                font_size: 10.0,
                color: ACCENT,
                weight: 900,
                italic: true,
                anchor: TextAnchor::End,
                letter_spacing: 2.0,
                opacity: 1.0,
            },
            Transform::rect(40.0, 40.0, CARD_WIDTH - 80.0, 12.5, Z_CONTENT),
        );
        self.text("title-happy", "HAPPY".into(), 20.0, ACCENT, 900, false, 8.0, 1.0, 70.0);
        self.text("title-new-year", "NEW YEAR".into(), 36.0, WHITE, 900, false, -1.0, 1.0, 94.0);
    }

    /// Lays out the wish between quote marks; returns the bottom edge.
    ///
    /// The font shrinks until the whole wish fits six lines of the default size.
    #[allow(clippy::cast_precision_loss)]
    fn wish(&mut self, wish: &str) -> f32 {
        let top = 146.0;
        let block = fit_text(
            wish,
            TEXT_BOX_WIDTH,
            WISH_BOX_HEIGHT,
            WISH_FONT_SIZE,
            WISH_ADVANCE,
            WISH_LEADING,
        );
        for (idx, line) in block.lines.iter().enumerate() {
            self.text(
                &format!("wish-line-{idx}"),
                line.clone(),
                block.font_size,
                WISH_TEXT,
                600,
                true,
                0.0,
                1.0,
                (idx as f32).mul_add(block.line_height, top),
            );
        }
        let bottom = (block.lines.len() as f32).mul_add(block.line_height, top);

        let quote = ElementKind::Glyph {
            glyph: Glyph::Quote,
            color: ACCENT,
            opacity: 0.4,
        };
        self.push(
            "wish-quote-open",
            quote.clone(),
            Transform::rect(44.0, top - 14.0, 20.0, 20.0, Z_DECOR),
        );
        self.push(
            "wish-quote-close",
            quote,
            Transform {
                rotation: PI,
                ..Transform::rect(CARD_WIDTH - 64.0, bottom - 6.0, 20.0, 20.0, Z_DECOR)
            },
        );
        bottom
    }

    /// Lays out the divider, frame, photo or placeholder and badge; returns the bottom edge.
    fn headshot(&mut self, card: &CardData, divider_y: f32) -> f32 {
        let info = card.user_info();
        self.push(
            "divider",
            ElementKind::Rect {
                fill: ACCENT,
                opacity: 0.4,
            },
            Transform::rect(CARD_WIDTH / 2.0 - 24.0, divider_y, 48.0, 2.0, Z_CONTENT),
        );

        let top = divider_y + 16.0;
        let left = (CARD_WIDTH - HEADSHOT_DIAMETER) / 2.0;
        self.push(
            "headshot-glow",
            ElementKind::Circle {
                fill: Some(ACCENT),
                stroke: None,
                stroke_width: 0.0,
                opacity: 0.1,
            },
            Transform::rect(
                left - 24.0,
                top - 24.0,
                HEADSHOT_DIAMETER + 48.0,
                HEADSHOT_DIAMETER + 48.0,
                Z_DECOR,
            ),
        );
        self.push(
            "headshot-frame",
            ElementKind::Circle {
                fill: Some(FRAME_FILL),
                stroke: Some(ACCENT),
                stroke_width: 6.0,
                opacity: 1.0,
            },
            Transform::rect(left, top, HEADSHOT_DIAMETER, HEADSHOT_DIAMETER, Z_CONTENT),
        );

        let inner = HEADSHOT_DIAMETER - HEADSHOT_INSET * 2.0;
        match info.user_image.as_deref().filter(|src| !src.is_empty()) {
            Some(src) => self.push(
                "headshot-photo",
                ElementKind::Photo {
                    src: src.to_string(),
                    scale: info.image_scale.get(),
                },
                Transform::rect(left + HEADSHOT_INSET, top + HEADSHOT_INSET, inner, inner, Z_PHOTO),
            ),
            None => {
                let glyph = 64.0;
                self.push(
                    "headshot-placeholder",
                    ElementKind::Glyph {
                        glyph: Glyph::Person,
                        color: PLACEHOLDER,
                        opacity: 1.0,
                    },
                    Transform::rect(
                        (CARD_WIDTH - glyph) / 2.0,
                        top + (HEADSHOT_DIAMETER - glyph) / 2.0,
                        glyph,
                        glyph,
                        Z_PHOTO,
                    ),
                );
            }
        }

        let bottom = top + HEADSHOT_DIAMETER;
        let badge_x = left + HEADSHOT_DIAMETER - 48.0;
        let badge_y = bottom - 20.0;
        self.push(
            "year-badge",
            ElementKind::Rect {
                fill: WHITE,
                opacity: 1.0,
            },
            Transform::rect(badge_x, badge_y, 56.0, 20.0, Z_BADGE),
        );
        self.push(
            "year-badge-label",
            ElementKind::Text {
                content: CAMPAIGN_YEAR.to_string(),
                font_size: 10.0,
                color: BLACK,
                weight: 900,
                italic: true,
                anchor: TextAnchor::Middle,
                letter_spacing: 0.0,
                opacity: 1.0,
            },
            Transform::rect(badge_x, badge_y + 2.0, 56.0, 12.5, Z_BADGE),
        );
        bottom
    }

    /// Long names scale down, then wrap; the first line is `user-name`.
    #[allow(clippy::cast_precision_loss)]
    fn identity(&mut self, name: &str, y: f32) {
        let block = fit_text(
            &name.to_uppercase(),
            TEXT_BOX_WIDTH,
            NAME_BOX_HEIGHT,
            NAME_FONT_SIZE,
            NAME_ADVANCE,
            NAME_LEADING,
        );
        for (idx, line) in block.lines.iter().enumerate() {
            let element = if idx == 0 {
                "user-name".to_string()
            } else {
                format!("user-name-{idx}")
            };
            self.text(
                &element,
                line.clone(),
                block.font_size,
                WHITE,
                900,
                false,
                -0.5,
                1.0,
                (idx as f32).mul_add(block.line_height, y),
            );
        }
    }

    fn footer(&mut self) {
        let y = CARD_HEIGHT - 28.0;
        self.text("site-label", SITE_LABEL.to_string(), 9.0, WHITE, 900, false, 5.4, 0.4, y);
        for (name, x) in [("footer-rule-left", 40.0), ("footer-rule-right", CARD_WIDTH - 130.0)] {
            self.push(
                name,
                ElementKind::Rect {
                    fill: WHITE,
                    opacity: 0.08,
                },
                Transform::rect(x, y + 6.0, 90.0, 1.0, Z_CONTENT),
            );
        }
    }
}

/// Wrapped text and the size it was fitted at.
struct TextBlock {
    font_size: f32,
    line_height: f32,
    lines: Vec<String>,
}

/// Wrap `text` at the largest size, starting from `max_size`, whose lines fit
/// a `width` by `height` box. `advance` is the average glyph width and
/// `leading` the line pitch, both in em.
///
/// Terminates: each step down fits more characters per line and more lines.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn fit_text(
    text: &str,
    width: f32,
    height: f32,
    max_size: f32,
    advance: f32,
    leading: f32,
) -> TextBlock {
    let mut font_size = max_size;
    loop {
        let chars_per_line = ((width / (font_size * advance)).floor() as usize).max(1);
        let max_lines = ((height / (font_size * leading)).floor() as usize).max(1);
        let lines = wrap_words(text, chars_per_line);
        if lines.len() <= max_lines {
            return TextBlock {
                font_size,
                line_height: font_size * leading,
                lines,
            };
        }
        font_size *= 0.9;
    }
}

/// Greedy word wrap by character count. Words longer than a line are split.
fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(max_chars) {
            if current_len > 0 && current_len + 1 + piece.len() > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece);
            current_len += piece.len();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Fixed-seed linear congruential generator for sparkle placement.
struct Lcg(u32);

impl Lcg {
    #[allow(clippy::cast_precision_loss)]
    fn next_unit(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.0 >> 8) as f32 / (1u32 << 24) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImageScale, Theme, UserInfo, FALLBACK_WISH};

    fn card(info: UserInfo) -> CardData {
        CardData::new(info, FALLBACK_WISH, Theme::Gold).expect("card")
    }

    fn texts(rendered: &RenderedCard) -> Vec<String> {
        rendered
            .scene
            .elements()
            .filter_map(|e| match &e.kind {
                ElementKind::Text { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_render_is_deterministic() {
        let data = card(UserInfo::new("Wali Ullah Shuvo"));
        assert_eq!(render(&data), render(&data));
    }

    #[test]
    fn test_root_handle_resolves() {
        let rendered = render(&card(UserInfo::new("Ana")));
        let root = rendered.root_element().expect("root present");
        assert!(root.is_group());
        assert_eq!(rendered.root, CardHandle::root());
    }

    #[test]
    fn test_name_and_wish_are_placed() {
        let rendered = render(&card(UserInfo::new("Ana")));
        let texts = texts(&rendered);
        assert!(texts.contains(&"ANA".to_string()));
        assert!(texts.contains(&AGENCY_LABEL.to_string()));
        let wish: Vec<_> = texts
            .iter()
            .filter(|t| t.starts_with("Wishing") || t.contains("Happy New Year!"))
            .collect();
        assert!(!wish.is_empty());
    }

    #[test]
    fn test_placeholder_without_photo() {
        let rendered = render(&card(UserInfo::new("Ana")));
        let placeholder = rendered
            .scene
            .get_element(ElementId::named("headshot-placeholder"))
            .expect("placeholder");
        assert!(matches!(
            placeholder.kind,
            ElementKind::Glyph {
                glyph: Glyph::Person,
                ..
            }
        ));
        assert!(rendered
            .scene
            .get_element(ElementId::named("headshot-photo"))
            .is_none());
    }

    #[test]
    fn test_photo_carries_scale() {
        let info = UserInfo {
            name: "Ana".to_string(),
            user_image: Some("data:image/png;base64,AAAA".to_string()),
            image_scale: ImageScale::new(2.5).expect("scale"),
        };
        let rendered = render(&card(info));
        let photo = rendered
            .scene
            .get_element(ElementId::named("headshot-photo"))
            .expect("photo");
        match &photo.kind {
            ElementKind::Photo { scale, .. } => assert!((scale - 2.5).abs() < f32::EPSILON),
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(rendered
            .scene
            .get_element(ElementId::named("headshot-placeholder"))
            .is_none());
    }

    #[test]
    fn test_empty_photo_string_uses_placeholder() {
        let info = UserInfo {
            user_image: Some(String::new()),
            ..UserInfo::new("Ana")
        };
        let rendered = render(&card(info));
        assert!(rendered
            .scene
            .get_element(ElementId::named("headshot-placeholder"))
            .is_some());
    }

    #[test]
    fn test_wrap_words() {
        let lines = wrap_words("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_wrap_words_splits_long_tokens() {
        let lines = wrap_words("ab cdefghij k", 4);
        assert_eq!(lines, vec!["ab", "cdef", "ghij", "k"]);
    }

    #[test]
    fn test_fit_text_keeps_default_size_when_it_fits() {
        let block = fit_text(
            FALLBACK_WISH,
            TEXT_BOX_WIDTH,
            WISH_BOX_HEIGHT,
            WISH_FONT_SIZE,
            WISH_ADVANCE,
            WISH_LEADING,
        );
        assert!((block.font_size - WISH_FONT_SIZE).abs() < f32::EPSILON);
        assert!(block.lines.iter().all(|l| l.chars().count() <= 44));
    }

    /// Consecutive elements named by `id(0)`, `id(1)`, ...
    fn numbered<'a>(
        rendered: &'a RenderedCard,
        id: impl Fn(usize) -> String,
    ) -> Vec<(&'a Element, &'a str, f32)> {
        (0..)
            .map_while(|idx| rendered.scene.get_element(ElementId::named(&id(idx))))
            .map(|el| match &el.kind {
                ElementKind::Text {
                    content, font_size, ..
                } => (el, content.as_str(), *font_size),
                other => panic!("expected text, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_long_wish_is_shrunk_not_cut() {
        let words: Vec<String> = (0..120).map(|i| format!("w{i}")).collect();
        let wish = format!("{} {}", words.join(" "), "x".repeat(90));
        let data = CardData::new(UserInfo::new("Ana"), wish.as_str(), Theme::Gold).expect("card");
        let rendered = render(&data);

        let lines = numbered(&rendered, |idx| format!("wish-line-{idx}"));
        assert!(lines.len() > 6);
        for (el, _, font_size) in &lines {
            assert!(*font_size < WISH_FONT_SIZE);
            assert!(el.transform.y + el.transform.height <= 146.0 + WISH_BOX_HEIGHT);
        }
        let shown: Vec<&str> = lines.iter().flat_map(|(_, text, _)| text.split_whitespace()).collect();
        for word in &words {
            assert!(shown.contains(&word.as_str()), "missing {word}");
        }
        assert!(!lines.iter().any(|(_, text, _)| text.contains('…')));
        let xs: String = lines.iter().map(|(_, text, _)| *text).collect();
        assert_eq!(xs.matches('x').count(), 90);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_long_name_fits_card_width() {
        let name = "Maximilian Alexander Bartholomew Featherstonehaugh-Whittington";
        let rendered = render(&card(UserInfo::new(name)));
        let lines = numbered(&rendered, |idx| {
            if idx == 0 {
                "user-name".to_string()
            } else {
                format!("user-name-{idx}")
            }
        });
        assert!(lines.len() > 1);

        let mut shown = String::new();
        for (_, text, font_size) in &lines {
            assert!(*font_size < NAME_FONT_SIZE);
            let width = text.chars().count() as f32 * font_size * NAME_ADVANCE;
            assert!(width <= TEXT_BOX_WIDTH, "{text} is {width}px wide");
            shown.push_str(text);
        }
        assert_eq!(shown.replace(' ', ""), name.to_uppercase().replace(' ', ""));
        let (last, _, _) = lines[lines.len() - 1];
        assert!(last.transform.y + last.transform.height < CARD_HEIGHT - 28.0);
    }

    #[test]
    fn test_elements_stay_inside_card_vertically() {
        let long_wish = "word ".repeat(200);
        let data = CardData::new(UserInfo::new("Ana"), long_wish, Theme::Gold).expect("card");
        let rendered = render(&data);
        let name = rendered
            .scene
            .get_element(ElementId::named("user-name"))
            .expect("name");
        assert!(name.transform.y + name.transform.height < CARD_HEIGHT - 28.0);
    }
}
