//! Card elements - the building blocks of a card scene.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for element IDs derived from stable names.
const ELEMENT_NAMESPACE: Uuid = Uuid::from_u128(0x6b1d_57a0_2026_4c1e_9f3a_1f2e_a5c0_d001);

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derive the ID for a stable element name.
    ///
    /// The same name always yields the same ID, which keeps card layouts
    /// reproducible across renders.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self(Uuid::new_v5(&ELEMENT_NAMESPACE, name.as_bytes()))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Create a colour from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as a `#rrggbb` hex string.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Horizontal text alignment within an element's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    /// Left edge of the box.
    Start,
    /// Centre of the box.
    Middle,
    /// Right edge of the box.
    End,
}

impl TextAnchor {
    /// SVG `text-anchor` keyword.
    #[must_use]
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }

    /// X coordinate of the anchor point for a box starting at `x`.
    #[must_use]
    pub fn anchor_x(self, x: f32, width: f32) -> f32 {
        match self {
            Self::Start => x,
            Self::Middle => x + width / 2.0,
            Self::End => x + width,
        }
    }
}

/// Fixed vector glyphs drawn on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Glyph {
    /// Head-and-shoulders silhouette shown when no photo was supplied.
    Person,
    /// Double quotation mark framing the wish.
    Quote,
}

impl Glyph {
    /// Path data in the glyph's own view box.
    #[must_use]
    pub fn path_data(self) -> &'static str {
        match self {
            Self::Person => "M10 9a3 3 0 100-6 3 3 0 000 6zm-7 9a7 7 0 1114 0H3z",
            Self::Quote => "M14.017 21L14.017 18C14.017 16.899 14.899 16 16 16L18 16C18.552 16 19 15.552 19 15L19 13C19 12.448 18.552 12 18 12L15 12C13.899 12 13 11.101 13 10L13 7C13 5.899 13.899 5 15 5L18 5C19.101 5 20 5.899 20 7L20 15C20 18.314 17.314 21 14.017 21ZM4.017 21L4.017 18C4.017 16.899 4.899 16 6 16L8 16C8.552 16 9 15.552 9 15L9 13C9 12.448 8.552 12 8 12L5 12C3.899 12 3 11.101 3 10L3 7C3 5.899 3.899 5 5 5L8 5C9.101 5 10 5.899 10 7L10 15C10 18.314 7.314 21 4.017 21Z",
        }
    }

    /// Side length of the square view box the path is drawn in.
    #[must_use]
    pub fn view_box(self) -> f32 {
        match self {
            Self::Person => 20.0,
            Self::Quote => 24.0,
        }
    }

    /// Whether the path uses the even-odd fill rule.
    #[must_use]
    pub fn even_odd(self) -> bool {
        matches!(self, Self::Person)
    }
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ElementKind {
    /// A filled rectangle covering the element box.
    Rect {
        /// Fill colour.
        fill: Color,
        /// Opacity in `0.0..=1.0`.
        opacity: f32,
    },

    /// A filled polygon; points are relative to the element box origin.
    Polygon {
        /// Vertices in drawing order.
        points: Vec<[f32; 2]>,
        /// Fill colour.
        fill: Color,
        /// Opacity in `0.0..=1.0`.
        opacity: f32,
    },

    /// A circle inscribed in the element box.
    Circle {
        /// Optional fill colour.
        fill: Option<Color>,
        /// Optional stroke colour.
        stroke: Option<Color>,
        /// Stroke width in pixels.
        stroke_width: f32,
        /// Opacity in `0.0..=1.0`.
        opacity: f32,
    },

    /// A single line of text.
    Text {
        /// Text content.
        content: String,
        /// Font size in pixels.
        font_size: f32,
        /// Text colour.
        color: Color,
        /// CSS font weight (400 regular, 900 black).
        weight: u16,
        /// Italic style.
        italic: bool,
        /// Horizontal alignment within the box.
        anchor: TextAnchor,
        /// Extra spacing between letters in pixels.
        letter_spacing: f32,
        /// Opacity in `0.0..=1.0`.
        opacity: f32,
    },

    /// The user's photo, clipped to the circle inscribed in the box.
    Photo {
        /// Image as a data URI.
        src: String,
        /// Zoom applied about the box centre.
        scale: f32,
    },

    /// A fixed vector glyph scaled to the element box.
    Glyph {
        /// Which glyph to draw.
        glyph: Glyph,
        /// Fill colour.
        color: Color,
        /// Opacity in `0.0..=1.0`.
        opacity: f32,
    },

    /// A container group for other elements.
    Group {
        /// Child element IDs.
        children: Vec<ElementId>,
    },
}

/// Transform for positioning and sizing elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Rotation about the box centre, in radians.
    pub rotation: f32,
    /// Z-index for layering.
    pub z_index: i32,
}

impl Transform {
    /// Box at the given position and size with no rotation on layer `z_index`.
    #[must_use]
    pub fn rect(x: f32, y: f32, width: f32, height: f32, z_index: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            z_index,
        }
    }

    /// Centre point of the box.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::rect(0.0, 0.0, 100.0, 100.0, 0)
    }
}

/// A card element with content and transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Element content type.
    pub kind: ElementKind,
    /// Position and size.
    pub transform: Transform,
    /// Optional parent element ID (for grouped elements).
    pub parent: Option<ElementId>,
}

impl Element {
    /// Create a new element with the given kind and a random ID.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self::with_id(ElementId::new(), kind)
    }

    /// Create a new element whose ID is derived from a stable name.
    #[must_use]
    pub fn named(name: &str, kind: ElementKind) -> Self {
        Self::with_id(ElementId::named(name), kind)
    }

    fn with_id(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            transform: Transform::default(),
            parent: None,
        }
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the parent group.
    #[must_use]
    pub fn with_parent(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Whether this element is a container rather than something drawn.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_ids_are_stable() {
        assert_eq!(ElementId::named("final-card"), ElementId::named("final-card"));
        assert_ne!(ElementId::named("final-card"), ElementId::named("card-name"));
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(ElementId::new(), ElementId::new());
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::rgb(0x27, 0xae, 0x60).to_hex(), "#27ae60");
        assert_eq!(Color::rgb(5, 5, 5).to_hex(), "#050505");
    }

    #[test]
    fn test_anchor_x() {
        assert!((TextAnchor::Start.anchor_x(10.0, 100.0) - 10.0).abs() < f32::EPSILON);
        assert!((TextAnchor::Middle.anchor_x(10.0, 100.0) - 60.0).abs() < f32::EPSILON);
        assert!((TextAnchor::End.anchor_x(10.0, 100.0) - 110.0).abs() < f32::EPSILON);
    }
}
