//! User input and card data model.

use serde::{Deserialize, Serialize};

use crate::{CardError, CardResult, CAMPAIGN_YEAR, FILENAME_PREFIX};

/// Zoom factor applied to the user's photo.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct ImageScale(f32);

impl ImageScale {
    /// Smallest supported zoom.
    pub const MIN: f32 = 0.5;
    /// Largest supported zoom.
    pub const MAX: f32 = 2.5;
    /// Increment of the zoom slider.
    pub const STEP: f32 = 0.05;

    /// Create a scale, rejecting values outside `MIN..=MAX`.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::InvalidScale`] for out-of-range or non-finite values.
    pub fn new(value: f32) -> CardResult<Self> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CardError::InvalidScale(value))
        }
    }

    /// Value as produced by the zoom slider: clamped to range and snapped to the step.
    #[must_use]
    pub fn from_slider(value: f32) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        let clamped = value.clamp(Self::MIN, Self::MAX);
        let steps = ((clamped - Self::MIN) / Self::STEP).round();
        Self(Self::STEP.mul_add(steps, Self::MIN).clamp(Self::MIN, Self::MAX))
    }

    /// The zoom factor.
    #[must_use]
    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ImageScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f32> for ImageScale {
    type Error = CardError;

    fn try_from(value: f32) -> CardResult<Self> {
        Self::new(value)
    }
}

impl From<ImageScale> for f32 {
    fn from(scale: ImageScale) -> Self {
        scale.0
    }
}

/// Details the user enters in the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Display name; must be non-empty to submit.
    pub name: String,
    /// Uploaded photo as a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
    /// Zoom applied to the photo.
    #[serde(default)]
    pub image_scale: ImageScale,
}

impl UserInfo {
    /// Create user info with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the form may be submitted with these details.
    #[must_use]
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Whether a photo was supplied.
    #[must_use]
    pub fn has_photo(&self) -> bool {
        self.user_image.as_deref().is_some_and(|src| !src.is_empty())
    }
}

/// Visual theme of a card. Selectable, not otherwise consumed by layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark blue.
    Midnight,
    /// Agency default.
    #[default]
    Gold,
    /// Purple haze.
    Nebula,
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "midnight" => Ok(Self::Midnight),
            "gold" => Ok(Self::Gold),
            "nebula" => Ok(Self::Nebula),
            other => Err(format!("unknown theme '{other}' (expected midnight, gold or nebula)")),
        }
    }
}

/// Snapshot used to render a card. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    user_info: UserInfo,
    wish: String,
    theme: Theme,
}

impl CardData {
    /// Freeze user details and a wish into a card.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::EmptyWish`] when `wish` is blank.
    pub fn new(user_info: UserInfo, wish: impl Into<String>, theme: Theme) -> CardResult<Self> {
        let wish = wish.into();
        if wish.trim().is_empty() {
            return Err(CardError::EmptyWish);
        }
        Ok(Self {
            user_info,
            wish,
            theme,
        })
    }

    /// The frozen user details.
    #[must_use]
    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }

    /// The wish text; never empty.
    #[must_use]
    pub fn wish(&self) -> &str {
        &self.wish
    }

    /// The selected theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// File name the exported image is saved under.
    #[must_use]
    pub fn filename(&self) -> String {
        card_filename(&self.user_info.name)
    }
}

/// Build the export file name: `<prefix>-<year>-<name>.png`.
///
/// Every run of whitespace in `name` becomes a single hyphen and path
/// separators become underscores, so the name stays a single file name.
#[must_use]
pub fn card_filename(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(if matches!(ch, '/' | '\\') { '_' } else { ch });
            in_space = false;
        }
    }
    format!("{FILENAME_PREFIX}-{CAMPAIGN_YEAR}-{slug}.png")
}
