//! # Wishcard Core
//!
//! Core card logic: the user/card data model, the scene graph the card is
//! laid out in, the deterministic card layout, and the form state reducer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 card-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Model           │  Card Layout             │
//! │  - UserInfo      │  - render(CardData)      │
//! │  - CardData      │  - CardHandle            │
//! │  - ImageScale    │                          │
//! ├─────────────────────────────────────────────┤
//! │  Scene Graph     │  Form State              │
//! │  - Elements      │  - FormAction reducer    │
//! │  - Transforms    │  - in-flight guards      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod card;
pub mod element;
pub mod error;
pub mod model;
pub mod scene;
pub mod state;

pub use card::{render, CardHandle, RenderedCard, CARD_HEIGHT, CARD_WIDTH, ROOT_HANDLE};
pub use element::{Color, Element, ElementId, ElementKind, Glyph, TextAnchor, Transform};
pub use error::{CardError, CardResult};
pub use model::{card_filename, CardData, ImageScale, Theme, UserInfo};
pub use scene::Scene;
pub use state::{ExportStatus, FormAction, FormState};

/// Card core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Year the campaign celebrates.
pub const CAMPAIGN_YEAR: u16 = 2026;

/// Prefix of every exported file name.
pub const FILENAME_PREFIX: &str = "iLMIFYTECH";

/// Agency label printed in the card header.
pub const AGENCY_LABEL: &str = "iLMIFYTECH AGENCY 2026";

/// Site label printed in the card footer.
pub const SITE_LABEL: &str = "ilmifytech.com";

/// Wish used whenever the generation service cannot provide one.
pub const FALLBACK_WISH: &str = "Wishing you a New Year filled with success, prosperity, and new opportunities. May 2026 be a year of great achievements for all of us. Happy New Year!";
