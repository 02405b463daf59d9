//! Form state management.
//!
//! All UI state lives in [`FormState`] and changes only through
//! [`FormState::apply`]. Generate and export are mutually exclusive: while
//! either is in flight, both triggers are rejected.

use serde::{Deserialize, Serialize};

use crate::{CardData, CardError, CardResult, ImageScale, Theme, UserInfo, FALLBACK_WISH};

/// Terminal outcome of the most recent export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    /// An image was saved.
    Succeeded,
    /// Both strategies failed or no card was available.
    Failed,
}

/// Actions the form accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    /// Edit the name field.
    SetName(String),
    /// Replace or clear the uploaded photo (data URI).
    SetPhoto(Option<String>),
    /// Move the zoom slider.
    SetScale(f32),
    /// Choose a theme.
    SetTheme(Theme),
    /// Submit the form.
    BeginGenerate,
    /// The wish arrived; build the card.
    FinishGenerate(String),
    /// Request an image export of the current card.
    BeginExport,
    /// Export settled.
    FinishExport(ExportStatus),
}

/// The complete form state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormState {
    user_info: UserInfo,
    theme: Theme,
    /// Snapshot of the user details taken when generation started.
    pending: Option<UserInfo>,
    exporting: bool,
    card: Option<CardData>,
    last_export: Option<ExportStatus>,
}

impl FormState {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action.
    ///
    /// # Errors
    ///
    /// - [`CardError::EmptyName`] when submitting without a name.
    /// - [`CardError::Busy`] when generate or export is already running.
    /// - [`CardError::NoCard`] when exporting before a card exists.
    /// - [`CardError::NotInProgress`] when finishing an action that never began.
    pub fn apply(&mut self, action: FormAction) -> CardResult<()> {
        match action {
            FormAction::SetName(name) => self.user_info.name = name,
            FormAction::SetPhoto(photo) => {
                self.user_info.user_image = photo.filter(|src| !src.is_empty());
            }
            FormAction::SetScale(value) => {
                self.user_info.image_scale = ImageScale::from_slider(value);
            }
            FormAction::SetTheme(theme) => self.theme = theme,
            FormAction::BeginGenerate => {
                self.ensure_idle()?;
                if !self.user_info.has_name() {
                    return Err(CardError::EmptyName);
                }
                self.pending = Some(self.user_info.clone());
            }
            FormAction::FinishGenerate(wish) => {
                let snapshot = self
                    .pending
                    .take()
                    .ok_or(CardError::NotInProgress("generate"))?;
                let wish = if wish.trim().is_empty() {
                    FALLBACK_WISH.to_string()
                } else {
                    wish
                };
                self.card = Some(CardData::new(snapshot, wish, self.theme)?);
            }
            FormAction::BeginExport => {
                self.ensure_idle()?;
                if self.card.is_none() {
                    return Err(CardError::NoCard);
                }
                self.exporting = true;
                self.last_export = None;
            }
            FormAction::FinishExport(status) => {
                if !self.exporting {
                    return Err(CardError::NotInProgress("export"));
                }
                self.exporting = false;
                self.last_export = Some(status);
            }
        }
        Ok(())
    }

    fn ensure_idle(&self) -> CardResult<()> {
        if self.is_generating() {
            return Err(CardError::Busy("generate"));
        }
        if self.exporting {
            return Err(CardError::Busy("export"));
        }
        Ok(())
    }

    /// Current (editable) user details.
    #[must_use]
    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }

    /// Selected theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether a wish request is in flight.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether an export is in flight.
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Whether the submit control is enabled.
    #[must_use]
    pub fn can_generate(&self) -> bool {
        self.ensure_idle().is_ok() && self.user_info.has_name()
    }

    /// Whether the download control is enabled.
    #[must_use]
    pub fn can_export(&self) -> bool {
        self.ensure_idle().is_ok() && self.card.is_some()
    }

    /// The most recently generated card.
    #[must_use]
    pub fn card(&self) -> Option<&CardData> {
        self.card.as_ref()
    }

    /// Outcome of the last finished export.
    #[must_use]
    pub fn last_export(&self) -> Option<ExportStatus> {
        self.last_export
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> FormState {
        let mut state = FormState::new();
        state
            .apply(FormAction::SetName(name.to_string()))
            .expect("set name");
        state
    }

    #[test]
    fn test_submit_requires_name() {
        let mut state = named("   ");
        assert!(!state.can_generate());
        assert!(matches!(
            state.apply(FormAction::BeginGenerate),
            Err(CardError::EmptyName)
        ));
        assert!(!state.is_generating());
    }

    #[test]
    fn test_generate_builds_card_from_snapshot() {
        let mut state = named("Ana");
        state.apply(FormAction::BeginGenerate).expect("begin");
        assert!(state.is_generating());

        // Edits after submit do not leak into the card being generated.
        state
            .apply(FormAction::SetName("Someone Else".to_string()))
            .expect("edit");
        state
            .apply(FormAction::FinishGenerate("Hello".to_string()))
            .expect("finish");

        let card = state.card().expect("card");
        assert_eq!(card.user_info().name, "Ana");
        assert_eq!(card.wish(), "Hello");
        assert_eq!(card.theme(), Theme::Gold);
        assert!(!state.is_generating());
    }

    #[test]
    fn test_empty_wish_falls_back() {
        let mut state = named("Ana");
        state.apply(FormAction::BeginGenerate).expect("begin");
        state
            .apply(FormAction::FinishGenerate(String::new()))
            .expect("finish");
        assert_eq!(state.card().expect("card").wish(), FALLBACK_WISH);
    }

    #[test]
    fn test_regenerate_replaces_card() {
        let mut state = named("Ana");
        for wish in ["first", "second"] {
            state.apply(FormAction::BeginGenerate).expect("begin");
            state
                .apply(FormAction::FinishGenerate(wish.to_string()))
                .expect("finish");
        }
        assert_eq!(state.card().expect("card").wish(), "second");
    }

    #[test]
    fn test_generate_and_export_are_exclusive() {
        let mut state = named("Ana");
        assert!(matches!(
            state.apply(FormAction::BeginExport),
            Err(CardError::NoCard)
        ));

        state.apply(FormAction::BeginGenerate).expect("begin");
        assert!(matches!(
            state.apply(FormAction::BeginGenerate),
            Err(CardError::Busy("generate"))
        ));
        assert!(matches!(
            state.apply(FormAction::BeginExport),
            Err(CardError::Busy("generate"))
        ));
        state
            .apply(FormAction::FinishGenerate("wish".to_string()))
            .expect("finish");

        state.apply(FormAction::BeginExport).expect("export");
        assert!(!state.can_generate());
        assert!(matches!(
            state.apply(FormAction::BeginGenerate),
            Err(CardError::Busy("export"))
        ));
        state
            .apply(FormAction::FinishExport(ExportStatus::Failed))
            .expect("finish export");
        assert_eq!(state.last_export(), Some(ExportStatus::Failed));
        assert!(state.can_export());
    }

    #[test]
    fn test_finish_without_begin_is_rejected() {
        let mut state = named("Ana");
        assert!(state
            .apply(FormAction::FinishGenerate("wish".to_string()))
            .is_err());
        assert!(state
            .apply(FormAction::FinishExport(ExportStatus::Succeeded))
            .is_err());
    }

    #[test]
    fn test_scale_goes_through_slider() {
        let mut state = named("Ana");
        state.apply(FormAction::SetScale(7.0)).expect("scale");
        assert!((state.user_info().image_scale.get() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_photo_is_cleared() {
        let mut state = named("Ana");
        state
            .apply(FormAction::SetPhoto(Some(String::new())))
            .expect("photo");
        assert!(state.user_info().user_image.is_none());
    }
}
