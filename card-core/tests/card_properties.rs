//! Property and scenario tests for the card model and layout.

use card_core::{
    card_filename, render, CardData, ElementId, ElementKind, FormAction, FormState, Glyph,
    ImageScale, Theme, UserInfo, FALLBACK_WISH,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn filename_never_contains_whitespace(name in "[A-Za-z \\t]{1,40}") {
        let filename = card_filename(&name);
        prop_assert!(!filename.chars().any(char::is_whitespace));
        prop_assert!(filename.starts_with("iLMIFYTECH-2026-"));
        let has_png_suffix = filename.ends_with(".png");
        prop_assert!(has_png_suffix);
    }

    #[test]
    fn filename_is_a_single_path_component(name in "[A-Za-z /\\\\]{1,40}") {
        let filename = card_filename(&name);
        prop_assert!(!filename.contains('/') && !filename.contains('\\'));
    }

    #[test]
    fn slider_values_stay_in_range(value in -100.0f32..100.0) {
        let scale = ImageScale::from_slider(value).get();
        prop_assert!((ImageScale::MIN..=ImageScale::MAX).contains(&scale));
    }

    #[test]
    fn render_is_deterministic(name in "[A-Za-z ]{1,30}", wish in "[a-z ]{1,200}") {
        prop_assume!(!wish.trim().is_empty());
        let card = CardData::new(UserInfo::new(name), wish, Theme::Gold).unwrap();
        prop_assert_eq!(render(&card), render(&card));
    }
}

#[test]
fn filename_for_full_name() {
    let card = CardData::new(UserInfo::new("Wali Ullah Shuvo"), FALLBACK_WISH, Theme::Gold)
        .expect("card");
    assert!(card
        .filename()
        .contains("iLMIFYTECH-2026-Wali-Ullah-Shuvo.png"));
}

#[test]
fn scenario_name_without_photo() {
    let mut form = FormState::new();
    form.apply(FormAction::SetName("Ana".to_string()))
        .expect("name");
    form.apply(FormAction::BeginGenerate).expect("begin");
    form.apply(FormAction::FinishGenerate(FALLBACK_WISH.to_string()))
        .expect("finish");

    let card = form.card().expect("card");
    assert!(card.user_info().user_image.is_none());
    assert!(!card.wish().is_empty());

    let rendered = render(card);
    let placeholder = rendered
        .scene
        .get_element(ElementId::named("headshot-placeholder"))
        .expect("placeholder glyph");
    assert!(matches!(
        placeholder.kind,
        ElementKind::Glyph {
            glyph: Glyph::Person,
            ..
        }
    ));
}

#[test]
fn scenario_maximum_zoom() {
    let mut form = FormState::new();
    form.apply(FormAction::SetName("Ana".to_string()))
        .expect("name");
    form.apply(FormAction::SetPhoto(Some(
        "data:image/png;base64,iVBORw0KGgo=".to_string(),
    )))
    .expect("photo");
    form.apply(FormAction::SetScale(2.5)).expect("scale");
    form.apply(FormAction::BeginGenerate).expect("begin");
    form.apply(FormAction::FinishGenerate("Happy New Year".to_string()))
        .expect("finish");

    let rendered = render(form.card().expect("card"));
    let photo = rendered
        .scene
        .get_element(ElementId::named("headshot-photo"))
        .expect("photo");
    let ElementKind::Photo { scale, .. } = &photo.kind else {
        panic!("expected photo element");
    };
    assert!((*scale - 2.5).abs() < 1e-6);
}
