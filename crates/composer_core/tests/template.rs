use composer_core::{
    Artifact, TemplateNamespace, TemplateRef, TemplateResolution, TemplateSelection,
    TemplateSelector,
};

fn image(name: &str) -> Artifact {
    Artifact::new(name, "image/png", vec![1, 2, 3])
}

#[test]
fn short_numeric_ids_are_presets() {
    for id in ["1", "12", "123"] {
        assert_eq!(TemplateRef::classify(id).namespace, TemplateNamespace::Preset, "{id}");
    }
    for id in ["1234", "", "1a", "abc", "0x1", "b3f2c0de-uuid", " 12"] {
        assert_eq!(TemplateRef::classify(id).namespace, TemplateNamespace::User, "{id:?}");
    }
}

#[test]
fn selecting_one_variant_replaces_the_others() {
    let mut selector = TemplateSelector::default();

    selector.select_ad_hoc_file(image("mine.png"));
    assert!(matches!(selector.selection(), TemplateSelection::AdHocFile(_)));

    selector.select_by_id("7", None);
    assert_eq!(
        selector.selection(),
        &TemplateSelection::PresetTemplate {
            id: "7".to_string(),
            cached: None
        }
    );

    selector.select(TemplateRef::user("42"), None);
    assert_eq!(
        selector.selection(),
        &TemplateSelection::UserTemplate {
            id: "42".to_string(),
            cached: None
        }
    );
}

#[test]
fn descriptive_style_clears_selection_but_keeps_description() {
    let mut selector = TemplateSelector::default();
    selector.set_style_description("  minimal, blue and white  ");
    selector.select_by_id("user-template-1", Some(image("t.png")));

    selector.toggle_descriptive_style(true);
    assert_eq!(selector.selection(), &TemplateSelection::None);
    assert!(selector.descriptive_style());

    selector.toggle_descriptive_style(false);
    assert_eq!(selector.style_description(), "  minimal, blue and white  ");
    assert_eq!(
        selector.resolved_style_description().as_deref(),
        Some("minimal, blue and white")
    );

    selector.select_by_id("3", None);
    selector.toggle_descriptive_style(true);
    selector.select_by_id("4", None);
    assert!(!selector.descriptive_style());
}

#[test]
fn blank_description_resolves_to_none() {
    let mut selector = TemplateSelector::default();
    selector.set_style_description(" \n\t ");
    assert_eq!(selector.resolved_style_description(), None);
}

#[test]
fn resolution_requests_lookup_only_without_cached_file() {
    let mut selector = TemplateSelector::default();
    assert_eq!(selector.resolution(), TemplateResolution::None);

    selector.select_by_id("2", None);
    assert_eq!(
        selector.resolution(),
        TemplateResolution::Lookup(TemplateRef::preset("2"))
    );

    assert!(selector.cache_resolved(&TemplateRef::preset("2"), image("p2.png")));
    assert_eq!(selector.resolution(), TemplateResolution::Ready(image("p2.png")));

    selector.select_ad_hoc_file(image("upload.png"));
    assert_eq!(selector.resolution(), TemplateResolution::Ready(image("upload.png")));
}

#[test]
fn cached_file_for_a_replaced_selection_is_ignored() {
    let mut selector = TemplateSelector::default();
    selector.select(TemplateRef::user("u-1"), None);
    selector.select(TemplateRef::user("u-2"), None);

    assert!(!selector.cache_resolved(&TemplateRef::user("u-1"), image("old.png")));
    assert_eq!(
        selector.resolution(),
        TemplateResolution::Lookup(TemplateRef::user("u-2"))
    );
}
