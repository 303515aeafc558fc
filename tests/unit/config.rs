use super::*;

#[test]
fn defaults_render_on_white_and_keep_going() {
    let s = ReplaySettings::default();
    assert_eq!(s.scale, 1.0);
    assert_eq!(s.clear_rgba, Some([255, 255, 255, 255]));
    assert_eq!(s.on_error, ErrorPolicy::Continue);
    assert_eq!(s.max_records, None);
}

#[test]
fn json_fills_missing_fields_from_defaults() {
    let s = ReplaySettings::from_json_str(r#"{"width": 640, "on_error": "stop"}"#).unwrap();
    assert_eq!(s.width, Some(640));
    assert_eq!(s.height, None);
    assert_eq!(s.on_error, ErrorPolicy::Stop);
    assert_eq!(s.scale, 1.0);

    let transparent = ReplaySettings::from_json_str(r#"{"clear_rgba": null}"#).unwrap();
    assert_eq!(transparent.clear_rgba, None);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = ReplaySettings::from_json_str(r#"{"widht": 640}"#).unwrap_err();
    assert!(err.to_string().contains("replay settings"), "{err}");
}

#[test]
fn overrides_parse_leniently() {
    let s = ReplaySettings::default().with_overrides(Some(" 25 "), Some("TRUE"));
    assert_eq!(s.max_records, Some(25));
    assert_eq!(s.on_error, ErrorPolicy::Stop);

    let s = s.with_overrides(Some("0"), Some("no"));
    assert_eq!(s.max_records, Some(25));
    assert_eq!(s.on_error, ErrorPolicy::Continue);

    let s = s.with_overrides(Some("lots"), Some("maybe"));
    assert_eq!(s.max_records, Some(25));
    assert_eq!(s.on_error, ErrorPolicy::Continue);
}

#[test]
fn missing_settings_file_names_the_path() {
    let err = ReplaySettings::from_json_path(Path::new("/nonexistent/replay.json")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/replay.json"), "{err}");
}
