use stim_core::errors::{DesignError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("variable", "contrast")
        .with_context("reason", "example")
}

#[test]
fn divisibility_error_surface() {
    let err = DesignError::Divisibility(sample_info("divisibility", "10 is not divisible by 4"));
    assert_eq!(err.info().code, "divisibility");
    assert_eq!(err.message(), "10 is not divisible by 4");
    assert!(err.info().context.contains_key("variable"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = DesignError::JitteringConflict(
        sample_info("block-jitter", "the list has jittering").with_hint("turn jittering off"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("jittering conflict: the list has jittering"));
    assert!(rendered.contains("variable=contrast"));
    assert!(rendered.contains("hint: turn jittering off"));
}

#[test]
fn missing_shorthand_builds_missing_data() {
    let err = DesignError::missing("binding", "no object");
    assert!(matches!(err, DesignError::MissingData(_)));
    assert_eq!(err.info().code, "binding");
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = DesignError::GroupSize(ErrorInfo::new("group-size", "too many siblings"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "GroupSize");
    let restored: DesignError = serde_json::from_value(json).unwrap();
    assert_eq!(restored, err);
}
