use tracklink::TracklinkError;

#[test]
fn test_error_codes_are_distinct() {
    let errors = [
        TracklinkError::invalid_base62("a"),
        TracklinkError::negative_input("b"),
        TracklinkError::overflow("c"),
        TracklinkError::validation("d"),
        TracklinkError::url_parse("e"),
        TracklinkError::file_operation("f"),
        TracklinkError::serialization("g"),
        TracklinkError::config("h"),
    ];
    let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn test_display_uses_simple_format() {
    let err = TracklinkError::validation("missing campaign_id");
    assert_eq!(err.to_string(), "Validation Error: missing campaign_id");
    assert_eq!(err.message(), "missing campaign_id");
    assert!(err.format_colored().contains("E004"));
}

#[test]
fn test_from_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(
        TracklinkError::from(io),
        TracklinkError::FileOperation(_)
    ));

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(
        TracklinkError::from(json),
        TracklinkError::Serialization(_)
    ));

    let url = url::Url::parse("::").unwrap_err();
    assert!(matches!(TracklinkError::from(url), TracklinkError::UrlParse(_)));
}
