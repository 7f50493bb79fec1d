//! Integration tests for the converter
//!
//! These tests verify the complete pipeline from JSON text to DSL output.

use confdsl::{ConvertError, ConvertOptions, Converter};
use pretty_assertions::assert_eq;

/// Helper to convert JSON text with default options
fn convert(json: &str) -> Result<String, ConvertError> {
    Converter::default().convert_str(json)
}

#[test]
fn test_computed_property() {
    let out = convert(r#"{"Demo": 42, "ComputedProperty": "${+ Demo 1}"}"#).unwrap();
    assert_eq!(out, "#(\n#([[Demo]], 42),\n#([[ComputedProperty]], 43)\n)");
}

#[test]
fn test_concat_substitutes_text_constants() {
    let out = convert(
        r#"{
            "Greeting": "Hello",
            "Target": "World",
            "Message": "${concat [[Greeting]] [[ ]] [[Target]]}"
        }"#,
    )
    .unwrap();
    assert_eq!(
        out,
        "#(\n#([[Greeting]], [[Hello]]),\n#([[Target]], [[World]]),\n\
         #([[Message]], [[Hello World]])\n)"
    );
}

#[test]
fn test_array_value() {
    let out = convert(r#"{"Values": [1, 2, 3]}"#).unwrap();
    assert_eq!(out, "#(\n#([[Values]], #( 1, 2, 3 ))\n)");
}

#[test]
fn test_division_renders_float() {
    let out = convert(r#"{"Total": 10, "Half": "${/ Total 5}"}"#).unwrap();
    assert!(out.contains("#([[Half]], 2.0)"));
}

#[test]
fn test_json_floats_keep_fraction() {
    let out = convert(r#"{"Ratio": 2.0, "Pi": 3.5}"#).unwrap();
    assert_eq!(out, "#(\n#([[Ratio]], 2.0),\n#([[Pi]], 3.5)\n)");
}

#[test]
fn test_ord_and_chained_constants() {
    let out = convert(
        r#"{
            "Letter": "A",
            "Code": "${ord Letter}",
            "Next": "${+ Code 1}"
        }"#,
    )
    .unwrap();
    assert!(out.contains("#([[Code]], 65)"));
    assert!(out.contains("#([[Next]], 66)"));
}

#[test]
fn test_forward_reference_fails() {
    let err = convert(r#"{"Sum": "${+ Later 1}", "Later": 1}"#).unwrap_err();
    match err {
        ConvertError::UndefinedConstant { key, name, src, .. } => {
            assert_eq!(key, "Sum");
            assert_eq!(name, "Later");
            assert_eq!(src, "${+ Later 1}");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // The same reference after the definition succeeds
    let out = convert(r#"{"Later": 1, "Sum": "${+ Later 1}"}"#).unwrap();
    assert!(out.contains("#([[Sum]], 2)"));
}

#[test]
fn test_nested_expressions_share_the_entry_snapshot() {
    let out = convert(
        r#"{
            "Base": 10,
            "Grid": [["${+ Base 1}", ["${* Base 2}"]], {"Deep": ["${- Base 3}"]}],
            "After": "${+ Base 0}"
        }"#,
    )
    .unwrap();
    assert!(out.contains(
        "#([[Grid]], #( #( 11, #( 20 ) ), #( #([[Deep]], #( 7 )) ) ))"
    ));
    assert!(out.contains("#([[After]], 10)"));
}

#[test]
fn test_nested_objects_render_as_pairs() {
    let out = convert(
        r#"{
            "Routes": [
                {"path": "/home", "handler": "homeHandler"},
                {"path": "/about", "handler": "aboutHandler"}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(
        out,
        "#(\n#([[Routes]], #( #( #([[path]], [[/home]]), #([[handler]], [[homeHandler]]) ), \
         #( #([[path]], [[/about]]), #([[handler]], [[aboutHandler]]) ) ))\n)"
    );
}

#[test]
fn test_marker_with_surrounding_whitespace() {
    let out = convert(r#"{"A": 1, "B": "  ${+ A 1}  "}"#).unwrap();
    assert!(out.contains("#([[B]], 2)"));
}

#[test]
fn test_partial_marker_is_plain_text() {
    let out = convert(r#"{"A": 1, "B": "total ${+ A 1}"}"#).unwrap();
    assert!(out.contains("#([[B]], [[total ${+ A 1}]])"));
}

#[test]
fn test_closing_brackets_are_escaped() {
    let out = convert(r#"{"Text": "a]]b", "Key]]": 1}"#).unwrap();
    assert!(out.contains("#([[Text]], [[a]]]]b]])"));
    assert!(out.contains("#([[Key]]]]]], 1)"));
}

#[test]
fn test_unsupported_values() {
    let err = convert(r#"{"Flag": true}"#).unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedValueType { ref key, .. } if key == "Flag"));

    let err = convert(r#"{"List": [1, null]}"#).unwrap_err();
    assert!(
        matches!(err, ConvertError::UnsupportedValueType { ref path, .. } if path == "List[1]")
    );
}

#[test]
fn test_error_taxonomy() {
    let cases = [
        (r#"[1, 2]"#, "RootTypeError"),
        (r#"{"A": "${ }"}"#, "EmptyExpression"),
        (r#"{"A": "${pow 2 3}"}"#, "UnknownOperator"),
        (r#"{"A": "${+ B 1}"}"#, "UndefinedConstant"),
        (r#"{"A": "${+ 1 x}"}"#, "InvalidOperand"),
        (r#"{"A": "${ord [[ab]]}"}"#, "InvalidOperand"),
        (r#"{"A": "${/ 1 0}"}"#, "EvaluationError"),
        (r#"{"A": null}"#, "UnsupportedValueType"),
    ];

    for (json, expected) in cases {
        let err = convert(json).unwrap_err();
        let name = match err {
            ConvertError::RootTypeError { .. } => "RootTypeError",
            ConvertError::EmptyExpression { .. } => "EmptyExpression",
            ConvertError::UnknownOperator { .. } => "UnknownOperator",
            ConvertError::UndefinedConstant { .. } => "UndefinedConstant",
            ConvertError::InvalidOperand { .. } => "InvalidOperand",
            ConvertError::EvaluationError { .. } => "EvaluationError",
            ConvertError::UnsupportedValueType { .. } => "UnsupportedValueType",
            other => panic!("unexpected error for {}: {:?}", json, other),
        };
        assert_eq!(name, expected, "input: {}", json);
    }
}

#[test]
fn test_first_error_aborts_conversion() {
    let err = convert(r#"{"A": "${+ X 1}", "B": "${pow 1 2}"}"#).unwrap_err();
    assert_eq!(err.key(), Some("A"));
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        convert("{\"A\": "),
        Err(ConvertError::ParseError { .. })
    ));
}

#[test]
fn test_strict_names() {
    let json = r#"{"books": ["a"], "Count": 1}"#;

    let mut lenient = Converter::default();
    assert!(lenient.convert_str(json).is_ok());
    assert_eq!(lenient.warnings().len(), 1);

    let mut strict = Converter::new(ConvertOptions::new().with_strict_names(true));
    assert!(matches!(
        strict.convert_str(json),
        Err(ConvertError::InvalidConstantName { .. })
    ));
}

#[test]
fn test_yaml_input() {
    let document = confdsl::parse_yaml("Port: 8080\nNext: ${+ Port 1}\n").unwrap();
    let out = confdsl::convert(&document).unwrap();
    assert_eq!(out, "#(\n#([[Port]], 8080),\n#([[Next]], 8081)\n)");
}
