use pretty_assertions::assert_eq;

use super::{
    models::{ConfigFunction, HeaderEntry, HeaderValue},
    parser::parse_header,
};

const DESCRIPTION: &str = r#"
#include "defines.hpp"

author = "Someone";
maxPlayers = 10;

class CfgFunctions {
    class TAG {
        tag = "MYTAG";
        class Core {
            file = "functions\core";
            class init {};
            class spawn { file = "scripts\spawn.sqf"; };
        };
    };
    class Other {
        class Misc {
            class helper {};
        };
    };
};
"#;

#[test]
fn test_parse_description() {
    let result = parse_header(DESCRIPTION, "description.ext");

    assert_eq!(result.diagnostics, vec![]);
    assert_eq!(result.file.properties().count(), 2);
    assert_eq!(result.file.classes().count(), 1);
}

#[test]
fn test_config_functions() {
    let result = parse_header(DESCRIPTION, "description.ext");
    let functions = result.file.config_functions();

    assert_eq!(
        functions,
        vec![
            ConfigFunction {
                tag: "MYTAG".to_string(),
                category: "Core".to_string(),
                name: "init".to_string(),
                file: Some("functions\\core".to_string()),
            },
            ConfigFunction {
                tag: "MYTAG".to_string(),
                category: "Core".to_string(),
                name: "spawn".to_string(),
                file: Some("scripts\\spawn.sqf".to_string()),
            },
            ConfigFunction {
                tag: "Other".to_string(),
                category: "Misc".to_string(),
                name: "helper".to_string(),
                file: None,
            },
        ]
    );
    assert_eq!(functions[0].full_name(), "MYTAG_fnc_init");
}

#[test]
fn test_find_class_ignores_case() {
    let result = parse_header(DESCRIPTION, "description.ext");

    let core = result.file.find_class("cfgfunctions/tag/CORE");
    assert_eq!(core.map(|class| class.name.as_str()), Some("Core"));
    assert!(result.file.find_class("CfgFunctions/Missing").is_none());
    assert!(result.file.find_class("").is_none());
}

#[test]
fn test_property_values() {
    let source = r#"
        offset = -2.5;
        mask = 0x10;
        respawn = BASE;
        title = QUOTE(My Mission);
        items[] = {"a", 1, {2, 3}};
        items[] += {"b"};
    "#;
    let result = parse_header(source, "test.hpp");
    assert_eq!(result.diagnostics, vec![]);

    let values: Vec<(&str, &HeaderValue, bool)> = result
        .file
        .properties()
        .map(|property| (property.name.as_str(), &property.value, property.appends))
        .collect();

    assert_eq!(
        values,
        vec![
            ("offset", &HeaderValue::Number(-2.5), false),
            ("mask", &HeaderValue::Number(16.0), false),
            ("respawn", &HeaderValue::Word("BASE".to_string()), false),
            (
                "title",
                &HeaderValue::Word("QUOTE(My Mission)".to_string()),
                false
            ),
            (
                "items",
                &HeaderValue::Array(vec![
                    HeaderValue::String("a".to_string()),
                    HeaderValue::Number(1.0),
                    HeaderValue::Array(vec![HeaderValue::Number(2.0), HeaderValue::Number(3.0)]),
                ]),
                false
            ),
            (
                "items",
                &HeaderValue::Array(vec![HeaderValue::String("b".to_string())]),
                true
            ),
        ]
    );
}

#[test]
fn test_forward_declarations_and_inheritance() {
    let result = parse_header("class Base; class Child: Base { scope = 2; };", "test.hpp");
    assert_eq!(result.diagnostics, vec![]);

    let classes: Vec<_> = result.file.classes().collect();
    assert!(classes[0].is_forward);
    assert_eq!(classes[1].parent.as_deref(), Some("Base"));
    assert_eq!(
        classes[1].get_property("SCOPE").map(|p| &p.value),
        Some(&HeaderValue::Number(2.0))
    );
}

#[test]
fn test_keywords_as_names() {
    let result = parse_header("class default { from = 1; to = 2; };", "test.hpp");

    assert_eq!(result.diagnostics, vec![]);
    let class = result.file.find_class("default");
    assert_eq!(class.map(|class| class.properties().count()), Some(2));
}

#[test]
fn test_recovers_from_bad_property() {
    let result = parse_header("class A { x = ; y = 1; }; class B {};", "test.hpp");

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].get_error_name(), "UnexpectedTokenDetailed");

    let a = result.file.find_class("A");
    assert_eq!(a.map(|class| class.entries.len()), Some(1));
    assert!(result.file.find_class("B").is_some());
}

#[test]
fn test_recovers_inside_array_value() {
    let result = parse_header("class A { x[] = {1 2}; y = 1; }; class B {};", "test.hpp");

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].get_error_name(), "UnexpectedTokenDetailed");

    let a = result.file.find_class("A");
    assert_eq!(a.map(|class| class.entries.len()), Some(1));
    assert!(result.file.find_class("B").is_some());
}

#[test]
fn test_deeply_nested_arrays_are_rejected() {
    let depth = 1000;
    let source = format!("x[] = {}{}; y = 1;", "{".repeat(depth), "}".repeat(depth));
    let result = parse_header(&source, "test.hpp");

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].get_error_name(), "NestingTooDeep");
    assert_eq!(result.file.entries.len(), 1);
}

#[test]
fn test_deeply_nested_classes_are_rejected() {
    let depth = 300;
    let source = format!("{}{} class B {{}};", "class A {".repeat(depth), "};".repeat(depth));
    let result = parse_header(&source, "test.hpp");

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].get_error_name(), "NestingTooDeep");
    assert!(result.file.find_class("B").is_some());
}

#[test]
fn test_missing_semicolon() {
    let result = parse_header("class A { x = 1 };", "test.hpp");

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].get_error_name(), "MissingSeparator");
    assert!(result.file.find_class("A").is_some());
}

#[test]
fn test_unclosed_class() {
    let result = parse_header("class A { x = 1;", "test.hpp");

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].get_error_name(), "UnexpectedEof");

    match result.file.entries.first() {
        Some(HeaderEntry::Class(class)) => assert_eq!(class.entries.len(), 1),
        other => panic!("expected class A, found {:?}", other),
    }
}

#[test]
fn test_stray_close_brace() {
    let result = parse_header("}; class A {};", "test.hpp");

    assert_eq!(result.diagnostics.len(), 1);
    assert!(result.file.find_class("A").is_some());
}

#[test]
fn test_serializes_to_json() {
    let result = parse_header("class A { x = 1; };", "test.hpp");
    let json = serde_json::to_value(&result.file).unwrap();

    assert_eq!(json["entries"][0]["kind"], "class");
    assert_eq!(json["entries"][0]["entries"][0]["value"]["type"], "number");
}
