use pretty_assertions::assert_eq;

use crate::{
    ast::types::{ExpandedValueType, ValueType},
    commands::signatures::CommandTable,
    errors::errors::{Diagnostic, DiagnosticKind},
    parse_source, Span,
};

use super::type_checker::{infer_array_type, type_check, CheckResult, CheckerConfig};

fn check_with(source: &str, config: &CheckerConfig) -> CheckResult {
    let parsed = parse_source(source, "test.sqf");
    assert!(
        parsed.diagnostics.is_empty(),
        "unexpected syntax errors: {:?}",
        parsed.diagnostics
    );
    type_check(&parsed.program, CommandTable::global(), config, "test.sqf")
}

fn check(source: &str) -> Vec<Diagnostic> {
    check_with(source, &CheckerConfig::default()).diagnostics
}

fn kinds(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.get_error_name()).collect()
}

#[test]
fn test_valid_script() {
    let source = r#"
        private _list = [1, 2, 3];
        private _total = 0;
        {
            _total = _total + _x;
        } forEach _list;
        hint str count _list;
        hint format ["%1 of %2", _total, count _list];
        if (alive player && {_total > 3}) then {
            player setPos getPos player;
        };
    "#;

    assert_eq!(check(source), vec![]);
}

#[test]
fn test_if_then_else() {
    assert_eq!(check("if (true) then {1} else {2};"), vec![]);
}

#[test]
fn test_unknown_command() {
    let diagnostics = check("foobar 5;");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].get_kind(),
        &DiagnosticKind::UnknownCommand {
            command: "foobar".to_string()
        }
    );
    assert_eq!(diagnostics[0].get_span(), Span::new(0, 6));
}

#[test]
fn test_no_applicable_overload() {
    let diagnostics = check("\"a\" mod 2;");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].get_kind(),
        &DiagnosticKind::NoApplicableOverload {
            command: "mod".to_string(),
            argument: Some(0),
            expected: "Number".to_string(),
            received: "String".to_string(),
        }
    );
    // Points at the offending operand
    assert_eq!(diagnostics[0].get_span(), Span::new(0, 3));
}

#[test]
fn test_closest_overload_is_reported() {
    // `+` has String + String; the right operand is the mismatch.
    let diagnostics = check("\"a\" + 1;");

    assert_eq!(diagnostics.len(), 1);
    match diagnostics[0].get_kind() {
        DiagnosticKind::NoApplicableOverload {
            argument, expected, ..
        } => {
            assert_eq!(*argument, Some(1));
            assert_eq!(expected, "String");
        }
        other => panic!("unexpected diagnostic {:?}", other),
    }
}

#[test]
fn test_unsupported_arity() {
    let diagnostics = check("hint;");

    assert_eq!(
        diagnostics[0].get_kind(),
        &DiagnosticKind::UnsupportedArity {
            command: "hint".to_string(),
            arity: "nular".to_string()
        }
    );
}

#[test]
fn test_result_types_flow_through_commands() {
    // str returns String, so hint accepts it; count returns Number, so hint
    // does not.
    assert_eq!(check("hint str 5;"), vec![]);
    assert_eq!(kinds(&check("hint count [1, 2];")), vec!["NoApplicableOverload"]);
}

#[test]
fn test_diagnostics_in_source_order() {
    let diagnostics = check("foo 1; bar 2; \"x\" mod 1;");

    let starts: Vec<u32> = diagnostics.iter().map(|d| d.get_span().start).collect();
    assert_eq!(starts, vec![0, 7, 14]);
}

#[test]
fn test_if_condition_must_be_boolean() {
    let diagnostics = check("if (5) then {1};");

    assert_eq!(
        diagnostics[0].get_kind(),
        &DiagnosticKind::TypeMatchError {
            expected: "Boolean".to_string(),
            received: "Number".to_string()
        }
    );
}

#[test]
fn test_while_condition() {
    assert_eq!(check("private _i = 0; while {_i < 10} do {_i = _i + 1};"), vec![]);
    assert_eq!(kinds(&check("while {5} do {};")), vec!["TypeMatchError"]);
}

#[test]
fn test_for_loops() {
    assert_eq!(check("for \"_i\" from 0 to 10 step 2 do { hint str _i; };"), vec![]);
    assert_eq!(
        check("for [{private _i = 0}, {_i < 10}, {_i = _i + 1}] do { hint str _i; };"),
        vec![]
    );
    assert_eq!(kinds(&check("for \"_i\" from \"a\" to 10 do {};")), vec!["TypeMatchError"]);
}

#[test]
fn test_case_without_condition_or_block() {
    assert_eq!(check("case : ;"), vec![]);
    assert_eq!(check("switch (1) do { case 1: {}; default {}; };"), vec![]);
}

#[test]
fn test_missing_parts_are_reported_on_construct() {
    let parsed = parse_source("if (", "test.sqf");
    let checked = type_check(
        &parsed.program,
        CommandTable::global(),
        &CheckerConfig::default(),
        "test.sqf",
    );

    assert_eq!(kinds(&checked.diagnostics), vec!["MissingCondition"]);
    assert_eq!(checked.diagnostics[0].get_span().start, 0);
}

#[test]
fn test_undefined_locals() {
    let source = "hint str _missing;";
    assert_eq!(check(source), vec![]);

    let config = CheckerConfig {
        warn_undefined_locals: true,
        ..Default::default()
    };
    let diagnostics = check_with(source, &config).diagnostics;

    assert_eq!(kinds(&diagnostics), vec!["UndefinedVariable"]);
    assert!(!diagnostics[0].is_syntax_error());
}

#[test]
fn test_declared_locals_are_not_reported() {
    let config = CheckerConfig {
        warn_undefined_locals: true,
        ..Default::default()
    };
    let source = r#"
        params ["_unit", ["_delay", 0]];
        private "_name";
        private _other;
        _name = str _unit;
        { hint str [_x, _forEachIndex, _delay, _other]; } forEach [1, 2];
    "#;

    assert_eq!(check_with(source, &config).diagnostics, vec![]);
}

#[test]
fn test_scopes_are_nested() {
    let config = CheckerConfig {
        warn_undefined_locals: true,
        ..Default::default()
    };
    let source = "call { private _inner = 1; }; hint str _inner;";
    let result = check_with(source, &config);

    assert_eq!(kinds(&result.diagnostics), vec!["UndefinedVariable"]);
    // Program scope plus the block
    assert_eq!(result.scopes.len(), 2);
}

#[test]
fn test_assignment_rebinds_outer_local() {
    let source = "private _a = 1; call { _a = \"text\"; }; hint _a;";
    let result = check_with(source, &CheckerConfig::default());

    assert_eq!(result.diagnostics, vec![]);
    let root = result.scopes.get(0);
    assert_eq!(root.get_variable("_A"), Some(&ValueType::STRING));
}

#[test]
fn test_known_functions() {
    let mut config = CheckerConfig::default();
    config.add_function("TAG_fnc_spawn");

    assert_eq!(check_with("[] call TAG_fnc_spawn;", &config).diagnostics, vec![]);
    assert_eq!(
        kinds(&check_with("hint TAG_fnc_spawn;", &config).diagnostics),
        vec!["NoApplicableOverload"]
    );
}

#[test]
fn test_array_inference() {
    assert_eq!(
        infer_array_type(vec![]),
        ValueType::Expanded(ExpandedValueType::empty_array())
    );
    assert_eq!(infer_array_type(vec![ValueType::NUMBER]), ValueType::ARRAY);
    assert_eq!(
        infer_array_type(vec![ValueType::NUMBER, ValueType::STRING]),
        ValueType::Expanded(ExpandedValueType::new(
            false,
            vec![ValueType::NUMBER, ValueType::STRING]
        ))
    );
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: CheckerConfig =
        serde_json::from_str(r#"{"warn_undefined_locals": true}"#).unwrap();

    assert!(config.warn_undefined_locals);
    assert!(config.known_functions.is_empty());
}
