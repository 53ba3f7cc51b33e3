//! End-to-end tests running source text through the lexer, parser and
//! checker with the bundled command table.

use pretty_assertions::assert_eq;
use sqf_frontend::{
    ast::{
        ast::Node,
        expressions::Expr,
        statements::{ControlStmt, Stmt},
        types::{ExpandedValueType, Lookup, ValueType},
    },
    check_source,
    commands::signatures::{Arity, CommandTable},
    errors::errors::{DiagnosticKind, Severity},
    header::parser::parse_header,
    parse_source,
    type_checker::type_checker::{type_check, CheckerConfig},
    Span,
};

#[test]
fn test_if_then_else_is_clean() {
    assert_eq!(check_source("if (true) then {1} else {2};", "test.sqf"), vec![]);
}

#[test]
fn test_case_with_nothing_after_colon() {
    let parsed = parse_source("case : ;", "test.sqf");
    assert_eq!(parsed.diagnostics, vec![]);

    match &parsed.program.statements[0] {
        Stmt::Control(ControlStmt::Case(case)) => {
            assert!(case.get_condition().is_none());
            assert!(case.get_block().is_none());
        }
        other => panic!("expected a case statement, found {:?}", other),
    }
    assert_eq!(check_source("case : ;", "test.sqf"), vec![]);
}

#[test]
fn test_unknown_command() {
    let diagnostics = check_source("foobar 5;", "test.sqf");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].get_kind(),
        &DiagnosticKind::UnknownCommand {
            command: "foobar".to_string()
        }
    );
    assert_eq!(diagnostics[0].get_range(), (0, 6));
    assert_eq!(diagnostics[0].get_severity(), Severity::Error);
}

#[test]
fn test_mod_with_string_operand() {
    let diagnostics = check_source("\"a\" mod 2;", "test.sqf");

    assert_eq!(diagnostics.len(), 1);
    match diagnostics[0].get_kind() {
        DiagnosticKind::NoApplicableOverload {
            command, argument, ..
        } => {
            assert_eq!(command, "mod");
            assert_eq!(*argument, Some(0));
        }
        other => panic!("unexpected diagnostic {:?}", other),
    }
}

#[test]
fn test_truncated_if_still_yields_a_tree() {
    let parsed = parse_source("if (", "test.sqf");

    assert!(parsed.diagnostics.iter().any(|d| d.is_syntax_error()));
    assert_eq!(parsed.program.statements.len(), 1);
    assert!(parsed.program.has_errors());

    match &parsed.program.statements[0] {
        Stmt::Control(ControlStmt::If(stmt)) => {
            assert!(stmt.get_condition().is_none());
            assert!(matches!(stmt.get_then(), Expr::Error(_)));
        }
        other => panic!("expected an if statement, found {:?}", other),
    }

    // The checker runs on the partial tree without panicking
    let diagnostics = check_source("if (", "test.sqf");
    assert!(diagnostics.len() >= 2);
}

#[test]
fn test_checking_is_repeatable() {
    let source = "private _a = [1, \"b\"]; hint str (_a select 0); foo 1; if (1) then {};";

    let first = check_source(source, "test.sqf");
    let second = check_source(source, "test.sqf");
    assert_eq!(first, second);
    assert_eq!(parse_source(source, "test.sqf"), parse_source(source, "test.sqf"));
}

#[test]
fn test_every_error_node_is_covered_by_a_diagnostic() {
    let source = "hint 1 +; _a = ; if (true) then {";
    let parsed = parse_source(source, "test.sqf");

    for span in parsed.program.as_node().error_spans() {
        assert!(
            parsed
                .diagnostics
                .iter()
                .any(|d| d.get_span().start >= span.start.saturating_sub(1)
                    && d.get_span().start <= span.end + 1),
            "no diagnostic near error node at {:?}",
            span
        );
    }
}

#[test]
fn test_children_are_in_source_order() {
    let parsed = parse_source("a = 1 + 2 * 3; if (b) then {c} else {d};", "test.sqf");

    let mut starts = vec![];
    parsed.program.as_node().walk(&mut |node: Node| {
        starts.push(node.span().start);
    });

    assert!(starts.len() > 10);
    for pair in starts.windows(2) {
        assert!(pair[0] <= pair[1], "out of order: {:?}", starts);
    }
}

#[test]
fn test_unknown_command_lookup_is_empty() {
    let table = CommandTable::global();

    assert!(table.lookup("definitelyNotACommand", Arity::Unary).is_empty());
    assert!(!table.lookup("HINT", Arity::Unary).is_empty());
}

#[test]
fn test_value_type_equality_is_symmetric() {
    let single = ValueType::Expanded(ExpandedValueType::new(false, vec![ValueType::NUMBER]));
    let empty = ValueType::Expanded(ExpandedValueType::empty_array());

    assert_eq!(single, ValueType::NUMBER);
    assert_eq!(ValueType::NUMBER, single);
    assert_eq!(empty, ValueType::ARRAY);
    assert_eq!(ValueType::ARRAY, empty);
    assert_eq!(ValueType::Primitive(Lookup::Position3D).get_expanded().get_value_types().len(), 3);
}

#[test]
fn test_functions_from_header_are_known() {
    let header = parse_header(
        "class CfgFunctions { class TAG { class Core { class spawnUnit {}; }; }; };",
        "description.ext",
    );
    let mut config = CheckerConfig::default();
    for function in header.file.config_functions() {
        config.add_function(&function.full_name());
    }

    let parsed = parse_source("[player] call TAG_fnc_spawnUnit;", "init.sqf");
    let checked = type_check(&parsed.program, CommandTable::global(), &config, "init.sqf");

    assert_eq!(checked.diagnostics, vec![]);
}

#[test]
fn test_diagnostic_rendering() {
    let source = "hint 1;\nfoobar 5;";
    let diagnostics = check_source(source, "test.sqf");

    let rendered: Vec<String> = diagnostics.iter().map(|d| d.render(source)).collect();
    assert_eq!(rendered.len(), 2);
    assert!(rendered[1].contains("foobar 5;"));
    assert_eq!(diagnostics[1].get_span(), Span::new(8, 14));
}

#[test]
fn test_deep_nesting_is_reported_not_fatal() {
    let depth = 1000;
    let source = format!("hint str {}1{};", "(".repeat(depth), ")".repeat(depth));
    let diagnostics = check_source(&source, "test.sqf");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].get_error_name(), "NestingTooDeep");
    assert!(diagnostics[0].is_syntax_error());
}
