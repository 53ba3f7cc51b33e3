//! Unit tests for value types and tree traversal.

use pretty_assertions::assert_eq;

use super::{
    ast::Node,
    expressions::{ErrorNode, Expr, Literal, LiteralExpr},
    statements::{ExpressionStmt, Program, Stmt},
    types::{ExpandedValueType, Lookup, ValueType},
};
use crate::{errors::errors::ValueTypeError, Span};

fn expanded(unbounded: bool, value_types: Vec<ValueType>) -> ValueType {
    ValueType::Expanded(ExpandedValueType::new(unbounded, value_types))
}

#[test]
fn test_identical_expanded_types_are_equal() {
    let a = expanded(false, vec![ValueType::NUMBER, ValueType::STRING]);
    let b = expanded(false, vec![ValueType::NUMBER, ValueType::STRING]);
    assert_eq!(a, b);

    let reordered = expanded(false, vec![ValueType::STRING, ValueType::NUMBER]);
    assert_ne!(a, reordered);

    let unbounded = expanded(true, vec![ValueType::NUMBER, ValueType::STRING]);
    assert_ne!(a, unbounded);
}

#[test]
fn test_single_slot_equals_primitive_both_directions() {
    let single = expanded(false, vec![ValueType::NUMBER]);

    assert_eq!(single, ValueType::NUMBER);
    assert_eq!(ValueType::NUMBER, single);
    assert_ne!(single, ValueType::STRING);
    assert_ne!(ValueType::STRING, single);
}

#[test]
fn test_empty_expanded_equals_array_both_directions() {
    let any_array = expanded(true, vec![]);
    let empty_array = expanded(false, vec![]);

    assert_eq!(any_array, ValueType::ARRAY);
    assert_eq!(ValueType::ARRAY, any_array);
    assert_eq!(empty_array, ValueType::ARRAY);
    assert_eq!(ValueType::ARRAY, empty_array);
    assert_ne!(any_array, ValueType::NUMBER);
}

#[test]
fn test_multi_slot_never_equals_primitive() {
    let pair = expanded(false, vec![ValueType::NUMBER, ValueType::NUMBER]);
    assert_ne!(pair, ValueType::NUMBER);
    assert_ne!(ValueType::ARRAY, pair);
}

#[test]
fn test_is_array_flags() {
    let empty = ExpandedValueType::new(false, vec![]);
    assert!(empty.is_array());
    assert!(empty.is_empty_array());
    assert!(!empty.is_unbounded());

    let unbounded_empty = ExpandedValueType::new(true, vec![]);
    assert!(unbounded_empty.is_array());
    assert!(!unbounded_empty.is_empty_array());

    let single = ExpandedValueType::new(false, vec![ValueType::NUMBER]);
    assert!(!single.is_array());

    let repeating = ExpandedValueType::new(true, vec![ValueType::NUMBER]);
    assert!(repeating.is_array());
}

#[test]
fn test_value_types_are_live() {
    let mut value_type = ExpandedValueType::new(false, vec![ValueType::NUMBER]);
    value_type.get_value_types_mut().push(ValueType::STRING);
    value_type.add_value_type(ValueType::BOOLEAN);

    assert_eq!(
        value_type.get_value_types(),
        &[ValueType::NUMBER, ValueType::STRING, ValueType::BOOLEAN]
    );
    assert_eq!(value_type.get_display_name(), "[Number, String, Boolean]");
}

#[test]
fn test_negative_optional_count_is_rejected() {
    let mut value_type = ExpandedValueType::new(false, vec![ValueType::NUMBER]);

    for n in [-1, -2, i64::MIN] {
        assert_eq!(
            value_type.set_num_optional_values(n),
            Err(ValueTypeError::InvalidArgument(n))
        );
    }
    assert_eq!(value_type.get_num_optional_values(), 0);
}

#[test]
fn test_optional_count_at_or_above_len_makes_all_optional() {
    let mut value_type =
        ExpandedValueType::new(false, vec![ValueType::NUMBER, ValueType::NUMBER]);

    assert_eq!(value_type.set_num_optional_values(2), Ok(()));
    assert_eq!(value_type.required_count(), 0);

    assert_eq!(value_type.set_num_optional_values(7), Ok(()));
    assert_eq!(value_type.get_num_optional_values(), 7);
    assert_eq!(value_type.required_count(), 0);

    let expected = ValueType::Expanded(value_type);
    assert!(expected.accepts(&expanded(false, vec![])));
    assert!(expected.accepts(&expanded(
        false,
        vec![ValueType::NUMBER, ValueType::NUMBER]
    )));
}

#[test]
fn test_accepts_with_optional_trailing_slots() {
    let mut slots = ExpandedValueType::new(
        false,
        vec![ValueType::NUMBER, ValueType::NUMBER, ValueType::STRING],
    );
    slots.set_num_optional_values(1).unwrap();
    let expected = ValueType::Expanded(slots);

    assert!(expected.accepts(&expanded(
        false,
        vec![ValueType::NUMBER, ValueType::NUMBER]
    )));
    assert!(expected.accepts(&expanded(
        false,
        vec![ValueType::NUMBER, ValueType::NUMBER, ValueType::STRING]
    )));
    assert!(!expected.accepts(&expanded(
        false,
        vec![ValueType::NUMBER, ValueType::STRING]
    )));
    assert!(!expected.accepts(&expanded(
        false,
        vec![
            ValueType::NUMBER,
            ValueType::NUMBER,
            ValueType::STRING,
            ValueType::STRING
        ]
    )));
}

#[test]
fn test_accepts_unbounded_repeats_last_slot() {
    let expected = expanded(true, vec![ValueType::STRING, ValueType::NUMBER]);

    assert!(expected.accepts(&expanded(
        false,
        vec![ValueType::STRING, ValueType::NUMBER, ValueType::NUMBER, ValueType::NUMBER]
    )));
    assert!(!expected.accepts(&expanded(
        false,
        vec![ValueType::STRING, ValueType::NUMBER, ValueType::STRING]
    )));
}

#[test]
fn test_accepts_any_and_generic_array() {
    let position = ValueType::Primitive(Lookup::Position3D);

    assert!(position.accepts(&ValueType::ANY));
    assert!(ValueType::ANY.accepts(&ValueType::STRING));
    assert!(position.accepts(&ValueType::ARRAY));
    assert!(position.accepts(&expanded(
        false,
        vec![ValueType::NUMBER, ValueType::NUMBER, ValueType::NUMBER]
    )));
    assert!(!position.accepts(&ValueType::NUMBER));
    assert!(ValueType::ARRAY.accepts(&position));
    assert!(!ValueType::NUMBER.accepts(&ValueType::STRING));
}

#[test]
fn test_lookup_from_str() {
    assert_eq!("number".parse::<Lookup>(), Ok(Lookup::Number));
    assert_eq!("SCALAR".parse::<Lookup>(), Ok(Lookup::Number));
    assert_eq!("Structured Text".parse::<Lookup>(), Ok(Lookup::StructuredText));
    assert_eq!("position_3d".parse::<Lookup>(), Ok(Lookup::Position3D));
    assert_eq!("widget".parse::<Lookup>(), Err("widget".to_string()));
}

#[test]
fn test_compound_expansion() {
    let expanded = Lookup::ColorRgba.get_expanded();
    assert_eq!(expanded.get_value_types().len(), 4);
    assert!(expanded.is_array());
    assert_eq!(Lookup::Number.get_expanded().get_value_types(), &[ValueType::NUMBER]);
}

#[test]
fn test_walk_finds_error_nodes() {
    let program = Program {
        statements: vec![
            Stmt::Expression(ExpressionStmt {
                expression: Expr::Literal(LiteralExpr {
                    value: Literal::Number(1.0),
                    span: Span::new(0, 1),
                }),
                span: Span::new(0, 1),
            }),
            Stmt::Error(ErrorNode {
                span: Span::new(3, 5),
            }),
        ],
        span: Span::new(0, 5),
    };

    let node = Node::Program(&program);
    assert_eq!(node.children().len(), 2);
    assert_eq!(node.error_spans(), vec![Span::new(3, 5)]);
    assert!(program.has_errors());
}
