use crate::{
    ast::{
        expressions::{
            ArrayExpr, BinaryExpr, CodeBlock, CommandName, ErrorNode, Expr, Literal, LiteralExpr,
            UnaryExpr, VariableExpr,
        },
        statements::Stmt,
    },
    errors::errors::{Diagnostic, DiagnosticKind},
    lexer::tokens::TokenKind,
};

use super::{
    lookups::BindingPower,
    parser::{Parser, MAX_NESTING_DEPTH},
    stmt::parse_control,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Diagnostic> {
    if parser.get_depth() >= MAX_NESTING_DEPTH {
        let span = parser.skip_nested();
        return Ok(Expr::Error(ErrorNode { span }));
    }

    parser.enter_nested();
    let result = parse_nested_expr(parser, bp);
    parser.leave_nested();
    result
}

fn parse_nested_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Diagnostic> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected("expected an expression")),
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let current_bp = parser.current_binding_power();
        if current_bp <= bp {
            break;
        }

        let token_kind = parser.current_token_kind();
        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => break,
        };

        left = led(parser, left, current_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Diagnostic> {
    let token = parser.current_token().clone();

    match token.kind {
        TokenKind::Number => {
            let value = parse_number(&token.value).ok_or_else(|| {
                parser.error(
                    DiagnosticKind::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.span,
                )
            })?;
            parser.advance();

            Ok(Expr::Literal(LiteralExpr {
                value: Literal::Number(value),
                span: token.span,
            }))
        }
        TokenKind::String => {
            parser.advance();
            Ok(Expr::Literal(LiteralExpr {
                value: Literal::String(token.value),
                span: token.span,
            }))
        }
        _ => Err(parser.unexpected("expected a literal")),
    }
}

/// Decimal, `0x` hex and `$` hex numbers.
pub fn parse_number(text: &str) -> Option<f64> {
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('$'));

    match hex {
        Some(digits) => u64::from_str_radix(digits, 16).ok().map(|value| value as f64),
        None => text.parse().ok(),
    }
}

/// A name in operand position: either a unary command applied to the
/// operand that follows, or a variable / nular reference.
pub fn parse_identifier_expr(parser: &mut Parser) -> Result<Expr, Diagnostic> {
    let token = parser.advance().clone();

    if !token.value.starts_with('_') && parser.starts_operand(0) {
        let operand = parse_expr(parser, BindingPower::Unary)?;
        return Ok(Expr::Unary(UnaryExpr {
            span: token.span.to(operand.span()),
            command: CommandName {
                name: token.value,
                span: token.span,
            },
            operand: Box::new(operand),
        }));
    }

    Ok(Expr::Variable(VariableExpr {
        name: token.value,
        span: token.span,
    }))
}

/// `!x`, `not x`, `-x`, `+x` and `private "_x"`.
pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Diagnostic> {
    let operator_token = parser.advance().clone();
    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::Unary(UnaryExpr {
        span: operator_token.span.to(operand.span()),
        command: CommandName {
            name: operator_token.value,
            span: operator_token.span,
        },
        operand: Box::new(operand),
    }))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Diagnostic> {
    let operator_token = parser.advance().clone();
    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(BinaryExpr {
        span: left.span().to(right.span()),
        left: Box::new(left),
        command: CommandName {
            name: operator_token.value,
            span: operator_token.span,
        },
        right: Box::new(right),
    }))
}

/// `&&`, `and`, `||`, `or`.
pub fn parse_bool_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Diagnostic> {
    let operator_token = parser.advance().clone();
    let right = parse_expr(parser, bp)?;

    let expr = BinaryExpr {
        span: left.span().to(right.span()),
        left: Box::new(left),
        command: CommandName {
            name: operator_token.value,
            span: operator_token.span,
        },
        right: Box::new(right),
    };

    Ok(match operator_token.kind {
        TokenKind::And => Expr::BoolAnd(expr),
        _ => Expr::BoolOr(expr),
    })
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Diagnostic> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseParen, "expected `)`")?;

    Ok(expr)
}

pub fn parse_array_expr(parser: &mut Parser) -> Result<Expr, Diagnostic> {
    let start = parser.advance().span;
    let mut elements = vec![];

    while parser.current_token_kind() != TokenKind::CloseBracket {
        elements.push(parse_expr(parser, BindingPower::Default)?);

        match parser.current_token_kind() {
            TokenKind::Comma => {
                parser.advance();
            }
            TokenKind::CloseBracket => break,
            _ => return Err(parser.unexpected("expected `,` or `]`")),
        }
    }
    parser.advance();

    Ok(Expr::Array(ArrayExpr {
        elements,
        span: parser.span_from(start),
    }))
}

/// Parses `{ ... }`. Never fails: problems inside the block are reported
/// and a missing `}` is reported at the end of input.
pub fn parse_code_block(parser: &mut Parser) -> CodeBlock {
    if parser.get_depth() >= MAX_NESTING_DEPTH {
        return skip_nested_code_block(parser);
    }

    let start = parser.advance().span;
    let id = parser.advance_id();
    parser.enter_nested();
    let statements = parser.parse_statements(TokenKind::CloseCurly);
    parser.leave_nested();

    if parser.current_token_kind() == TokenKind::CloseCurly {
        parser.advance();
    } else {
        let diagnostic = parser.unexpected("expected `}`");
        parser.report(diagnostic);
    }

    CodeBlock {
        statements,
        id,
        span: parser.span_from(start),
    }
}

/// Replaces a block nested too deeply with one holding a single error
/// placeholder, consuming everything up to its `}`.
fn skip_nested_code_block(parser: &mut Parser) -> CodeBlock {
    let start = parser.current_token().span;
    let id = parser.advance_id();
    let span = parser.skip_nested();

    CodeBlock {
        statements: vec![Stmt::Error(ErrorNode { span })],
        id,
        span: span.to(start),
    }
}

pub fn parse_code_block_expr(parser: &mut Parser) -> Result<Expr, Diagnostic> {
    Ok(Expr::CodeBlock(parse_code_block(parser)))
}

pub fn parse_control_expr(parser: &mut Parser) -> Result<Expr, Diagnostic> {
    Ok(Expr::Control(Box::new(parse_control(parser))))
}
