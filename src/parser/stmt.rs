use crate::{
    ast::{
        expressions::{CodeBlock, ErrorNode, Expr, VariableExpr},
        statements::{
            AssignmentStmt, CaseStmt, ControlStmt, ExpressionStmt, ForHeader, ForStmt, IfKind,
            IfStmt, Stmt, SwitchStmt, WhileStmt,
        },
    },
    errors::errors::Diagnostic,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{expr::parse_code_block, parser::Parser};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Diagnostic> {
    let kind = parser.current_token_kind();
    if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
        return handler(parser);
    }

    if kind == TokenKind::Identifier && parser.peek(1).kind == TokenKind::Assignment {
        let start = parser.current_token().span;
        return parse_assignment(parser, false, start);
    }

    let expression = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt::Expression(ExpressionStmt {
        span: expression.span(),
        expression,
    }))
}

/// `private _x = value`, or `private` used as a command (`private "_x"`).
pub fn parse_private_stmt(parser: &mut Parser) -> Result<Stmt, Diagnostic> {
    if parser.peek(1).kind == TokenKind::Identifier && parser.peek(2).kind == TokenKind::Assignment {
        let start = parser.advance().span;
        return parse_assignment(parser, true, start);
    }

    let expression = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt::Expression(ExpressionStmt {
        span: expression.span(),
        expression,
    }))
}

fn parse_assignment(parser: &mut Parser, is_private: bool, start: Span) -> Result<Stmt, Diagnostic> {
    let name = parser.advance().clone();
    parser.expect_detailed(TokenKind::Assignment, "expected `=`")?;
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt::Assignment(AssignmentStmt {
        is_private,
        target: VariableExpr {
            name: name.value,
            span: name.span,
        },
        span: start.to(value.span()),
        value,
    }))
}

pub fn parse_control_stmt(parser: &mut Parser) -> Result<Stmt, Diagnostic> {
    Ok(Stmt::Control(parse_control(parser)))
}

/// Parses the control construct starting at the current keyword.
///
/// Never fails. Parts that cannot be parsed are reported and left absent so
/// the construct keeps its shape.
pub fn parse_control(parser: &mut Parser) -> ControlStmt {
    match parser.current_token_kind() {
        TokenKind::If => ControlStmt::If(parse_if(parser)),
        TokenKind::While => ControlStmt::While(parse_while(parser)),
        TokenKind::For => ControlStmt::For(parse_for(parser)),
        TokenKind::Switch => ControlStmt::Switch(parse_switch(parser)),
        _ => ControlStmt::Case(parse_case(parser)),
    }
}

/// Parses an expression, reporting a failure instead of returning it.
fn parse_part(parser: &mut Parser, bp: BindingPower) -> Option<Expr> {
    match parse_expr(parser, bp) {
        Ok(expr) => Some(expr),
        Err(diagnostic) => {
            parser.report(diagnostic);
            None
        }
    }
}

/// Like `parse_part`, but leaves a placeholder where the expression failed.
fn parse_branch(parser: &mut Parser) -> Expr {
    match parse_expr(parser, BindingPower::Unary) {
        Ok(expr) => expr,
        Err(diagnostic) => {
            let span = diagnostic.get_span();
            parser.report(diagnostic);
            Expr::Error(ErrorNode { span })
        }
    }
}

fn parse_block_part(parser: &mut Parser, message: &str) -> Option<CodeBlock> {
    if parser.current_token_kind() == TokenKind::OpenCurly {
        return Some(parse_code_block(parser));
    }

    let diagnostic = parser.unexpected(message);
    parser.report(diagnostic);
    None
}

/// `do {..}` ending `while`, `for` and `switch`.
fn parse_do_body(parser: &mut Parser) -> Option<CodeBlock> {
    if parser.current_token_kind() != TokenKind::Do {
        let diagnostic = parser.unexpected("expected `do`");
        parser.report(diagnostic);
        return None;
    }

    parser.advance();
    parse_block_part(parser, "expected `{` after `do`")
}

fn parse_if(parser: &mut Parser) -> IfStmt {
    let start = parser.advance().span;

    let condition = parse_part(parser, BindingPower::Unary);
    if condition.is_none() {
        parser.skip_until(&[TokenKind::Then, TokenKind::ExitWith]);
    }

    let (kind, then_branch) = match parser.current_token_kind() {
        TokenKind::Then => {
            parser.advance();
            (IfKind::Then, parse_branch(parser))
        }
        TokenKind::ExitWith => {
            parser.advance();
            (IfKind::ExitWith, parse_branch(parser))
        }
        _ => {
            // A broken condition was already reported.
            if condition.is_some() {
                let diagnostic = parser.unexpected("expected `then` or `exitWith`");
                parser.report(diagnostic);
            }
            let at = parser.current_token().span.start;
            (IfKind::Then, Expr::Error(ErrorNode { span: Span::new(at, at) }))
        }
    };

    let else_branch = if kind == IfKind::Then && parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(parse_branch(parser))
    } else {
        None
    };

    IfStmt {
        condition,
        kind,
        then_branch,
        else_branch,
        span: parser.span_from(start),
    }
}

fn parse_while(parser: &mut Parser) -> WhileStmt {
    let start = parser.advance().span;

    let condition = parse_part(parser, BindingPower::Unary);
    if condition.is_none() {
        parser.skip_until(&[TokenKind::Do]);
    }
    let body = parse_do_body(parser);

    WhileStmt {
        condition,
        body,
        span: parser.span_from(start),
    }
}

fn parse_for(parser: &mut Parser) -> ForStmt {
    let start = parser.advance().span;

    let header = match parser.current_token_kind() {
        TokenKind::String => parse_for_range(parser),
        TokenKind::OpenBracket => parse_for_classic(parser),
        _ => {
            let diagnostic = parser.unexpected("expected a loop variable or `[`");
            parser.report(diagnostic);
            parser.skip_until(&[TokenKind::Do]);
            ForHeader::Missing
        }
    };
    let body = parse_do_body(parser);

    ForStmt {
        header,
        body,
        span: parser.span_from(start),
    }
}

/// `"_i" from A to B [step C]`
fn parse_for_range(parser: &mut Parser) -> ForHeader {
    let token = parser.advance().clone();
    let variable = Some(VariableExpr {
        name: token.value,
        span: token.span,
    });

    let mut parts = [None, None, None];
    let keywords = [
        (TokenKind::From, "expected `from`"),
        (TokenKind::To, "expected `to`"),
        (TokenKind::Step, ""),
    ];

    for (index, (keyword, message)) in keywords.iter().enumerate() {
        if parser.current_token_kind() != *keyword {
            // `step` is optional
            if *keyword != TokenKind::Step {
                let diagnostic = parser.unexpected(message);
                parser.report(diagnostic);
                parser.skip_until(&[TokenKind::Do]);
            }
            break;
        }

        parser.advance();
        parts[index] = parse_part(parser, BindingPower::BinaryCommand);
        if parts[index].is_none() {
            parser.skip_until(&[TokenKind::Do]);
            break;
        }
    }

    let [from, to, step] = parts;
    ForHeader::Range {
        variable,
        from,
        to,
        step,
    }
}

/// `[{init}, {condition}, {step}]`
fn parse_for_classic(parser: &mut Parser) -> ForHeader {
    match parse_part(parser, BindingPower::Unary) {
        Some(Expr::Array(array)) => {
            let mut elements = array.elements.into_iter();
            ForHeader::Classic {
                init: elements.next(),
                condition: elements.next(),
                step: elements.next(),
            }
        }
        _ => {
            parser.skip_until(&[TokenKind::Do]);
            ForHeader::Missing
        }
    }
}

fn parse_switch(parser: &mut Parser) -> SwitchStmt {
    let start = parser.advance().span;

    let subject = parse_part(parser, BindingPower::Unary);
    if subject.is_none() {
        parser.skip_until(&[TokenKind::Do]);
    }
    let body = parse_do_body(parser);

    SwitchStmt {
        subject,
        body,
        span: parser.span_from(start),
    }
}

/// `case [COND] [: [{..}]]` and `default [:] [{..}]`. Both the condition
/// and the block may be left out.
fn parse_case(parser: &mut Parser) -> CaseStmt {
    let keyword = parser.advance().clone();
    let is_default = keyword.kind == TokenKind::Default;

    let condition = match parser.current_token_kind() {
        _ if is_default => None,
        TokenKind::Colon
        | TokenKind::Semicolon
        | TokenKind::Comma
        | TokenKind::CloseCurly
        | TokenKind::EOF => None,
        _ => {
            let condition = parse_part(parser, BindingPower::Default);
            if condition.is_none() {
                parser.skip_until(&[TokenKind::Colon]);
            }
            condition
        }
    };

    if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
    }

    let block = match parser.current_token_kind() {
        TokenKind::OpenCurly => Some(parse_code_block(parser)),
        _ => None,
    };

    CaseStmt {
        condition,
        block,
        is_default,
        span: parser.span_from(keyword.span),
    }
}
