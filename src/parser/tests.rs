//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Operator precedence and comparison chains
//! - Bracket disambiguation, comprehensions and string atoms
//! - Assignment targets and simple statements
//! - Compound statements, parameters, type parameters and `match`
//! - Views, HTML elements and interpolations
//! - Error reporting, recovery and the depth limit

use crate::{
    ast::{
        ast::{BinaryOp, BoolOperator, CompareOp, Module, UnaryOp},
        expressions::{ArgumentKind, Expr, FStringPart, LiteralValue, ParameterKind},
        html::{ElementKind, HtmlContentPart, HtmlElement},
        patterns::Pattern,
        statements::{Stmt, TypeParamKind},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{lexer::tokenize, tokens::TokenKind},
    parse_source,
};

use super::{
    block::BlockFlavor,
    parser::{parse_expression, parse_statement, parse_targets, Parser, ParserOptions},
    targets::parse_star_targets,
};

fn module(source: &str) -> Module {
    match parse_source(source, Some("test.pyv".to_string())) {
        Ok(module) => module,
        Err(errors) => panic!("unexpected errors: {:?}", errors),
    }
}

fn errors(source: &str) -> Vec<Error> {
    parse_source(source, Some("test.pyv".to_string())).unwrap_err()
}

fn first_error(source: &str) -> Error {
    errors(source).remove(0)
}

fn stmt(source: &str) -> Stmt {
    module(source).body.remove(0)
}

fn expr(source: &str) -> Expr {
    let tokens = tokenize(source.to_string(), None).unwrap();
    parse_expression(&tokens, ParserOptions::default()).unwrap()
}

fn expr_error(source: &str) -> Error {
    let tokens = tokenize(source.to_string(), None).unwrap();
    parse_expression(&tokens, ParserOptions::default()).unwrap_err()
}

fn name(expr: &Expr) -> &str {
    match expr {
        Expr::Name(identifier) => &identifier.name,
        other => panic!("expected a name, got {:?}", other),
    }
}

fn view_body(source: &str) -> Vec<Stmt> {
    match stmt(source) {
        Stmt::View { body, .. } => body,
        other => panic!("expected a view, got {:?}", other),
    }
}

fn element(stmt: &Stmt) -> &HtmlElement {
    match stmt {
        Stmt::Html(element) => element,
        other => panic!("expected an element, got {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let Expr::Binary { left, op, right, .. } = expr("a + b * c") else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(name(&left), "a");
    assert!(matches!(*right, Expr::Binary { op: BinaryOp::Multiply, .. }));
}

#[test]
fn test_binary_operators_are_left_associative() {
    let Expr::Binary { left, op, right, .. } = expr("a - b - c") else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, BinaryOp::Subtract);
    assert!(matches!(*left, Expr::Binary { op: BinaryOp::Subtract, .. }));
    assert_eq!(name(&right), "c");
}

#[test]
fn test_bitwise_levels() {
    let Expr::Binary { op, right, .. } = expr("a | b ^ c & d << 1") else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, BinaryOp::BitOr);
    let Expr::Binary { op, right, .. } = *right else {
        panic!("expected '^'");
    };
    assert_eq!(op, BinaryOp::BitXor);
    let Expr::Binary { op, right, .. } = *right else {
        panic!("expected '&'");
    };
    assert_eq!(op, BinaryOp::BitAnd);
    assert!(matches!(*right, Expr::Binary { op: BinaryOp::LeftShift, .. }));
}

#[test]
fn test_unary_minus_wraps_power() {
    let Expr::Unary { op, operand, .. } = expr("-x ** 2") else {
        panic!("expected a unary expression");
    };
    assert_eq!(op, UnaryOp::Negate);
    assert!(matches!(*operand, Expr::Binary { op: BinaryOp::Power, .. }));
}

#[test]
fn test_grouped_unary_is_power_base() {
    let Expr::Binary { left, op, .. } = expr("(-x) ** 2") else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, BinaryOp::Power);
    assert!(matches!(*left, Expr::Group { .. }));
}

#[test]
fn test_power_is_right_associative() {
    let Expr::Binary { left, right, .. } = expr("a ** b ** c") else {
        panic!("expected a binary expression");
    };
    assert_eq!(name(&left), "a");
    assert!(matches!(*right, Expr::Binary { op: BinaryOp::Power, .. }));
}

#[test]
fn test_comparison_chain_becomes_conjunction() {
    let Expr::BoolOp { op, left, right, .. } = expr("a < b <= c") else {
        panic!("expected a boolean operation");
    };
    assert_eq!(op, BoolOperator::And);

    let Expr::Compare { left: a, op: first, right: b, .. } = *left else {
        panic!("expected a comparison");
    };
    assert_eq!((name(&a), first, name(&b)), ("a", CompareOp::Less, "b"));

    let Expr::Compare { left: b, op: second, right: c, .. } = *right else {
        panic!("expected a comparison");
    };
    assert_eq!((name(&b), second, name(&c)), ("b", CompareOp::LessEqual, "c"));
}

#[test]
fn test_composite_comparison_operators() {
    assert!(matches!(expr("a is not b"), Expr::Compare { op: CompareOp::IsNot, .. }));
    assert!(matches!(expr("a not in b"), Expr::Compare { op: CompareOp::NotIn, .. }));
}

#[test]
fn test_boolean_operator_precedence() {
    let Expr::BoolOp { op, right, .. } = expr("a or b and not c") else {
        panic!("expected a boolean operation");
    };
    assert_eq!(op, BoolOperator::Or);
    let Expr::BoolOp { op, right, .. } = *right else {
        panic!("expected 'and'");
    };
    assert_eq!(op, BoolOperator::And);
    assert!(matches!(*right, Expr::Unary { op: UnaryOp::Not, .. }));
}

#[test]
fn test_ternary_lambda_and_walrus() {
    assert!(matches!(expr("a if b else c"), Expr::Ternary { .. }));
    assert!(matches!(expr("(n := 10)"), Expr::Group { .. }));

    let Expr::Lambda { parameters, body, .. } = expr("lambda x, *rest, y=1: x") else {
        panic!("expected a lambda");
    };
    assert_eq!(parameters.parameters.len(), 3);
    assert_eq!(parameters.parameters[1].kind, ParameterKind::VarPositional);
    assert_eq!(name(&body), "x");

    let error = expr_error("a if b");
    assert_eq!(error.message(), "expected 'else' in conditional expression");
}

#[test]
fn test_await_and_accessors() {
    let Expr::Await { value, .. } = expr("await client.fetch(url)[0]") else {
        panic!("expected await");
    };
    let Expr::Subscript { value, .. } = *value else {
        panic!("expected a subscript");
    };
    assert!(matches!(*value, Expr::Call { .. }));
}

#[test]
fn test_call_arguments() {
    let Expr::Call { arguments, .. } = expr("f(a, *b, c=1, **d)") else {
        panic!("expected a call");
    };
    let kinds: Vec<&ArgumentKind> = arguments.iter().map(|argument| &argument.kind).collect();
    assert!(matches!(kinds[0], ArgumentKind::Positional));
    assert!(matches!(kinds[1], ArgumentKind::Star));
    assert!(matches!(kinds[2], ArgumentKind::Keyword(keyword) if keyword.name == "c"));
    assert!(matches!(kinds[3], ArgumentKind::DoubleStar));
}

#[test]
fn test_generator_as_sole_argument() {
    let Expr::Call { arguments, .. } = expr("sum(x for x in xs)") else {
        panic!("expected a call");
    };
    assert_eq!(arguments.len(), 1);
    assert!(matches!(arguments[0].value, Expr::GeneratorExp { .. }));

    let error = expr_error("f(a, x for x in xs)");
    assert_eq!(error.message(), "generator expression must be parenthesized");
}

#[test]
fn test_argument_order_errors() {
    assert_eq!(
        expr_error("f(a=1, b)").message(),
        "positional argument follows keyword argument"
    );
    assert_eq!(expr_error("f(a.b=1)").message(), "unexpected '=' in argument");
    assert_eq!(expr_error("f(a").message(), "expected ')' after arguments");
}

#[test]
fn test_slices() {
    let Expr::Subscript { indices, .. } = expr("a[1:2, ::3, x]") else {
        panic!("expected a subscript");
    };
    assert_eq!(indices.len(), 3);
    assert!(matches!(&indices[0], Expr::Slice { lower: Some(_), upper: Some(_), step: None, .. }));
    assert!(matches!(&indices[1], Expr::Slice { lower: None, upper: None, step: Some(_), .. }));
    assert_eq!(name(&indices[2]), "x");
}

#[test]
fn test_missing_accessor_parts_are_fatal() {
    assert_eq!(expr_error("a.").message(), "expected identifier after '.'");
    assert_eq!(expr_error("a[1").message(), "expected ']' after index");
}

#[test]
fn test_paren_disambiguation() {
    assert!(matches!(expr("()"), Expr::Tuple { elements, .. } if elements.is_empty()));
    assert!(matches!(expr("(x)"), Expr::Group { .. }));
    assert!(matches!(expr("(x,)"), Expr::Tuple { elements, .. } if elements.len() == 1));
    assert!(matches!(expr("(x for x in y)"), Expr::GeneratorExp { .. }));
    assert!(matches!(expr("(x async for x in y)"), Expr::GeneratorExp { .. }));
}

#[test]
fn test_starred_group_is_rejected() {
    let error = expr_error("(*a)");
    assert_eq!(error.get_impl(), &ErrorImpl::StarredInGroup);
    assert_eq!(error.get_token().value, "*");
}

#[test]
fn test_bracket_and_curly_disambiguation() {
    assert!(matches!(expr("[]"), Expr::List { elements, .. } if elements.is_empty()));
    assert!(matches!(expr("[x for x in y if x]"), Expr::ListComp { .. }));
    assert!(matches!(expr("{}"), Expr::Dict { items, .. } if items.is_empty()));
    assert!(matches!(expr("{1}"), Expr::Set { .. }));
    assert!(matches!(expr("{1: 2}"), Expr::Dict { .. }));
    assert!(matches!(expr("{**a, 'b': 1}"), Expr::Dict { .. }));
    assert!(matches!(expr("{*a, b}"), Expr::Set { .. }));
    assert!(matches!(expr("{x for x in y}"), Expr::SetComp { .. }));
    assert!(matches!(expr("{x: y for x, y in z}"), Expr::DictComp { .. }));
}

#[test]
fn test_comprehension_clauses() {
    let Expr::ListComp { clauses, .. } = expr("[x for row in grid if row for x in row]") else {
        panic!("expected a list comprehension");
    };
    assert_eq!(clauses.len(), 2);
    assert_eq!(clauses[0].conditions.len(), 1);
    assert!(clauses[1].conditions.is_empty());
}

#[test]
fn test_bare_tuple_expression() {
    let Expr::Tuple { elements, .. } = expr("a, *b, c") else {
        panic!("expected a tuple");
    };
    assert_eq!(elements.len(), 3);
    assert!(matches!(elements[1], Expr::Star { .. }));
}

#[test]
fn test_adjacent_strings_concatenate() {
    let Expr::Literal { value, .. } = expr("'a' \"b\" '''c'''") else {
        panic!("expected a literal");
    };
    assert_eq!(value, LiteralValue::Str("abc".to_string()));

    let Expr::Literal { value, .. } = expr("b'x' b'y'") else {
        panic!("expected a literal");
    };
    assert_eq!(value, LiteralValue::Bytes(b"xy".to_vec()));

    assert_eq!(expr_error("'a' b'x'").message(), "cannot mix bytes and nonbytes literals");
}

#[test]
fn test_fstring_parts() {
    let Expr::FString { parts, .. } = expr("'x=' f\"{x!r:>{width}} {{ok}}\"") else {
        panic!("expected an f-string");
    };
    assert_eq!(parts.len(), 3);
    assert!(matches!(&parts[0], FStringPart::Literal { value, .. } if value == "x="));

    let FStringPart::Field { expr, conversion, format_spec, debug, .. } = &parts[1] else {
        panic!("expected a field");
    };
    assert_eq!(name(expr), "x");
    assert_eq!(*conversion, Some('r'));
    assert!(!debug);
    assert_eq!(format_spec.len(), 2);
    assert!(matches!(&format_spec[1], FStringPart::Field { .. }));

    assert!(matches!(&parts[2], FStringPart::Literal { value, .. } if value == " {ok}"));
}

#[test]
fn test_fstring_field_with_same_quote_strings() {
    let Expr::FString { parts, .. } = expr(r#"f"/todos/{todo.get("id", "")}""#) else {
        panic!("expected an f-string");
    };
    assert_eq!(parts.len(), 2);
    assert!(matches!(&parts[0], FStringPart::Literal { value, .. } if value == "/todos/"));
    let FStringPart::Field { expr, .. } = &parts[1] else {
        panic!("expected a field");
    };
    assert!(matches!(**expr, Expr::Call { .. }));
}

#[test]
fn test_fstring_debug_field() {
    let Expr::FString { parts, .. } = expr("f'{a + b=}'") else {
        panic!("expected an f-string");
    };
    let FStringPart::Field { expr, debug, .. } = &parts[0] else {
        panic!("expected a field");
    };
    assert!(*debug);
    assert!(matches!(**expr, Expr::Binary { op: BinaryOp::Add, .. }));
}

#[test]
fn test_fstring_field_positions() {
    let Expr::FString { parts, .. } = expr("f'ab{cd}'") else {
        panic!("expected an f-string");
    };
    let FStringPart::Field { expr, span, .. } = &parts[1] else {
        panic!("expected a field");
    };
    assert_eq!((span.start.column, span.end.column), (5, 9));
    assert_eq!(expr.get_span().start.column, 6);
}

#[test]
fn test_fstring_errors_anchor_on_the_string() {
    let error = expr_error("f'{}'");
    assert_eq!(error.message(), "f-string: empty expression not allowed");
    assert_eq!(error.get_token().value, "f'{}'");

    assert_eq!(expr_error("f'{a'").message(), "f-string: expecting '}'");
    assert_eq!(expr_error("f'a}'").message(), "f-string: single '}' is not allowed");
    assert!(expr_error("f'{a +}'").message().starts_with("f-string: "));
}

#[test]
fn test_attribute_and_subscript_targets() {
    let Stmt::Assign { targets, .. } = stmt("a.b.c = 1\n") else {
        panic!("expected an assignment");
    };
    assert!(matches!(targets[0], Expr::Attribute { .. }));

    let Stmt::Assign { targets, .. } = stmt("a[0] = 1\n") else {
        panic!("expected an assignment");
    };
    assert!(matches!(targets[0], Expr::Subscript { .. }));

    let Stmt::Assign { targets, .. } = stmt("f().x = 1\n") else {
        panic!("expected an assignment");
    };
    assert!(matches!(&targets[0], Expr::Attribute { value, .. } if matches!(**value, Expr::Call { .. })));
}

#[test]
fn test_call_target_is_rejected() {
    let error = first_error("f() = 1\n");
    assert!(matches!(error.get_impl(), ErrorImpl::InvalidTarget { .. }));
    assert_eq!(error.message(), "cannot assign to function call");

    assert_eq!(first_error("1 = x\n").message(), "cannot assign to literal");
    assert_eq!(first_error("a + b = x\n").message(), "cannot assign to expression");
}

#[test]
fn test_multiple_starred_targets() {
    let error = first_error("*a, *b = x\n");
    assert_eq!(error.get_impl(), &ErrorImpl::MultipleStarredTargets);
    assert_eq!(error.message(), "multiple starred expressions in assignment");
}

#[test]
fn test_star_targets() {
    let Stmt::Assign { targets, .. } = stmt("first, *rest = items\n") else {
        panic!("expected an assignment");
    };
    let Expr::Tuple { elements, .. } = &targets[0] else {
        panic!("expected a tuple target");
    };
    assert!(matches!(elements[1], Expr::Star { .. }));

    let Stmt::Assign { targets, .. } = stmt("[a, (b, c)] = x\n") else {
        panic!("expected an assignment");
    };
    assert!(matches!(targets[0], Expr::List { .. }));
}

#[test]
fn test_target_entry_point() {
    let tokens = tokenize("a, b.c, *d[0]".to_string(), None).unwrap();
    let targets = parse_targets(&tokens, ParserOptions::default()).unwrap();
    assert!(matches!(targets, Expr::Tuple { elements, .. } if elements.len() == 3));

    let tokens = tokenize("f()".to_string(), None).unwrap();
    assert!(parse_targets(&tokens, ParserOptions::default()).is_err());

    let tokens = tokenize("**a".to_string(), None).unwrap();
    let error = parse_targets(&tokens, ParserOptions::default()).unwrap_err();
    assert_eq!(error.message(), "cannot use ** in target expressions");
}

#[test]
fn test_assignment_forms() {
    let Stmt::Assign { targets, .. } = stmt("a = b = c\n") else {
        panic!("expected an assignment");
    };
    assert_eq!(targets.len(), 2);

    let Stmt::AnnAssign { target, value, .. } = stmt("count: int = 0\n") else {
        panic!("expected an annotated assignment");
    };
    assert_eq!(name(&target), "count");
    assert!(value.is_some());

    assert!(matches!(stmt("self.x: int\n"), Stmt::AnnAssign { value: None, .. }));
    assert!(matches!(stmt("x **= 2\n"), Stmt::AugAssign { op: BinaryOp::Power, .. }));
    assert!(matches!(stmt("a[i] //= 2\n"), Stmt::AugAssign { op: BinaryOp::FloorDivide, .. }));
    assert!(matches!(stmt("x = yield y\n"), Stmt::Assign { value: Expr::Yield { .. }, .. }));
}

#[test]
fn test_simple_statements_on_one_line() {
    let module = module("a = 1; b = 2; pass\n");
    assert_eq!(module.body.len(), 3);
    assert!(matches!(module.body[2], Stmt::Pass { .. }));
}

#[test]
fn test_del_statement() {
    let Stmt::Delete { targets, .. } = stmt("del a, b.c, d[0]\n") else {
        panic!("expected del");
    };
    assert_eq!(targets.len(), 3);

    assert_eq!(first_error("del *a\n").message(), "cannot delete starred");
}

#[test]
fn test_import_statements() {
    let Stmt::Import { names, .. } = stmt("import os.path as p, sys\n") else {
        panic!("expected import");
    };
    assert_eq!(names[0].name.name, "os.path");
    assert_eq!(names[0].asname.as_ref().map(|n| n.name.as_str()), Some("p"));
    assert_eq!(names[1].name.name, "sys");

    let Stmt::ImportFrom { module, level, names, .. } = stmt("from ..pkg import (a, b as c,)\n")
    else {
        panic!("expected import from");
    };
    assert_eq!(level, 2);
    assert_eq!(module.map(|m| m.name), Some("pkg".to_string()));
    assert_eq!(names.len(), 2);

    assert!(matches!(
        stmt("from . import x\n"),
        Stmt::ImportFrom { module: None, level: 1, .. }
    ));
    assert!(matches!(stmt("from m import *\n"), Stmt::ImportFrom { is_wildcard: true, .. }));
}

#[test]
fn test_small_statements() {
    assert!(matches!(stmt("global a, b\n"), Stmt::Global { names, .. } if names.len() == 2));
    assert!(matches!(stmt("assert x, 'msg'\n"), Stmt::Assert { message: Some(_), .. }));
    assert!(matches!(stmt("raise E from e\n"), Stmt::Raise { cause: Some(_), .. }));
    assert!(matches!(stmt("raise\n"), Stmt::Raise { exception: None, .. }));
    assert!(matches!(stmt("return\n"), Stmt::Return { value: None, .. }));
    assert!(matches!(stmt("return a, b\n"), Stmt::Return { value: Some(Expr::Tuple { .. }), .. }));
}

#[test]
fn test_type_alias_is_a_soft_keyword() {
    let Stmt::TypeAlias { name, type_params, .. } = stmt("type Pair[T] = tuple[T, T]\n") else {
        panic!("expected a type alias");
    };
    assert_eq!(name.name, "Pair");
    assert_eq!(type_params.len(), 1);

    assert!(matches!(stmt("type = 3\n"), Stmt::Assign { .. }));
    assert!(matches!(stmt("type(x)\n"), Stmt::Expr { .. }));
}

#[test]
fn test_if_elif_else() {
    let Stmt::If { body, orelse, .. } = stmt("if a:\n    x = 1\nelif b:\n    pass\nelse:\n    y = 2\n")
    else {
        panic!("expected if");
    };
    assert_eq!(body.len(), 1);
    let Stmt::If { orelse, .. } = &orelse[0] else {
        panic!("expected elif as a nested if");
    };
    assert_eq!(orelse.len(), 1);
}

#[test]
fn test_inline_block() {
    let Stmt::While { body, .. } = stmt("while x: x -= 1; y()\n") else {
        panic!("expected while");
    };
    assert_eq!(body.len(), 2);
}

#[test]
fn test_for_loops() {
    let Stmt::For { target, orelse, is_async, .. } =
        stmt("for i, (a, b) in pairs:\n    pass\nelse:\n    pass\n")
    else {
        panic!("expected for");
    };
    assert!(matches!(target, Expr::Tuple { .. }));
    assert_eq!(orelse.len(), 1);
    assert!(!is_async);

    let Stmt::FunctionDef { body, .. } = stmt("async def f():\n    async for x in y:\n        pass\n")
    else {
        panic!("expected def");
    };
    assert!(matches!(body[0], Stmt::For { is_async: true, .. }));
}

#[test]
fn test_try_ordering() {
    assert!(matches!(
        stmt("try:\n    a()\nexcept E as e:\n    pass\nelse:\n    b()\nfinally:\n    c()\n"),
        Stmt::Try { .. }
    ));

    let error = first_error("try:\n    pass\nelse:\n    pass\n");
    assert_eq!(error.get_impl(), &ErrorImpl::ElseWithoutExcept);

    let error = first_error("try:\n    pass\nexcept E:\n    pass\nfinally:\n    pass\nexcept F:\n    pass\n");
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::ClauseAfterFinally {
            clause: "except".to_string()
        }
    );

    let error = first_error("try:\n    pass\nexcept E:\n    pass\nelse:\n    pass\nexcept F:\n    pass\n");
    assert_eq!(error.message(), "'except' clause cannot appear after 'else'");

    let error = first_error("try:\n    pass\nx = 1\n");
    assert_eq!(error.message(), "expected 'except' or 'finally' after try block");
}

#[test]
fn test_except_star() {
    let Stmt::Try { handlers, .. } = stmt("try:\n    pass\nexcept* ValueError:\n    pass\n") else {
        panic!("expected try");
    };
    assert!(handlers[0].is_star);

    let error = first_error("try:\n    pass\nexcept* A:\n    pass\nexcept B:\n    pass\n");
    assert_eq!(error.message(), "cannot have both 'except' and 'except*' on the same 'try'");
}

#[test]
fn test_with_items() {
    let Stmt::With { items, .. } = stmt("with open(a) as f, lock:\n    pass\n") else {
        panic!("expected with");
    };
    assert_eq!(items.len(), 2);
    assert!(items[0].target.is_some());

    let Stmt::With { items, .. } = stmt("with (\n    open(a) as f,\n    open(b) as g,\n):\n    pass\n")
    else {
        panic!("expected with");
    };
    assert_eq!(items.len(), 2);

    let Stmt::With { items, .. } = stmt("with (a, b):\n    pass\n") else {
        panic!("expected with");
    };
    assert_eq!(items.len(), 2);
}

#[test]
fn test_function_definition() {
    let Stmt::FunctionDef { name, type_params, parameters, returns, .. } =
        stmt("def f[T](a, /, b: int = 1, *args, c, **kw) -> T:\n    return a\n")
    else {
        panic!("expected def");
    };
    assert_eq!(name.name, "f");
    assert_eq!(type_params.len(), 1);
    assert!(returns.is_some());
    assert_eq!(parameters.slash_index, Some(1));
    assert_eq!(parameters.parameters.len(), 5);
    assert_eq!(parameters.parameters[4].kind, ParameterKind::VarKeyword);

    let Stmt::FunctionDef { parameters, .. } = stmt("def g(a, *, b):\n    pass\n") else {
        panic!("expected def");
    };
    assert_eq!(parameters.keyword_only_marker, Some(1));
}

#[test]
fn test_parameter_errors() {
    let cases = [
        ("def f(a=1, b): pass\n", "non-default parameter follows default parameter"),
        ("def f(*): pass\n", "named arguments must follow bare *"),
        ("def f(**kw, a): pass\n", "'**' parameter must be last"),
        ("def f(/, a): pass\n", "'/' without preceding parameters"),
        ("def f(a, /, b, /): pass\n", "multiple '/'"),
        ("def f(*a, *b): pass\n", "multiple '*'"),
    ];
    for (source, message) in cases {
        let error = first_error(source);
        assert!(
            matches!(error.get_impl(), ErrorImpl::InvalidParameters { .. }),
            "{}",
            source
        );
        assert_eq!(error.message(), message, "{}", source);
    }
}

#[test]
fn test_type_params() {
    let Stmt::ClassDef { type_params, arguments, .. } =
        stmt("class Box[T: int, *Ts, **P](Base, metaclass=M):\n    pass\n")
    else {
        panic!("expected class");
    };
    let kinds: Vec<TypeParamKind> = type_params.iter().map(|param| param.kind).collect();
    assert_eq!(
        kinds,
        vec![TypeParamKind::TypeVar, TypeParamKind::TypeVarTuple, TypeParamKind::ParamSpec]
    );
    assert!(type_params[0].bound.is_some());
    assert_eq!(arguments.len(), 2);

    assert_eq!(first_error("class C[]: pass\n").message(), "expected type parameter");
}

#[test]
fn test_decorators() {
    let Stmt::Decorated { decorator, target, .. } = stmt("@cache\n@route('/')\ndef f():\n    pass\n")
    else {
        panic!("expected a decorated definition");
    };
    assert_eq!(name(&decorator), "cache");
    assert!(matches!(*target, Stmt::Decorated { .. }));

    assert!(matches!(stmt("@d\nclass C:\n    pass\n"), Stmt::Decorated { .. }));
    assert!(matches!(stmt("@d\nasync def f():\n    pass\n"), Stmt::Decorated { .. }));

    let error = first_error("@d\nx = 1\n");
    assert_eq!(error.get_impl(), &ErrorImpl::InvalidDecoratorTarget);
}

#[test]
fn test_match_statement() {
    let source = "match command.split():\n    case [action]:\n        pass\n    case [\"go\", *rest] if rest:\n        pass\n    case Point(x=0, y=y) | None:\n        pass\n    case {\"k\": v, **extra}:\n        pass\n    case _:\n        pass\n";
    let Stmt::Match { cases, .. } = stmt(source) else {
        panic!("expected match");
    };
    assert_eq!(cases.len(), 5);
    assert!(matches!(&cases[0].pattern, Pattern::Sequence { is_tuple: false, .. }));
    assert!(cases[1].guard.is_some());
    assert!(matches!(&cases[2].pattern, Pattern::Or { patterns, .. } if patterns.len() == 2));
    assert!(matches!(&cases[3].pattern, Pattern::Mapping { rest: Some(_), .. }));
    assert!(matches!(cases[4].pattern, Pattern::Wildcard { .. }));
}

#[test]
fn test_match_patterns() {
    let source = "match p:\n    case 1, *_:\n        pass\n    case -1 + 2j as c:\n        pass\n    case Color.RED:\n        pass\n    case (x):\n        pass\n";
    let Stmt::Match { cases, .. } = stmt(source) else {
        panic!("expected match");
    };
    assert!(matches!(&cases[0].pattern, Pattern::Sequence { is_tuple: true, patterns, .. }
        if matches!(patterns[1], Pattern::Star { name: None, .. })));
    assert!(matches!(&cases[1].pattern, Pattern::As { name, .. } if name.name == "c"));
    assert!(matches!(cases[2].pattern, Pattern::Value { .. }));
    assert!(matches!(cases[3].pattern, Pattern::Group { .. }));

    let error = first_error("match p:\n    case C(x=1, y):\n        pass\n");
    assert_eq!(error.message(), "positional patterns follow keyword patterns");
}

#[test]
fn test_match_stays_a_name() {
    assert!(matches!(stmt("match = 1\n"), Stmt::Assign { .. }));
    assert!(matches!(stmt("match(a, b)\n"), Stmt::Expr { .. }));
}

#[test]
fn test_view_with_single_line_elements() {
    let body = view_body("view Card(title):\n    <h1 class=\"big\">{title}</h1>\n    <br/>\n");
    assert_eq!(body.len(), 2);

    let heading = element(&body[0]);
    assert_eq!(heading.tag_name.name, "h1");
    assert_eq!(heading.kind, ElementKind::SingleLine);
    assert_eq!(heading.closing_tag.as_ref().map(|tag| tag.name.as_str()), Some("h1"));
    assert_eq!(heading.attributes[0].name.name, "class");
    assert!(matches!(
        &heading.attributes[0].value,
        Some(Expr::Literal { value: LiteralValue::Str(text), .. }) if text == "big"
    ));
    assert!(matches!(
        &heading.content[0],
        Stmt::HtmlContent { parts, .. } if matches!(parts[0], HtmlContentPart::Interpolation { .. })
    ));

    let br = element(&body[1]);
    assert_eq!(br.kind, ElementKind::SelfClosing);
    assert!(br.closing_tag.is_none());
}

#[test]
fn test_multiline_element_body() {
    let source = "view Page(name):\n    <div>\n        <p>Hello {name}</p>\n        count = 1\n        Some text\n        if count:\n            <span>{count}</span>\n    </div>\n";
    let body = view_body(source);
    let div = element(&body[0]);
    assert_eq!(div.kind, ElementKind::Multiline);
    assert_eq!(div.content.len(), 4);
    assert!(matches!(div.content[0], Stmt::Html(_)));
    assert!(matches!(div.content[1], Stmt::Assign { .. }));
    assert!(matches!(div.content[2], Stmt::HtmlContent { .. }));
    assert!(matches!(&div.content[3], Stmt::If { body, .. } if matches!(body[0], Stmt::Html(_))));
}

#[test]
fn test_adjacent_content_is_merged() {
    let source = "view Page():\n    <p>\n        first line\n        {second}\n    </p>\n";
    let body = view_body(source);
    let p = element(&body[0]);
    assert_eq!(p.content.len(), 1);

    let Stmt::HtmlContent { parts, .. } = &p.content[0] else {
        panic!("expected content");
    };
    assert_eq!(parts.len(), 3);
    assert!(matches!(&parts[1], HtmlContentPart::Text { text, .. } if text == " "));
}

#[test]
fn test_attribute_values() {
    let body = view_body("view V(x):\n    <input n=3 on=True size={x + 1} label=\"a {x} {{b}}\" disabled/>\n");
    let input = element(&body[0]);
    let values: Vec<&Option<Expr>> = input.attributes.iter().map(|attr| &attr.value).collect();

    assert!(matches!(values[0], Some(Expr::Literal { value: LiteralValue::Int(3), .. })));
    assert!(matches!(values[1], Some(Expr::Literal { value: LiteralValue::True, .. })));
    assert!(matches!(values[2], Some(Expr::Binary { .. })));
    let Some(Expr::FString { parts, .. }) = values[3] else {
        panic!("expected an interpolated attribute");
    };
    assert_eq!(parts.len(), 3);
    assert!(matches!(&parts[2], FStringPart::Literal { value, .. } if value == " {b}"));
    assert!(values[4].is_none());
}

#[test]
fn test_attribute_interpolation_errors() {
    let error = first_error("view V():\n    <a href=\"/u/{id}/{x\">x</a>\n");
    assert_eq!(error.get_impl(), &ErrorImpl::UnmatchedBrace { brace: '{' });
    assert_eq!(error.get_token().value, "\"/u/{id}/{x\"");

    let error = first_error("view V():\n    <a href=\"/u/{1 +}\">x</a>\n");
    assert!(matches!(error.get_impl(), ErrorImpl::InvalidInterpolation { .. }));
    assert!(error.message().starts_with("invalid expression in interpolation: "));
}

#[test]
fn test_stray_braces_in_attributes_stay_literal() {
    let body = view_body(
        "view V():\n    <div class=\"a}\" style=\"{\" href=\"/u/{id\" data-x=\"{{raw}}\"></div>\n",
    );
    let texts: Vec<&str> = element(&body[0])
        .attributes
        .iter()
        .map(|attr| match &attr.value {
            Some(Expr::Literal {
                value: LiteralValue::Str(text),
                ..
            }) => text.as_str(),
            other => panic!("expected a string literal, got {:?}", other),
        })
        .collect();
    assert_eq!(texts, ["a}", "{", "/u/{id", "{{raw}}"]);
}

#[test]
fn test_mismatched_closing_tag() {
    let error = first_error("view V():\n    <div></span>\n");
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::MismatchedClosingTag {
            expected: "div".to_string(),
            found: "span".to_string()
        }
    );
    assert_eq!(error.get_token().value, "span");

    assert!(matches!(view_body("view V():\n    <div></div>\n")[0], Stmt::Html(_)));
}

#[test]
fn test_function_in_html_content() {
    let error = first_error("view V():\n    <div>\n        def f():\n            pass\n    </div>\n");
    assert_eq!(error.get_impl(), &ErrorImpl::FunctionInHtmlContent);

    let body = view_body("view V():\n    def helper():\n        return 1\n    <p>{helper()}</p>\n");
    assert!(matches!(body[0], Stmt::FunctionDef { .. }));
}

#[test]
fn test_html_in_nested_function_body() {
    let error = first_error("view V():\n    def f():\n        <p>x</p>\n");
    assert_eq!(error.get_impl(), &ErrorImpl::HtmlOutsideView);
}

#[test]
fn test_statement_entry_point_flavors() {
    let tokens = tokenize("view V():\n    <p>x</p>\n".to_string(), None).unwrap();
    let element_tokens: Vec<_> = tokens
        .iter()
        .skip_while(|token| token.kind != TokenKind::TagOpen)
        .filter(|token| token.kind != TokenKind::Dedent)
        .cloned()
        .collect();

    let options = ParserOptions::default();
    assert!(parse_statement(&element_tokens, BlockFlavor::VIEW, options).is_ok());
    assert!(parse_statement(&element_tokens, BlockFlavor::HTML_CONTENT, options).is_ok());
    let error = parse_statement(&element_tokens, BlockFlavor::ORDINARY, options).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::HtmlOutsideView);

    let tokens = tokenize("def f(): pass\n".to_string(), None).unwrap();
    let error = parse_statement(&tokens, BlockFlavor::HTML_CONTENT, options).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::FunctionInHtmlContent);
}

#[test]
fn test_errors_accumulate_across_statements() {
    let errors = errors("x = 1 +\ny = 2\ndef f(a b):\n    pass\nz = )\n");
    assert_eq!(errors.len(), 3, "{:?}", errors);
}

#[test]
fn test_recovery_skips_nested_blocks() {
    let errors = errors("if x\n    a = 1\n    b = 2\nelse:\n    pass\nok = 1\nbad = = 2\n");
    assert_eq!(errors.len(), 2, "{:?}", errors);
    assert_eq!(errors[0].message(), "expected ':' after condition");
}

#[test]
fn test_error_display() {
    let error = expr_error("a +");
    assert_eq!(error.to_string(), "at end of line: expected expression (1:4)");

    let error = first_error("x = )\n");
    assert_eq!(error.to_string(), "at ')': expected expression (1:5)");
    assert_eq!(error.get_position().column, 5);
}

#[test]
fn test_depth_limit() {
    let source = format!("{}1{}", "(".repeat(15), ")".repeat(15));
    let tokens = tokenize(source, None).unwrap();

    let error = parse_expression(&tokens, ParserOptions::default().with_max_depth(20)).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::MaxDepthExceeded { limit: 20 });
    assert!(parse_expression(&tokens, ParserOptions::default()).is_ok());
}

#[test]
fn test_depth_limit_bounds_power_chains() {
    let source = format!("{}2", "2 ** ".repeat(1000));
    let tokens = tokenize(source, None).unwrap();
    let error = parse_expression(&tokens, ParserOptions::default()).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::MaxDepthExceeded { limit: 100 });

    let source = format!("{}2", "2 ** ".repeat(50));
    let tokens = tokenize(source, None).unwrap();
    assert!(parse_expression(&tokens, ParserOptions::default()).is_ok());
}

#[test]
fn test_depth_limit_bounds_parenthesized_statements() {
    let source = format!("{}x{}\n", "(".repeat(5000), ")".repeat(5000));
    let error = first_error(&source);
    assert_eq!(error.get_impl(), &ErrorImpl::MaxDepthExceeded { limit: 100 });

    let source = format!("{}x{} += 1\n", "(".repeat(5000), ")".repeat(5000));
    assert!(matches!(
        first_error(&source).get_impl(),
        ErrorImpl::MaxDepthExceeded { .. }
    ));
}

#[test]
fn test_depth_limit_reaches_interpolations() {
    let source = format!("f'{{{}1{}}}'", "(".repeat(30), ")".repeat(30));
    let tokens = tokenize(source, None).unwrap();

    let error = parse_expression(&tokens, ParserOptions::default().with_max_depth(25)).unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::MaxDepthExceeded { .. }));
}

#[test]
fn test_failed_speculation_restores_state() {
    let tokens = tokenize("f() = 1".to_string(), None).unwrap();
    let mut parser = Parser::new(&tokens, ParserOptions::default());

    assert!(parser.speculate(parse_star_targets).is_err());
    assert_eq!(parser.position(), 0);
    assert!(parser.errors().is_empty());

    assert!(parser.attempt(parse_star_targets).is_none());
    assert_eq!(parser.position(), 0);
}

#[test]
fn test_module_span_covers_statements() {
    let module = module("a = 1\n\nif a:\n    b = 2\n");
    for stmt in &module.body {
        assert!(module.span.contains(&stmt.get_span()));
    }
    let Stmt::If { span, .. } = &module.body[1] else {
        panic!("expected if");
    };
    assert_eq!((span.start.line, span.end.line), (3, 4));
}
