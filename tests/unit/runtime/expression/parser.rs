use super::*;

#[test]
fn precedence_binds_multiplication_tighter() {
    let e = parse_expr("1 + 2 * x").unwrap();
    match e {
        Expr::Binary {
            op: BinaryOp::Add,
            right,
            ..
        } => assert!(matches!(
            *right,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        )),
        other => panic!("unexpected tree {other:?}"),
    }
}

#[test]
fn braces_and_dollar_braces_are_stripped() {
    assert_eq!(strip_braces("{ a + 1 }"), "a + 1");
    assert_eq!(strip_braces("${a}"), "a");
    assert_eq!(strip_braces("plain"), "plain");
    assert_eq!(parse_expr("{count}").unwrap(), Expr::Var("count".to_owned()));
}

#[test]
fn booleans_lower_to_numbers() {
    assert_eq!(parse_expr("TRUE").unwrap(), Expr::Num(1.0));
    assert_eq!(parse_expr("false").unwrap(), Expr::Num(0.0));
}

#[test]
fn errors_carry_offsets() {
    let err = parse_expr("1 + ").unwrap_err();
    assert_eq!(err.offset, 3);
    let err = parse_expr("(1 + 2").unwrap_err();
    assert!(err.message.contains("RParen"));
    let err = parse_expr("a # b").unwrap_err();
    assert!(err.message.contains("unexpected character"));
}

#[test]
fn variables_are_listed_once_in_order() {
    let e = parse_expr("b + a * b - c").unwrap();
    assert_eq!(e.variables(), vec!["b", "a", "c"]);
}
