use gordian::{ErrorKind, Interpreter, Scope, Value};
use pretty_assertions::assert_eq;

fn eval(text: &str) -> Value {
    Interpreter::new()
        .evaluate(&Scope::root(), text)
        .unwrap_or_else(|err| panic!("{} failed: {}", text, err))
}

#[test]
fn test_rightmost_operator_applies_first() {
    assert_eq!(eval("2+3*4"), Value::from(14));
    assert_eq!(eval("10-4-3"), Value::from(3));
    assert_eq!(eval("8/2/2"), Value::from(2));
    // Both families present: the split is at the leftmost of the two last operators
    assert_eq!(eval("2*3+4"), Value::from(14));
    assert_eq!(eval("(2*3)+4"), Value::from(10));
}

#[test]
fn test_unary_and_grouping() {
    assert_eq!(eval("-3 + 5"), Value::from(2));
    assert_eq!(eval("2 * -3"), Value::from(-6));
    assert_eq!(eval("-(2 + 3)"), Value::from(-5));
    assert_eq!(eval("!(1 > 2)"), Value::from(true));
}

#[test]
fn test_modulo_and_division() {
    assert_eq!(eval("17 % 5"), Value::from(2));
    assert_eq!(eval("7 / 2"), Value::from(3.5));
    assert_eq!(eval("1 / 0"), Value::Number(f64::INFINITY));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("\"a\" + \"b\""), Value::from("ab"));
    assert_eq!(eval("\"total: \" + 1 + 2"), Value::from("total: 3"));
    assert_eq!(eval("'n=' + 2.5"), Value::from("n=2.5"));
}

#[test]
fn test_relational_and_logical() {
    assert_eq!(eval("3 >= 3"), Value::from(true));
    assert_eq!(eval("2 < 1"), Value::from(false));
    assert_eq!(eval("'abc' == 'abc'"), Value::from(true));
    assert_eq!(eval("1 != 2 && 2 > 1"), Value::from(true));
    assert_eq!(eval("1 > 2 || 'x' == 'x'"), Value::from(true));
    assert_eq!(eval("1 + 1 == 2"), Value::from(true));
}

#[test]
fn test_number_display() {
    assert_eq!(eval("4 / 2").to_string(), "2");
    assert_eq!(eval("[1, 'a']").to_string(), "[1, \"a\"]");
}

#[test]
fn test_type_mismatch() {
    let err = Interpreter::new()
        .evaluate(&Scope::root(), "true - 1")
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}
