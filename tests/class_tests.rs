// Class declaration, construction and inheritance

use std::sync::Arc;

use gordian::{ErrorKind, Interpreter, Scope, ScriptError, Value};
use pretty_assertions::assert_eq;

fn run(source: &str) -> Result<(Interpreter, Arc<Scope>), ScriptError> {
    let scope = Scope::root();
    let interp = Interpreter::new();
    interp.run(source, &scope)?;
    Ok((interp, scope))
}

const ARM: &str = r#"
    class Arm {
        angle = 0
        speed = 1
        def construct(start) {
            angle = start;
        }
        def construct() {
        }
        def lift(by) {
            angle = angle + by * speed;
        }
        def reading() {
            return "angle " + angle;
        }
    }
"#;

#[test]
fn test_construct_and_members() {
    let source = format!("{}\narm = new Arm(15)\narm.lift(5)\nr = arm.reading()", ARM);
    let (_, scope) = run(&source).unwrap();
    assert_eq!(scope.lookup("r").unwrap(), Value::from("angle 20"));

    let arm = scope.lookup("arm").unwrap();
    let arm = arm.as_instance().unwrap();
    assert_eq!(arm.class_name(), "Arm");
    assert_eq!(arm.get("angle").unwrap(), Value::from(20));
}

#[test]
fn test_constructor_overloads() {
    let source = format!("{}\na = new Arm()\nb = new Arm(7)", ARM);
    let (interp, scope) = run(&source).unwrap();
    assert_eq!(interp.evaluate(&scope, "a.angle").unwrap(), Value::from(0));
    assert_eq!(interp.evaluate(&scope, "b.angle").unwrap(), Value::from(7));
}

#[test]
fn test_no_matching_constructor() {
    let source = format!("{}\nbad = new Arm(1, 2)", ARM);
    let err = run(&source).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::NoMatchingConstructor {
            class: "Arm".to_string(),
            args: "Number, Number".to_string(),
        }
    );
}

#[test]
fn test_member_assignment_and_delete() {
    let source = format!(
        "{}\narm = new Arm()\narm.speed = 3\narm.lift(2)\narm.extra = true\ndel arm.extra",
        ARM
    );
    let (interp, scope) = run(&source).unwrap();
    assert_eq!(interp.evaluate(&scope, "arm.angle").unwrap(), Value::from(6));
    let err = interp.evaluate(&scope, "arm.extra").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotFound { .. }));
}

#[test]
fn test_implicit_super_exposes_parent_members() {
    let source = r#"
        class Animal {
            legs = 4
            def describe() {
                return "legs: " + legs;
            }
        }
        class Dog(Animal) {
            name = "rex"
        }
        d = new Dog()
    "#;
    let (interp, scope) = run(source).unwrap();
    assert_eq!(interp.evaluate(&scope, "d.legs").unwrap(), Value::from(4));
    assert_eq!(interp.evaluate(&scope, "d.name").unwrap(), Value::from("rex"));
    assert_eq!(
        interp.evaluate(&scope, "d.describe()").unwrap(),
        Value::from("legs: 4")
    );
}

#[test]
fn test_explicit_super_with_arguments() {
    let source = r#"
        class Motor {
            port = 0
            def construct(p) {
                port = p;
            }
        }
        class Drive(Motor) {
            power = 0
            def construct(p, level) {
                super(p);
                power = level;
            }
        }
        d = new Drive(3, 0.5)
    "#;
    let (interp, scope) = run(source).unwrap();
    assert_eq!(interp.evaluate(&scope, "d.port").unwrap(), Value::from(3));
    assert_eq!(interp.evaluate(&scope, "d.power").unwrap(), Value::from(0.5));
}

#[test]
fn test_constructor_sees_parent_members_after_super() {
    let source = r#"
        class Motor {
            port = 0
            def construct(p) {
                port = p;
            }
            def label() {
                return "port " + port;
            }
        }
        class Drive(Motor) {
            doubled = 0
            tag = ""
            def construct(p) {
                super(p);
                doubled = port * 2;
                port = port + 1;
                tag = label();
            }
        }
        d = new Drive(3)
    "#;
    let (interp, scope) = run(source).unwrap();
    assert_eq!(interp.evaluate(&scope, "d.doubled").unwrap(), Value::from(6));
    assert_eq!(interp.evaluate(&scope, "d.port").unwrap(), Value::from(4));
    assert_eq!(interp.evaluate(&scope, "d.tag").unwrap(), Value::from("port 4"));
}

#[test]
fn test_self_constructing_class_hits_recursion_limit() {
    let err = run("class Node { inner = new Node(); }\nx = new Node()").unwrap_err();
    assert!(
        matches!(err.kind, ErrorKind::RecursionLimit { .. }),
        "unexpected error: {:?}",
        err
    );
}

#[test]
fn test_child_members_win_over_parent() {
    let source = r#"
        class Base {
            kind = "base"
            def name() { return "base"; }
        }
        class Child(Base) {
            kind = "child"
            def name() { return "child"; }
        }
        c = new Child()
    "#;
    let (interp, scope) = run(source).unwrap();
    assert_eq!(interp.evaluate(&scope, "c.kind").unwrap(), Value::from("child"));
    assert_eq!(interp.evaluate(&scope, "c.name()").unwrap(), Value::from("child"));
}

#[test]
fn test_super_not_invoked() {
    let source = r#"
        class Motor {
            def construct(p) { }
        }
        class Drive(Motor) {
            def construct() { }
        }
        d = new Drive()
    "#;
    let err = run(source).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::SuperNotInvoked {
            class: "Drive".to_string()
        }
    );
}

#[test]
fn test_super_and_construct_are_removed() {
    let source = r#"
        class Base { }
        class Child(Base) { }
        c = new Child()
    "#;
    let (interp, scope) = run(source).unwrap();
    let instance = interp.instantiate(&scope, "Child", &[]).unwrap();
    assert!(!instance.scope().has_callable("super"));
    assert!(!instance.scope().has_callable("construct"));

    let err = interp.run("c.super()", &scope).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotFound { .. }));
}

#[test]
fn test_class_body_runs_per_instance() {
    let source = r#"
        made = 0
        class Counter {
            made = made + 1
            value = 0
        }
        a = new Counter()
        b = new Counter()
        a.value = 5
    "#;
    let (interp, scope) = run(source).unwrap();
    assert_eq!(scope.lookup("made").unwrap(), Value::from(2));
    assert_eq!(interp.evaluate(&scope, "b.value").unwrap(), Value::from(0));
    assert_eq!(interp.evaluate(&scope, "a == a").unwrap(), Value::from(true));
    assert_eq!(interp.evaluate(&scope, "a == b").unwrap(), Value::from(false));
}

#[test]
fn test_host_method_call() {
    let (interp, scope) = run(ARM).unwrap();
    let arm = interp.instantiate(&scope, "Arm", &[Value::from(2)]).unwrap();
    arm.call(&interp, "lift", &[Value::from(3)]).unwrap();
    assert_eq!(
        arm.call(&interp, "reading", &[]).unwrap(),
        Value::from("angle 5")
    );
}

#[test]
fn test_unknown_class() {
    let err = run("x = new Ghost()").unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::NotFound {
            name: "Ghost".to_string()
        }
    );
}
