// Integration tests for the Gordian interpreter

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gordian::{ErrorKind, Interpreter, Scope, ScriptError, Signature, Value, ValueKind};
use pretty_assertions::assert_eq;

fn run(source: &str) -> Result<Arc<Scope>, ScriptError> {
    let scope = Scope::root();
    Interpreter::new().run(source, &scope)?;
    Ok(scope)
}

fn value_of(source: &str, name: &str) -> Value {
    let scope = run(source).expect("script failed");
    scope.lookup(name).expect("name not bound")
}

#[test]
fn test_increment_and_decrement() {
    assert_eq!(value_of("x=5; x++;", "x"), Value::from(6));
    assert_eq!(value_of("x=5; x++; x--; x--;", "x"), Value::from(4));
}

#[test]
fn test_child_scope_snapshot() {
    let parent = Scope::root();
    parent.declare("y", Value::from(1)).unwrap();
    let child = Scope::child(&parent);
    Interpreter::new().run("y = 2", &parent).unwrap();

    assert_eq!(child.lookup("y").unwrap(), Value::from(1));
    assert_eq!(parent.lookup("y").unwrap(), Value::from(2));
}

#[test]
fn test_for_loop_accumulates() {
    assert_eq!(
        value_of("count=0; for(3){ count=count+1; }", "count"),
        Value::from(3)
    );
}

#[test]
fn test_try_catch_recovers() {
    let scope = run("try{ 1/0; } catch{ result=\"caught\"; }").unwrap();
    let result = Interpreter::new().evaluate(&scope, "result").unwrap();
    assert_eq!(result, Value::from("caught"));
}

#[test]
fn test_thread_does_not_crash_spawner() {
    let scope = Scope::root();
    let interp = Interpreter::new();
    interp.run("thread{ x=1; }", &scope).unwrap();
    // Either outcome is fine: the thread's `x` lives in its own scope
    let _ = interp.evaluate(&scope, "x");

    interp
        .run("flag = 0; thread{ flag = 1; }", &scope)
        .unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while scope.lookup("flag").unwrap() != Value::from(1) {
        assert!(Instant::now() < deadline, "thread never ran");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_thread_keeps_spawn_time_snapshot() {
    let (go, wait) = std::sync::mpsc::channel::<()>();
    let wait = Mutex::new(wait);
    let scope = Scope::root();
    scope
        .register_method("hold", Signature::any(0), move |_| {
            let _ = wait.lock().unwrap().recv_timeout(Duration::from_secs(5));
            Ok(Value::Null)
        })
        .unwrap();
    let interp = Interpreter::new();
    interp
        .run("speed = 1; seen = 0; thread{ hold(); seen = speed; }", &scope)
        .unwrap();
    interp.run("speed = 2", &scope).unwrap();
    go.send(()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while scope.lookup("seen").unwrap() == Value::from(0) {
        assert!(Instant::now() < deadline, "thread never ran");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(scope.lookup("seen").unwrap(), Value::from(1));
    assert_eq!(scope.lookup("speed").unwrap(), Value::from(2));
}

#[test]
fn test_deep_recursion_on_small_stack_reports_limit() {
    // default spawned threads have a 2 MiB stack
    let (near, past) = std::thread::spawn(|| {
        let scope = run("def down(n){ if(n == 0){ return 0; } return down(n - 1) + 1; }")
            .unwrap();
        let interp = Interpreter::new();
        (
            interp.evaluate(&scope, "down(250)"),
            interp.evaluate(&scope, "down(1000)").map_err(|err| err.kind),
        )
    })
    .join()
    .unwrap();

    assert_eq!(near.unwrap(), Value::from(250));
    assert!(matches!(past, Err(ErrorKind::RecursionLimit { .. })));
}

#[test]
fn test_deeply_nested_parentheses() {
    let depth = 2000;
    let source = format!("x = {}7{}", "(".repeat(depth), ")".repeat(depth));
    let value = std::thread::spawn(move || {
        run(&source).map(|scope| scope.lookup("x").unwrap())
    })
    .join()
    .unwrap();
    assert_eq!(value.unwrap(), Value::from(7));
}

#[test]
fn test_undeclared_callable() {
    let err = run("launch(3);").unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::NotFound {
            name: "launch".to_string()
        }
    );
    assert_eq!(err.line, Some(1));
}

#[test]
fn test_recursive_function() {
    let source = r#"
        def fact(n) {
            if (n <= 1) {
                return 1;
            }
            return n * fact(n - 1);
        }
        result = fact(6)
    "#;
    assert_eq!(value_of(source, "result"), Value::from(720));
}

#[test]
fn test_void_function_mutates_caller_bindings() {
    let source = r#"
        total = 0
        def add(amount) {
            total = total + amount;
        }
        add(4)
        add(5)
    "#;
    assert_eq!(value_of(source, "total"), Value::from(9));
}

#[test]
fn test_overloads_by_arity() {
    let source = r#"
        def area(side) { return side * side; }
        def area(w, h) { return w * h; }
        a = area(3)
        b = area(2, 5)
    "#;
    let scope = run(source).unwrap();
    assert_eq!(scope.lookup("a").unwrap(), Value::from(9));
    assert_eq!(scope.lookup("b").unwrap(), Value::from(10));

    let err = Interpreter::new()
        .run("c = area(1, 2, 3)", &scope)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoMatchingOverload { .. }));
}

#[test]
fn test_returning_function_without_return() {
    let source = r#"
        def maybe(x) {
            if (x) { return 1; }
        }
        y = maybe(false)
    "#;
    let err = run(source).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::NoValueReturned {
            name: "maybe".to_string()
        }
    );
}

#[test]
fn test_native_callables() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let scope = Scope::root();
    let sink = Arc::clone(&log);
    scope
        .register_method("drive", Signature::new([ValueKind::Number, ValueKind::Number]), move |args| {
            sink.lock().unwrap().push(format!("drive {} {}", args[0], args[1]));
            Ok(Value::Null)
        })
        .unwrap();
    scope
        .register_returning_method("distance", Signature::any(0), |_| Ok(Value::from(12.5)))
        .unwrap();

    let source = r#"
        count (i, 1, 2) {
            drive(i, distance() * 2);
        }
    "#;
    Interpreter::new().run(source, &scope).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["drive 1 25".to_string(), "drive 2 25".to_string()]
    );

    let err = Interpreter::new()
        .run("drive(\"fast\", 1)", &scope)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoMatchingOverload { .. }));
}

#[test]
fn test_error_line_numbers() {
    let source = "a = 1\n\n# setup done;\nwhile (a < 3) {\n  a++\n  b = missing + 1\n}\n";
    let err = run(source).unwrap_err();
    assert_eq!(err.line, Some(6));
    assert_eq!(err.to_string(), "'missing' was not found at line 6");
}

#[test]
fn test_unbalanced_script_is_syntax_error() {
    for source in ["if (a) { b = 1", "s = \"open", "f((1)", "x = [1, 2"] {
        let err = run(source).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::Syntax { .. }),
            "{:?} should be a syntax error",
            source
        );
    }
}

#[test]
fn test_illegal_names() {
    let err = run("def bad-name() { }").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IllegalName { .. }));
    let err = run("make true;").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IllegalName { .. }));
}

#[test]
fn test_comments_and_lists() {
    let source = r#"
        # starting positions;
        positions = [10, 20, 30]  # inline comment
        second = positions[1]
        label = "pos: " + second
    "#;
    let scope = run(source).unwrap();
    assert_eq!(scope.lookup("second").unwrap(), Value::from(20));
    assert_eq!(scope.lookup("label").unwrap(), Value::from("pos: 20"));
}

#[test]
fn test_host_scope_api() {
    let scope = Scope::root();
    scope.declare_public("speed", Value::from(1)).unwrap();
    Interpreter::new().run("speed = speed + 1", &scope).unwrap();
    assert_eq!(scope.lookup_public("speed").unwrap(), Value::from(2));
    assert!(scope.lookup_private("speed").is_err());
    assert_eq!(scope.remove("speed").unwrap(), Value::from(2));
}
