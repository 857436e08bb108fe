//! Callables and overload dispatch
//!
//! A [`Callable`] is anything a script can invoke by name: a native host
//! function, a script `def`, or one of the temporary `super` overloads that
//! exist only while a subclass instance is being constructed.
//!
//! Overloads sharing a name are tried in registration order (private entries
//! before inherited ones) and the first whose [`Signature`] accepts the
//! arguments is invoked.

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::interpreter::classes::{Class, Construction};
use crate::interpreter::engine::{ExecOutcome, Interpreter};
use crate::interpreter::errors::{ErrorKind, ScriptError};
use crate::memory::scope::{validate_name, Overloads, Scope};
use crate::memory::value::{Instance, Value, ValueKind};
use crate::parser::ast::{contains_return, Block, Callee, Expr};

/// Host function type for native callables
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, ScriptError> + Send + Sync>;

/// Arity and per-position kind constraint of one overload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<ValueKind>,
}

impl Signature {
    pub fn new(params: impl IntoIterator<Item = ValueKind>) -> Self {
        Signature {
            params: params.into_iter().collect(),
        }
    }

    /// `arity` parameters of any kind
    pub fn any(arity: usize) -> Self {
        Signature {
            params: vec![ValueKind::Any; arity],
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn accepts(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(kind, arg)| kind.accepts(arg))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<&str> = self.params.iter().map(|k| k.name()).collect();
        write!(f, "({})", kinds.join(", "))
    }
}

pub(crate) enum CallableBody {
    Native(NativeFn),
    Script {
        params: Vec<String>,
        body: Block,
        /// Scope the `def` ran in; calls run in a fresh child of it.
        scope: Weak<Scope>,
    },
    Super {
        parent: Arc<Class>,
        /// The subclass instance under construction
        instance: Weak<Scope>,
        construction: Arc<Construction>,
    },
}

/// A named, invocable unit
pub struct Callable {
    name: String,
    signature: Signature,
    body: CallableBody,
}

impl Callable {
    pub fn native<F>(name: &str, signature: Signature, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ScriptError> + Send + Sync + 'static,
    {
        Callable {
            name: name.to_string(),
            signature,
            body: CallableBody::Native(Arc::new(f)),
        }
    }

    pub(crate) fn script(name: &str, params: Vec<String>, body: Block, scope: Weak<Scope>) -> Self {
        Callable {
            name: name.to_string(),
            signature: Signature::any(params.len()),
            body: CallableBody::Script {
                params,
                body,
                scope,
            },
        }
    }

    pub(crate) fn superclass(
        name: &str,
        arity: usize,
        parent: Arc<Class>,
        instance: Weak<Scope>,
        construction: Arc<Construction>,
    ) -> Self {
        Callable {
            name: name.to_string(),
            signature: Signature::any(arity),
            body: CallableBody::Super {
                parent,
                instance,
                construction,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn is_native(&self) -> bool {
        matches!(self.body, CallableBody::Native(_))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({}{})", self.name, self.signature)
    }
}

/// Argument kinds as they appear in overload failures.
pub(crate) fn describe_args(args: &[Value]) -> String {
    args.iter()
        .map(|arg| arg.type_name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Interpreter {
    /// Register a script `def` in `scope`.
    ///
    /// Every def is callable as a statement; one whose body contains `return`
    /// is also registered as value-returning.
    pub(crate) fn define_callable(
        &self,
        name: &str,
        params: &[String],
        body: &Block,
        scope: &Arc<Scope>,
    ) -> Result<(), ScriptError> {
        validate_name(name)?;
        for param in params {
            validate_name(param)?;
        }
        let callable = Arc::new(Callable::script(
            name,
            params.to_vec(),
            Arc::clone(body),
            Arc::downgrade(scope),
        ));
        let returning = contains_return(body);
        scope.add_method(Arc::clone(&callable));
        if returning {
            scope.add_returning_method(callable);
        }
        tracing::debug!(name, arity = params.len(), returning, "defined callable");
        Ok(())
    }

    /// Invoke the first overload in `candidates` that accepts `args`.
    ///
    /// `want_value` marks a call whose result is used; such a call fails if
    /// the selected script callable finishes without `return`.
    pub(crate) fn dispatch(
        &self,
        name: &str,
        candidates: &[Arc<Callable>],
        args: &[Value],
        want_value: bool,
    ) -> Result<Value, ScriptError> {
        if candidates.is_empty() {
            return Err(ScriptError::not_found(name));
        }
        let callable = candidates
            .iter()
            .find(|c| c.signature.accepts(args))
            .ok_or_else(|| ErrorKind::NoMatchingOverload {
                name: name.to_string(),
                args: describe_args(args),
            })?;
        self.invoke(callable, args, want_value)
    }

    pub(crate) fn invoke(
        &self,
        callable: &Callable,
        args: &[Value],
        want_value: bool,
    ) -> Result<Value, ScriptError> {
        self.invoke_with(callable, args, want_value, |_| ())
    }

    /// Like [`invoke`](Self::invoke), handing a script callable's call frame
    /// to `on_frame` once its parameters are bound.
    pub(crate) fn invoke_with(
        &self,
        callable: &Callable,
        args: &[Value],
        want_value: bool,
        on_frame: impl FnOnce(&Arc<Scope>),
    ) -> Result<Value, ScriptError> {
        trace!(name = %callable.name, argc = args.len(), "invoking callable");
        match &callable.body {
            CallableBody::Native(f) => f(args),
            CallableBody::Script {
                params,
                body,
                scope,
            } => {
                let declaring = scope
                    .upgrade()
                    .ok_or_else(|| ScriptError::not_found(&callable.name))?;
                let call_scope = Scope::child(&declaring);
                for (param, arg) in params.iter().zip(args) {
                    call_scope.declare(param, arg.clone())?;
                }
                on_frame(&call_scope);
                match self.enter_call(|| self.execute_block(body, &call_scope))? {
                    ExecOutcome::Return(value) => Ok(value),
                    ExecOutcome::Normal if want_value => Err(ErrorKind::NoValueReturned {
                        name: callable.name.clone(),
                    }
                    .into()),
                    ExecOutcome::Normal => Ok(Value::Null),
                }
            }
            CallableBody::Super {
                parent,
                instance,
                construction,
            } => {
                let target = instance
                    .upgrade()
                    .ok_or_else(|| ScriptError::not_found(&callable.name))?;
                let base = self.enter_call(|| self.construct(parent, args))?;
                target.merge_from(base.scope());
                construction.super_finished();
                Ok(Value::Null)
            }
        }
    }

    /// Run `f` one call level deeper, failing past the configured depth.
    pub(crate) fn enter_call<T>(
        &self,
        f: impl FnOnce() -> Result<T, ScriptError>,
    ) -> Result<T, ScriptError> {
        let depth = self.depth.get();
        let limit = self.config().max_call_depth;
        if depth >= limit {
            return Err(ErrorKind::RecursionLimit { limit }.into());
        }
        self.depth.set(depth + 1);
        let result = f();
        self.depth.set(depth);
        result
    }

    /// `name(args);` or `object.name(args);` as a statement.
    ///
    /// Void overloads are searched before value-returning ones; a returned
    /// value is discarded.
    pub(crate) fn call_statement(
        &self,
        callee: &Callee,
        args: &[Expr],
        scope: &Arc<Scope>,
    ) -> Result<(), ScriptError> {
        let args = self.eval_args(args, scope)?;
        let (name, target) = match callee {
            Callee::Name(name) => (name, Arc::clone(scope)),
            Callee::Method { object, name } => {
                let object = self.eval_expr(object, scope)?;
                (name, Arc::clone(object.expect_instance()?.scope()))
            }
        };
        let void = target.methods(name);
        if let Some(callable) = void.iter().find(|c| c.signature.accepts(&args)) {
            self.invoke(callable, &args, false)?;
            return Ok(());
        }
        let mut candidates: Overloads = void;
        candidates.extend(target.returning_methods(name));
        self.dispatch(name, &candidates, &args, false)?;
        Ok(())
    }

    /// `name(args)` inside an expression, against value-returning callables.
    pub(crate) fn call_returning(
        &self,
        name: &str,
        args: &[Value],
        target: &Scope,
    ) -> Result<Value, ScriptError> {
        let candidates = target.returning_methods(name);
        if candidates.is_empty() && !target.methods(name).is_empty() {
            return Err(ErrorKind::NoValueReturned {
                name: name.to_string(),
            }
            .into());
        }
        self.dispatch(name, &candidates, args, true)
    }

    /// Call a member of `instance` from host code.
    ///
    /// Value-returning overloads are preferred; when there are none the void
    /// overloads are tried and `Null` is returned.
    pub fn call_method(
        &self,
        instance: &Instance,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ScriptError> {
        let scope = instance.scope();
        let returning = scope.returning_methods(name);
        if returning.is_empty() {
            return self.dispatch(name, &scope.methods(name), args, false);
        }
        self.dispatch(name, &returning, args, true)
    }
}

impl Instance {
    /// Call one of this instance's methods.
    pub fn call(
        &self,
        interpreter: &Interpreter,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ScriptError> {
        interpreter.call_method(self, name, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_arity_and_kind() {
        let sig = Signature::new([ValueKind::Number, ValueKind::Any]);
        assert!(sig.accepts(&[1.into(), "x".into()]));
        assert!(!sig.accepts(&["x".into(), 1.into()]));
        assert!(!sig.accepts(&[1.into()]));
        assert_eq!(sig.to_string(), "(Number, Any)");
    }

    #[test]
    fn first_matching_overload_wins() {
        let interp = Interpreter::new();
        let scope = Scope::root();
        scope
            .register_returning_method("pick", Signature::new([ValueKind::Number]), |_| {
                Ok("number".into())
            })
            .unwrap();
        scope
            .register_returning_method("pick", Signature::any(1), |_| Ok("any".into()))
            .unwrap();

        let candidates = scope.returning_methods("pick");
        let picked = interp.dispatch("pick", &candidates, &[1.into()], true).unwrap();
        assert_eq!(picked, Value::from("number"));
        let picked = interp
            .dispatch("pick", &candidates, &["s".into()], true)
            .unwrap();
        assert_eq!(picked, Value::from("any"));
    }

    #[test]
    fn dispatch_failures() {
        let interp = Interpreter::new();
        let err = interp.dispatch("ghost", &[], &[], true).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NotFound { .. }));

        let scope = Scope::root();
        scope
            .register_method("one", Signature::any(1), |_| Ok(Value::Null))
            .unwrap();
        let err = interp
            .dispatch("one", &scope.methods("one"), &[], false)
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NoMatchingOverload { .. }));
    }

    #[test]
    fn native_errors_propagate() {
        let interp = Interpreter::new();
        let scope = Scope::root();
        scope
            .register_returning_method("fail", Signature::any(0), |_| {
                Err(ScriptError::native("fail", "motor stalled"))
            })
            .unwrap();
        let err = interp.evaluate(&scope, "fail()").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Native { .. }));
    }
}
