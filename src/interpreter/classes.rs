//! Classes and the construction protocol
//!
//! A class is declared once and constructed many times. Construction of an
//! instance runs these steps in order:
//!
//! 1. create the instance scope as a child of the class's declaring scope
//! 2. with a parent class, install one temporary `super` overload per parent
//!    constructor arity
//! 3. run the class body in the instance scope
//! 4. without a declared `construct`, install an empty zero-arg one
//! 5. run the `construct` overload matching the arguments
//! 6. with a parent class that was never constructed, call zero-arg `super()`
//! 7. remove `super` and `construct` from the instance
//!
//! `super(...)` builds a parent instance and merges its members into the new
//! instance. Members the subclass already declared win.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::interpreter::callables::{describe_args, Callable};
use crate::interpreter::constants::{CONSTRUCTOR, SUPER};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ErrorKind, ScriptError};
use crate::memory::scope::{validate_name, Scope};
use crate::memory::value::{Instance, Value};
use crate::parser::ast::{constructor_arities, Block, Expr};

/// A declared class
pub struct Class {
    name: String,
    parent: Option<Arc<Class>>,
    body: Block,
    scope: Weak<Scope>,
    /// Arities of the `construct` overloads the body declares
    constructor_arities: Vec<usize>,
}

impl Class {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<Class>> {
        self.parent.as_ref()
    }

    /// Arities `super(...)` accepts when this class is a parent.
    fn super_arities(&self) -> Vec<usize> {
        let mut arities = self.constructor_arities.clone();
        arities.sort_unstable();
        arities.dedup();
        if arities.is_empty() {
            arities.push(0);
        }
        arities
    }
}

/// State shared by the `super` overloads of one instance under construction
#[derive(Default)]
pub(crate) struct Construction {
    super_invoked: AtomicBool,
    /// Call frame of the running `construct`
    frame: Mutex<Weak<Scope>>,
}

impl Construction {
    fn enter_constructor(&self, frame: &Arc<Scope>) {
        *self.frame.lock() = Arc::downgrade(frame);
    }

    /// Record a completed `super(...)` and let the running constructor see
    /// the members it merged into the instance.
    pub(crate) fn super_finished(&self) {
        self.super_invoked.store(true, Ordering::SeqCst);
        if let Some(frame) = self.frame.lock().upgrade() {
            frame.resnapshot();
        }
    }

    fn super_invoked(&self) -> bool {
        self.super_invoked.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("constructors", &self.constructor_arities)
            .finish()
    }
}

impl Interpreter {
    /// `class Name[(parent)]{body}`: register the class in `scope`.
    pub(crate) fn declare_class(
        &self,
        name: &str,
        parent: Option<&Expr>,
        body: &Block,
        scope: &Arc<Scope>,
    ) -> Result<(), ScriptError> {
        validate_name(name)?;
        let parent = match parent {
            Some(expr) => Some(self.resolve_class(expr, scope)?),
            None => None,
        };
        let class = Class {
            name: name.to_string(),
            parent,
            body: Arc::clone(body),
            scope: Arc::downgrade(scope),
            constructor_arities: constructor_arities(body, CONSTRUCTOR),
        };
        debug!(
            class = name,
            parent = class.parent.as_ref().map(|p| p.name()),
            "declared class"
        );
        scope.declare_class(Arc::new(class));
        Ok(())
    }

    /// Resolve a parent-class expression: `Name` or `instance.Name`.
    fn resolve_class(&self, expr: &Expr, scope: &Arc<Scope>) -> Result<Arc<Class>, ScriptError> {
        match expr {
            Expr::Variable(name) => scope.class(name).ok_or_else(|| ScriptError::not_found(name)),
            Expr::Member { object, name } => {
                let object = self.eval_expr(object, scope)?;
                object
                    .expect_instance()?
                    .scope()
                    .class(name)
                    .ok_or_else(|| ScriptError::not_found(name))
            }
            _ => Err(ErrorKind::TypeMismatch {
                expected: "class name".to_string(),
                got: "expression".to_string(),
            }
            .into()),
        }
    }

    /// Construct an instance of the class named `class_name` visible from `scope`.
    pub fn instantiate(
        &self,
        scope: &Arc<Scope>,
        class_name: &str,
        args: &[Value],
    ) -> Result<Instance, ScriptError> {
        let class = scope
            .class(class_name)
            .ok_or_else(|| ScriptError::not_found(class_name))?;
        self.enter_call(|| self.construct(&class, args))
    }

    pub(crate) fn construct(
        &self,
        class: &Arc<Class>,
        args: &[Value],
    ) -> Result<Instance, ScriptError> {
        let declaring = class
            .scope
            .upgrade()
            .ok_or_else(|| ScriptError::not_found(class.name()))?;
        let instance = Scope::child(&declaring);
        let construction = Arc::new(Construction::default());

        if let Some(parent) = &class.parent {
            for arity in parent.super_arities() {
                instance.add_method(Arc::new(Callable::superclass(
                    SUPER,
                    arity,
                    Arc::clone(parent),
                    Arc::downgrade(&instance),
                    Arc::clone(&construction),
                )));
            }
        }

        self.execute_block(&class.body, &instance)?;

        let mut constructors = instance.private_methods(CONSTRUCTOR);
        if constructors.is_empty() {
            let empty: Block = Arc::from(Vec::new());
            let synthesized = Arc::new(Callable::script(
                CONSTRUCTOR,
                Vec::new(),
                empty,
                Arc::downgrade(&instance),
            ));
            constructors.push(Arc::clone(&synthesized));
            instance.add_method(synthesized);
        }

        let constructor = constructors
            .iter()
            .find(|c| c.signature().accepts(args))
            .ok_or_else(|| ErrorKind::NoMatchingConstructor {
                class: class.name().to_string(),
                args: describe_args(args),
            })?;
        self.invoke_with(constructor, args, false, |frame| {
            construction.enter_constructor(frame)
        })?;

        if class.parent.is_some() && !construction.super_invoked() {
            let fallback = instance
                .private_methods(SUPER)
                .into_iter()
                .find(|c| c.signature().arity() == 0)
                .ok_or_else(|| ErrorKind::SuperNotInvoked {
                    class: class.name().to_string(),
                })?;
            self.invoke(&fallback, &[], false)?;
        }

        instance.remove_callables(SUPER);
        instance.remove_callables(CONSTRUCTOR);
        debug!(class = class.name(), argc = args.len(), "constructed instance");
        Ok(Instance::new(instance, Arc::clone(class)))
    }
}

