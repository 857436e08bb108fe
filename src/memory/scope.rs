//! Hierarchical binding environments
//!
//! A [`Scope`] owns four binding tables: variables, void callables,
//! value-returning callables and classes. Each table is split in two:
//!
//! - **private** entries, declared in this scope
//! - **public** entries, copied once from the parent's private and public
//!   entries when this scope was created
//!
//! Lookup checks private first, then public. The public half is a snapshot:
//! names the parent declares after the child exists are invisible to it, and a
//! parent rebinding one of its own names does not disturb the child.
//!
//! # Slots
//!
//! Variables are stored in shared slots. Copying the parent's table copies slot
//! handles, so a child assigning to an inherited name writes through to the
//! ancestor that owns it. Assigning to a private name installs a fresh slot
//! instead, which is what keeps already-created children on their snapshot.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::interpreter::callables::{Callable, Signature};
use crate::interpreter::classes::Class;
use crate::interpreter::constants::{RESERVED_FRAGMENTS, RESERVED_NAMES};
use crate::interpreter::errors::{ErrorKind, ScriptError};
use crate::memory::value::Value;

/// A shared, mutable variable binding
pub type Slot = Arc<RwLock<Value>>;

/// Callables registered under one name, in registration order
pub type Overloads = Vec<Arc<Callable>>;

fn new_slot(value: Value) -> Slot {
    Arc::new(RwLock::new(value))
}

/// Private and public halves of one binding table
#[derive(Clone)]
struct Table<T> {
    private: FxHashMap<String, T>,
    public: FxHashMap<String, T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Table {
            private: FxHashMap::default(),
            public: FxHashMap::default(),
        }
    }

    /// Builds a child table whose public half is this table's combined entries.
    ///
    /// `join` combines a private entry with a public entry of the same name.
    fn snapshot(&self, join: fn(&T, &T) -> T) -> Self {
        let mut public = self.public.clone();
        for (key, value) in &self.private {
            let combined = match public.get(key) {
                Some(inherited) => join(value, inherited),
                None => value.clone(),
            };
            public.insert(key.clone(), combined);
        }
        Table {
            private: FxHashMap::default(),
            public,
        }
    }

    fn get(&self, key: &str) -> Option<&T> {
        self.private.get(key).or_else(|| self.public.get(key))
    }

    fn contains(&self, key: &str) -> bool {
        self.private.contains_key(key) || self.public.contains_key(key)
    }
}

fn shadow<T: Clone>(private: &T, _public: &T) -> T {
    private.clone()
}

fn chain(private: &Overloads, public: &Overloads) -> Overloads {
    private.iter().chain(public.iter()).cloned().collect()
}

/// Check that `name` can be declared.
///
/// Names may not contain quotes, assignment, comparison, arithmetic or
/// logical operator characters, parentheses, may not start with `!`, and may
/// not be `true` or `false`.
pub fn validate_name(name: &str) -> Result<(), ScriptError> {
    let illegal = name.is_empty()
        || name.starts_with('!')
        || RESERVED_NAMES.contains(&name)
        || RESERVED_FRAGMENTS
            .iter()
            .any(|fragment| name.contains(fragment));
    if illegal {
        return Err(ErrorKind::IllegalName {
            name: name.to_string(),
        }
        .into());
    }
    Ok(())
}

/// A binding environment linked to at most one parent
pub struct Scope {
    parent: Option<Arc<Scope>>,
    variables: RwLock<Table<Slot>>,
    methods: RwLock<Table<Overloads>>,
    returning_methods: RwLock<Table<Overloads>>,
    classes: RwLock<Table<Arc<Class>>>,
    /// Parent-class instances merged into this one by `super(...)`.
    bases: Mutex<Vec<Arc<Scope>>>,
}

impl Scope {
    /// Create a scope with no parent and empty tables.
    pub fn root() -> Arc<Scope> {
        Arc::new(Scope {
            parent: None,
            variables: RwLock::new(Table::new()),
            methods: RwLock::new(Table::new()),
            returning_methods: RwLock::new(Table::new()),
            classes: RwLock::new(Table::new()),
            bases: Mutex::new(Vec::new()),
        })
    }

    /// Create a child of `parent`, snapshotting every parent table.
    pub fn child(parent: &Arc<Scope>) -> Arc<Scope> {
        Arc::new(Scope {
            parent: Some(Arc::clone(parent)),
            variables: RwLock::new(parent.variables.read().snapshot(shadow)),
            methods: RwLock::new(parent.methods.read().snapshot(chain)),
            returning_methods: RwLock::new(parent.returning_methods.read().snapshot(chain)),
            classes: RwLock::new(parent.classes.read().snapshot(shadow)),
            bases: Mutex::new(Vec::new()),
        })
    }

    pub fn parent(&self) -> Option<&Arc<Scope>> {
        self.parent.as_ref()
    }

    /// Take the parent snapshot again, keeping private entries.
    ///
    /// Used by `super(...)` so a running constructor sees the members just
    /// merged into its instance.
    pub(crate) fn resnapshot(&self) {
        let Some(parent) = &self.parent else {
            return;
        };
        self.variables.write().public = parent.variables.read().snapshot(shadow).public;
        self.methods.write().public = parent.methods.read().snapshot(chain).public;
        self.returning_methods.write().public =
            parent.returning_methods.read().snapshot(chain).public;
        self.classes.write().public = parent.classes.read().snapshot(shadow).public;
    }

    // ===== Variables =====

    /// Declare (or redeclare) a private variable.
    pub fn declare(&self, key: &str, value: Value) -> Result<(), ScriptError> {
        validate_name(key)?;
        self.variables
            .write()
            .private
            .insert(key.to_string(), new_slot(value));
        Ok(())
    }

    /// Declare a variable in the public half, as though it had been inherited.
    pub fn declare_public(&self, key: &str, value: Value) -> Result<(), ScriptError> {
        validate_name(key)?;
        self.variables
            .write()
            .public
            .insert(key.to_string(), new_slot(value));
        Ok(())
    }

    /// Resolve a variable: private first, then public.
    pub fn lookup(&self, key: &str) -> Result<Value, ScriptError> {
        self.get(key).ok_or_else(|| ScriptError::not_found(key))
    }

    pub fn lookup_private(&self, key: &str) -> Result<Value, ScriptError> {
        let slot = self.variables.read().private.get(key).cloned();
        slot.map(|slot| slot.read().clone())
            .ok_or_else(|| ScriptError::not_found(key))
    }

    pub fn lookup_public(&self, key: &str) -> Result<Value, ScriptError> {
        let slot = self.variables.read().public.get(key).cloned();
        slot.map(|slot| slot.read().clone())
            .ok_or_else(|| ScriptError::not_found(key))
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let slot = self.variables.read().get(key).cloned();
        slot.map(|slot| slot.read().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.read().contains(key)
    }

    /// Assign a variable.
    ///
    /// A private name is rebound to a fresh slot, an inherited name is written
    /// through its shared slot, and an unknown name is declared privately.
    pub fn assign(&self, key: &str, value: Value) -> Result<(), ScriptError> {
        let mut vars = self.variables.write();
        if vars.private.contains_key(key) {
            vars.private.insert(key.to_string(), new_slot(value));
            return Ok(());
        }
        if let Some(slot) = vars.public.get(key).cloned() {
            drop(vars);
            *slot.write() = value;
            return Ok(());
        }
        validate_name(key)?;
        vars.private.insert(key.to_string(), new_slot(value));
        Ok(())
    }

    /// Remove a variable binding from this scope, returning its last value.
    pub fn remove(&self, key: &str) -> Result<Value, ScriptError> {
        let mut vars = self.variables.write();
        let slot = vars
            .private
            .remove(key)
            .or_else(|| vars.public.remove(key))
            .ok_or_else(|| ScriptError::not_found(key))?;
        drop(vars);
        let value = slot.read().clone();
        Ok(value)
    }

    /// Names visible from this scope, sorted.
    pub fn variable_names(&self) -> Vec<String> {
        let vars = self.variables.read();
        let mut names: Vec<String> = vars
            .private
            .keys()
            .chain(vars.public.keys().filter(|k| !vars.private.contains_key(*k)))
            .cloned()
            .collect();
        names.sort();
        names
    }

    // ===== Callables =====

    /// Register a native void callable.
    pub fn register_method<F>(
        &self,
        name: &str,
        signature: Signature,
        f: F,
    ) -> Result<(), ScriptError>
    where
        F: Fn(&[Value]) -> Result<Value, ScriptError> + Send + Sync + 'static,
    {
        validate_name(name)?;
        self.add_method(Arc::new(Callable::native(name, signature, f)));
        Ok(())
    }

    /// Register a native value-returning callable.
    pub fn register_returning_method<F>(
        &self,
        name: &str,
        signature: Signature,
        f: F,
    ) -> Result<(), ScriptError>
    where
        F: Fn(&[Value]) -> Result<Value, ScriptError> + Send + Sync + 'static,
    {
        validate_name(name)?;
        self.add_returning_method(Arc::new(Callable::native(name, signature, f)));
        Ok(())
    }

    pub(crate) fn add_method(&self, callable: Arc<Callable>) {
        self.methods
            .write()
            .private
            .entry(callable.name().to_string())
            .or_default()
            .push(callable);
    }

    pub(crate) fn add_returning_method(&self, callable: Arc<Callable>) {
        self.returning_methods
            .write()
            .private
            .entry(callable.name().to_string())
            .or_default()
            .push(callable);
    }

    /// Void overloads of `name`, private ones first.
    pub fn methods(&self, name: &str) -> Overloads {
        overloads(&self.methods.read(), name)
    }

    /// Value-returning overloads of `name`, private ones first.
    pub fn returning_methods(&self, name: &str) -> Overloads {
        overloads(&self.returning_methods.read(), name)
    }

    pub(crate) fn private_methods(&self, name: &str) -> Overloads {
        self.methods
            .read()
            .private
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_callable(&self, name: &str) -> bool {
        self.methods.read().contains(name) || self.returning_methods.read().contains(name)
    }

    /// Drop every callable registered under `name` in this scope.
    pub(crate) fn remove_callables(&self, name: &str) {
        for table in [&self.methods, &self.returning_methods] {
            let mut table = table.write();
            table.private.remove(name);
            table.public.remove(name);
        }
    }

    // ===== Classes =====

    pub(crate) fn declare_class(&self, class: Arc<Class>) {
        self.classes
            .write()
            .private
            .insert(class.name().to_string(), class);
    }

    pub fn class(&self, name: &str) -> Option<Arc<Class>> {
        self.classes.read().get(name).cloned()
    }

    // ===== Inheritance =====

    /// Copy the members `base` declared into this scope.
    ///
    /// Variables and classes this scope already declares are kept; callable
    /// overloads from `base` are appended after this scope's own. `base` stays
    /// alive as long as this scope does, since copied methods resolve their
    /// bodies against it.
    pub(crate) fn merge_from(&self, base: &Arc<Scope>) {
        {
            let from = base.variables.read();
            let mut into = self.variables.write();
            for (key, slot) in &from.private {
                into.private
                    .entry(key.clone())
                    .or_insert_with(|| Arc::clone(slot));
            }
        }
        for (from, into) in [
            (&base.methods, &self.methods),
            (&base.returning_methods, &self.returning_methods),
        ] {
            let from = from.read();
            let mut into = into.write();
            for (key, callables) in &from.private {
                into.private
                    .entry(key.clone())
                    .or_default()
                    .extend(callables.iter().cloned());
            }
        }
        {
            let from = base.classes.read();
            let mut into = self.classes.write();
            for (key, class) in &from.private {
                into.private
                    .entry(key.clone())
                    .or_insert_with(|| Arc::clone(class));
            }
        }
        self.bases.lock().push(Arc::clone(base));
    }
}

fn overloads(table: &Table<Overloads>, name: &str) -> Overloads {
    let mut found = table.private.get(name).cloned().unwrap_or_default();
    if let Some(public) = table.public.get(name) {
        found.extend(public.iter().cloned());
    }
    found
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("variables", &self.variable_names())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
