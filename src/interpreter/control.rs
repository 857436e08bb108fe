//! Branching, error recovery and threads (`if`, `try`, `thread`).

use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::interpreter::constants::THREAD_STACK_SIZE;
use crate::interpreter::engine::{ExecOutcome, Interpreter};
use crate::interpreter::errors::ScriptError;
use crate::memory::scope::Scope;
use crate::parser::ast::{Block, Branch};

impl Interpreter {
    /// `if/elseif/else`: the first branch whose condition holds runs in a child scope.
    pub(crate) fn execute_if(
        &self,
        branches: &[Branch],
        scope: &Arc<Scope>,
    ) -> Result<ExecOutcome, ScriptError> {
        for branch in branches {
            let taken = match &branch.condition {
                Some(condition) => self.eval_expr(condition, scope)?.expect_bool()?,
                None => true,
            };
            if taken {
                return self.execute_block(&branch.body, &Scope::child(scope));
            }
        }
        Ok(ExecOutcome::Normal)
    }

    /// `try{body}[catch{handler}]`, both run in the enclosing scope.
    ///
    /// Any failure in `body` runs `handler`, or is dropped when there is none.
    pub(crate) fn execute_try(
        &self,
        body: &Block,
        handler: Option<&Block>,
        scope: &Arc<Scope>,
    ) -> Result<ExecOutcome, ScriptError> {
        match self.execute_block(body, scope) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                debug!(%err, "try block failed");
                match handler {
                    Some(handler) => self.execute_block(handler, scope),
                    None => Ok(ExecOutcome::Normal),
                }
            }
        }
    }

    /// `thread{body}`: run `body` on a detached OS thread against a child scope.
    ///
    /// Nothing comes back to the spawner. Failures inside the thread are
    /// logged and dropped.
    pub(crate) fn spawn_thread(&self, body: &Block, scope: &Arc<Scope>) -> Result<(), ScriptError> {
        let child = Scope::child(scope);
        let body = Arc::clone(body);
        let worker = self.sibling();
        let name = self.config().thread_name.clone();

        thread::Builder::new()
            .name(name.clone())
            .stack_size(THREAD_STACK_SIZE)
            .spawn(move || {
                if let Err(err) = worker.execute_block(&body, &child) {
                    warn!(thread = %name, %err, "script thread failed");
                }
            })
            .map_err(|err| ScriptError::native("thread", err.to_string()))?;
        debug!(thread = %self.config().thread_name, "spawned script thread");
        Ok(())
    }
}
