//! Scoped variable environment for the ryc evaluator.
//!
//! Scopes live in an arena and are addressed by generational [`ScopeId`]
//! handles. Each scope points at its parent, so a function body resolves
//! names through the scope it was declared in rather than the call site.
//! Scopes are created and released in stack order; a handle to a released
//! scope is detected instead of reading a recycled slot.

use std::collections::BTreeMap;

use ryc_types::ast::TypeAnnotation;
use ryc_types::{ErrorCode, Result, RycError};
use tracing::trace;

use crate::cast;
use crate::value::Value;

/// Handle to a scope in the [`Environment`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId {
    index: u32,
    generation: u32,
}

/// A declared name.
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    /// Declared type, with `auto` already resolved. Carries the array size.
    pub ty: TypeAnnotation,
    pub is_const: bool,
}

/// A single scope level.
#[derive(Debug)]
struct Scope {
    generation: u32,
    parent: Option<ScopeId>,
    /// Declared return type of the enclosing function; `None` at top level.
    return_type: Option<TypeAnnotation>,
    bindings: BTreeMap<String, Binding>,
}

/// Arena of scopes with push/pop semantics.
///
/// `declare` always creates in the given scope. `lookup` and `assign`
/// walk parent links from the given scope outward.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
    /// Last generation handed out per slot; survives pops.
    generations: Vec<u32>,
}

impl Environment {
    /// Create a new environment with one global scope.
    pub fn new() -> Self {
        let mut env = Self {
            scopes: Vec::new(),
            generations: Vec::new(),
        };
        env.open(None, None);
        env
    }

    /// The program-lifetime global scope.
    pub fn global(&self) -> ScopeId {
        ScopeId {
            index: 0,
            generation: self.generations[0],
        }
    }

    /// Number of live scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    // ── Scope lifetime ───────────────────────────────────────────────────

    /// Push a block scope; it inherits the parent's return type.
    pub fn push(&mut self, parent: ScopeId, line: u32) -> Result<ScopeId> {
        let return_type = self.scope(parent, line)?.return_type.clone();
        Ok(self.open(Some(parent), return_type))
    }

    /// Push the scope of a function call.
    pub fn push_function(
        &mut self,
        parent: ScopeId,
        return_type: TypeAnnotation,
        line: u32,
    ) -> Result<ScopeId> {
        self.scope(parent, line)?;
        Ok(self.open(Some(parent), Some(return_type)))
    }

    /// Release `scope` and anything pushed after it.
    pub fn pop(&mut self, scope: ScopeId) {
        let index = scope.index as usize;
        if self.is_live(scope) && index > 0 {
            self.scopes.truncate(index);
            trace!(depth = self.scopes.len(), "popped scope");
        }
    }

    fn open(&mut self, parent: Option<ScopeId>, return_type: Option<TypeAnnotation>) -> ScopeId {
        let index = self.scopes.len();
        if self.generations.len() <= index {
            self.generations.push(0);
        }
        self.generations[index] += 1;
        let generation = self.generations[index];
        self.scopes.push(Scope {
            generation,
            parent,
            return_type,
            bindings: BTreeMap::new(),
        });
        trace!(depth = self.scopes.len(), "pushed scope");
        ScopeId {
            index: index as u32,
            generation,
        }
    }

    fn is_live(&self, id: ScopeId) -> bool {
        self.scopes
            .get(id.index as usize)
            .is_some_and(|s| s.generation == id.generation)
    }

    fn scope(&self, id: ScopeId, line: u32) -> Result<&Scope> {
        self.scopes
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .ok_or_else(|| dangling(line))
    }

    fn scope_mut(&mut self, id: ScopeId, line: u32) -> Result<&mut Scope> {
        self.scopes
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .ok_or_else(|| dangling(line))
    }

    // ── Bindings ─────────────────────────────────────────────────────────

    /// Declare `name` in `scope`. Fails if it already exists at this level.
    pub fn declare(&mut self, scope: ScopeId, name: &str, binding: Binding, line: u32) -> Result<()> {
        let bindings = &mut self.scope_mut(scope, line)?.bindings;
        if bindings.contains_key(name) {
            return Err(RycError::runtime(
                ErrorCode::REDECLARATION,
                format!("'{name}' is already declared in this scope"),
                line,
            ));
        }
        bindings.insert(name.to_string(), binding);
        Ok(())
    }

    /// The scope that defines `name`, searching outward from `scope`.
    pub fn resolve(&self, scope: ScopeId, name: &str, line: u32) -> Result<ScopeId> {
        self.find(scope, name, line)?.ok_or_else(|| {
            RycError::runtime(
                ErrorCode::UNDEFINED_SYMBOL,
                format!("cannot resolve symbol '{name}'"),
                line,
            )
        })
    }

    /// Like [`resolve`](Self::resolve), but an undefined name is `None`.
    pub fn find(&self, scope: ScopeId, name: &str, line: u32) -> Result<Option<ScopeId>> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id, line)?;
            if s.bindings.contains_key(name) {
                return Ok(Some(id));
            }
            current = s.parent;
        }
        Ok(None)
    }

    /// The binding for `name`, searching outward from `scope`.
    pub fn binding(&self, scope: ScopeId, name: &str, line: u32) -> Result<&Binding> {
        let owner = self.resolve(scope, name, line)?;
        self.scope(owner, line)?
            .bindings
            .get(name)
            .ok_or_else(|| dangling(line))
    }

    /// Read the value bound to `name`.
    pub fn lookup(&self, scope: ScopeId, name: &str, line: u32) -> Result<Value> {
        self.binding(scope, name, line).map(|b| b.value.clone())
    }

    /// Coerce `value` to the binding's declared type and store it.
    /// Returns the stored value.
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Value, line: u32) -> Result<Value> {
        let owner = self.resolve(scope, name, line)?;
        let binding = self
            .scope_mut(owner, line)?
            .bindings
            .get_mut(name)
            .ok_or_else(|| dangling(line))?;
        if binding.is_const {
            return Err(RycError::runtime(
                ErrorCode::CONST_ASSIGNMENT,
                format!("cannot assign to const '{name}'"),
                line,
            ));
        }
        let value = cast::coerce(value, &binding.ty, line)?;
        binding.value = value.clone();
        Ok(value)
    }

    /// Declared return type of the function enclosing `scope`.
    pub fn return_type(&self, scope: ScopeId, line: u32) -> Result<Option<&TypeAnnotation>> {
        Ok(self.scope(scope, line)?.return_type.as_ref())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn dangling(line: u32) -> RycError {
    RycError::runtime(
        ErrorCode::DANGLING_SCOPE,
        "scope is no longer live: a function outlived the block that declared it",
        line,
    )
}
