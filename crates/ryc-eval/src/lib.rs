//! ryc evaluator: runs a parsed program directly from the AST.
//!
//! Values are dynamically typed. Declared types are enforced by implicit
//! coercion at declaration, assignment, parameter binding and `return`.
//! Output and input go through a [`Host`], so embedders and tests can
//! capture them.

pub mod cast;
mod config;
pub mod env;
mod evaluator;
pub mod host;
pub mod natives;
pub mod ops;
pub mod value;

pub use config::{EvalConfig, DEFAULT_MAX_CALL_DEPTH};
pub use env::{Binding, Environment, ScopeId};
pub use evaluator::{Evaluator, Flow};
pub use host::{BufferHost, Host, StdHost};
pub use natives::{NativeContext, NativeError, NativeFn, NativeRegistry};
pub use value::{ArrayRef, Closure, NativeFunction, Value};
