//! Function and symbol libraries.
//!
//! Expressions resolve bare names through [`Library::resolve`] and calls
//! through [`Library::lookup`]. [`FunctionRegistry`] is the standard
//! implementation: overloads grouped by name and arity, fixed constants and
//! dynamic variables.

use std::fmt;
use std::sync::Arc;

use dialect_types::{widening_distance, ScalarKind, Value};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

/// Body of a registered function. Arguments arrive coerced to the declared
/// parameter kinds.
pub type FunctionBody = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Getter of a dynamic symbol.
pub type VariableGetter = Arc<dyn Fn() -> Value + Send + Sync>;

/// A callable with a declared signature.
#[derive(Clone)]
pub struct Function {
    name: String,
    params: SmallVec<[ScalarKind; 4]>,
    returns: ScalarKind,
    is_static: bool,
    variadic: bool,
    body: FunctionBody,
}

impl Function {
    /// A static (pure) function. Calls with static arguments are folded.
    pub fn new<F>(name: &str, params: &[ScalarKind], returns: ScalarKind, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Function {
            name: name.to_string(),
            params: SmallVec::from_slice(params),
            returns,
            is_static: true,
            variadic: false,
            body: Arc::new(body),
        }
    }

    /// Mark the function as clock- or environment-dependent; never folded.
    #[must_use]
    pub fn dynamic(mut self) -> Self {
        self.is_static = false;
        self
    }

    /// The last parameter kind repeats; at least one occurrence is required.
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = !self.params.is_empty();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ScalarKind] {
        &self.params
    }

    pub fn returns(&self) -> ScalarKind {
        self.returns
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Declared kind of the parameter at `index`.
    pub fn param(&self, index: usize) -> Option<ScalarKind> {
        match self.params.get(index) {
            Some(kind) => Some(*kind),
            None if self.variadic => self.params.last().copied(),
            None => None,
        }
    }

    /// Returns `true` if `count` arguments can bind to this function.
    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.variadic {
            count >= self.params.len()
        } else {
            count == self.params.len()
        }
    }

    /// Total widening distance of binding `args`, `None` if any narrows.
    pub fn distance(&self, args: &[ScalarKind]) -> Option<u32> {
        if !self.accepts_arity(args.len()) {
            return None;
        }
        args.iter().enumerate().try_fold(0u32, |total, (i, arg)| {
            let param = self.param(i)?;
            Some(total + widening_distance(*arg, param)?)
        })
    }

    /// Invoke the body.
    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        (self.body)(args)
    }

    /// `name(kind, kind...)`
    pub fn signature(&self) -> String {
        let mut kinds: Vec<String> = self.params.iter().map(|k| k.name().to_string()).collect();
        if self.variadic {
            if let Some(last) = kinds.last_mut() {
                last.push_str("...");
            }
        }
        format!("{}({}) -> {}", self.name, kinds.join(", "), self.returns)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature())
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

/// Value of a resolved symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub value: Value,
    /// Fixed symbols never change and are folded into constants.
    pub fixed: bool,
}

impl Resolution {
    pub fn fixed(value: Value) -> Self {
        Resolution { value, fixed: true }
    }

    pub fn variable(value: Value) -> Self {
        Resolution {
            value,
            fixed: false,
        }
    }
}

/// Source of symbols and functions for expressions.
///
/// Shared read-only between concurrent transformer runs.
pub trait Library: Send + Sync {
    /// Resolve a bare name.
    fn resolve(&self, name: &str) -> Option<Resolution>;

    /// Select the overload of `name` best matching `args`.
    fn lookup(&self, name: &str, args: &[ScalarKind]) -> Option<Arc<Function>>;
}

/// Registration failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("function `{signature}` is already registered")]
    DuplicateSignature { signature: String },

    #[error("symbol `{name}` is already defined")]
    DuplicateSymbol { name: String },
}

/// Standard [`Library`] implementation.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    /// Fixed-arity overloads by `(name, arity)`, in registration order.
    functions: FxHashMap<(String, usize), Vec<Arc<Function>>>,
    /// Variadic overloads by name.
    variadic: FxHashMap<String, Vec<Arc<Function>>>,
    constants: FxHashMap<String, Value>,
    variables: FxHashMap<String, VariableGetter>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the builtin functions and constants.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register(&mut registry);
        registry
    }

    /// Register an overload. Rejects a second function with the same name
    /// and parameter kinds.
    pub fn register(&mut self, function: Function) -> Result<(), RegistryError> {
        let duplicate = |existing: &Vec<Arc<Function>>| {
            existing
                .iter()
                .any(|f| f.params == function.params && f.variadic == function.variadic)
        };
        let group = if function.variadic {
            self.variadic.entry(function.name.clone()).or_default()
        } else {
            self.functions
                .entry((function.name.clone(), function.params.len()))
                .or_default()
        };
        if duplicate(group) {
            return Err(RegistryError::DuplicateSignature {
                signature: function.signature(),
            });
        }
        group.push(Arc::new(function));
        Ok(())
    }

    /// Define a fixed symbol.
    pub fn define_constant(&mut self, name: &str, value: Value) -> Result<(), RegistryError> {
        self.check_symbol(name)?;
        self.constants.insert(name.to_string(), value);
        Ok(())
    }

    /// Define a symbol whose value is read on every evaluation.
    pub fn define_variable<F>(&mut self, name: &str, getter: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.check_symbol(name)?;
        self.variables.insert(name.to_string(), Arc::new(getter));
        Ok(())
    }

    fn check_symbol(&self, name: &str) -> Result<(), RegistryError> {
        if self.constants.contains_key(name) || self.variables.contains_key(name) {
            Err(RegistryError::DuplicateSymbol {
                name: name.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Every overload registered under `name`.
    pub fn overloads<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<Function>> + 'a {
        self.functions
            .iter()
            .filter(move |((n, _), _)| n == name)
            .flat_map(|(_, group)| group.iter())
            .chain(self.variadic.get(name).into_iter().flatten())
    }
}

impl Library for FunctionRegistry {
    fn resolve(&self, name: &str) -> Option<Resolution> {
        if let Some(value) = self.constants.get(name) {
            return Some(Resolution::fixed(value.clone()));
        }
        self.variables
            .get(name)
            .map(|getter| Resolution::variable(getter()))
    }

    /// Minimum total widening distance wins; ties go to the earliest
    /// registration, fixed-arity overloads before variadic ones.
    fn lookup(&self, name: &str, args: &[ScalarKind]) -> Option<Arc<Function>> {
        let fixed = self
            .functions
            .get(&(name.to_string(), args.len()))
            .into_iter()
            .flatten();
        let variadic = self.variadic.get(name).into_iter().flatten();

        let mut best: Option<(u32, &Arc<Function>)> = None;
        for candidate in fixed.chain(variadic) {
            let Some(distance) = candidate.distance(args) else {
                continue;
            };
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, candidate));
            }
        }
        best.map(|(_, function)| Arc::clone(function))
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &(self.functions.len() + self.variadic.len()))
            .field("constants", &self.constants.len())
            .field("variables", &self.variables.len())
            .finish()
    }
}
