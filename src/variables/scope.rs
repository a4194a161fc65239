//! Variable scopes consulted during resolution.
//!
//! A [`VariableScopes`] is built for one request (or, inside the parser,
//! for one file) and dropped afterwards. Lookup walks the scopes in a fixed
//! precedence order; the file scope is the only one written to during
//! resolution, to memoize generated values for the rest of the request.

use super::environment::{OsEnvironment, ProcessEnv};
use super::system::{pregenerate_request_variables, GeneratorContext};
use crate::models::{ParsedFile, Request};
use crate::parser::ParseOptions;
use std::collections::HashMap;
use std::sync::Arc;

/// Which scope a variable was found in, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeKind {
    /// Variables supplied by the caller
    Programmatic,
    /// `@name = value` definitions, plus request-local overrides
    File,
    /// The selected environment
    Environment,
    /// The `$shared` section of the environment files
    Global,
    /// Process environment
    Process,
    /// The dotenv file next to the request file
    Dotenv,
}

/// The ordered set of variable sources for one resolution pass.
#[derive(Debug, Clone)]
pub struct VariableScopes {
    pub programmatic: HashMap<String, String>,
    pub file: HashMap<String, String>,
    pub environment: HashMap<String, String>,
    pub global: HashMap<String, String>,
    pub dotenv: HashMap<String, String>,

    /// Pre-generated system variables (`$uuid`, `$timestamp`, ...), keyed
    /// with their `$` prefix.
    pub request_scoped: HashMap<String, String>,

    process_env: Arc<dyn ProcessEnv>,
}

impl Default for VariableScopes {
    fn default() -> Self {
        Self::new(Arc::new(OsEnvironment))
    }
}

impl VariableScopes {
    /// Creates empty scopes reading the process environment through
    /// `process_env`. Nothing is pre-generated.
    pub fn new(process_env: Arc<dyn ProcessEnv>) -> Self {
        Self {
            programmatic: HashMap::new(),
            file: HashMap::new(),
            environment: HashMap::new(),
            global: HashMap::new(),
            dotenv: HashMap::new(),
            request_scoped: HashMap::new(),
            process_env,
        }
    }

    /// Builds the scopes for resolving `request`, including a fresh set of
    /// pre-generated system variables.
    pub fn for_request(parsed: &ParsedFile, request: &Request, options: &ParseOptions) -> Self {
        let mut scopes = Self::new(Arc::clone(&options.process_env));
        scopes.programmatic = options.variables.clone();
        scopes.file = request.variables.clone();
        scopes.environment = parsed.environment_variables.clone();
        scopes.global = parsed.global_variables.clone();
        scopes.dotenv = parsed.dotenv_variables.clone();
        scopes.pregenerate();
        scopes
    }

    /// Merges request-local overrides over the file scope.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.file
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Replaces the request-scoped system variables with freshly generated
    /// values.
    pub fn pregenerate(&mut self) {
        self.request_scoped = pregenerate_request_variables();
    }

    /// Looks `name` up in precedence order.
    pub fn lookup(&self, name: &str) -> Option<(ScopeKind, String)> {
        let maps = [
            (ScopeKind::Programmatic, &self.programmatic),
            (ScopeKind::File, &self.file),
            (ScopeKind::Environment, &self.environment),
            (ScopeKind::Global, &self.global),
        ];
        for (kind, map) in maps {
            if let Some(value) = map.get(name) {
                return Some((kind, value.clone()));
            }
        }

        if let Some(value) = self.process_env.var(name) {
            return Some((ScopeKind::Process, value));
        }

        self.dotenv
            .get(name)
            .map(|value| (ScopeKind::Dotenv, value.clone()))
    }

    /// Context handed to system-variable generators.
    pub fn generator_context(&self) -> GeneratorContext<'_> {
        GeneratorContext {
            process_env: self.process_env.as_ref(),
            dotenv: &self.dotenv,
        }
    }
}
