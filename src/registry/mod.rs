//! Extension registry for commands and environments.
//!
//! The translator consults the registry whenever it reads a control
//! sequence: registered commands are expanded in place, registered
//! environments take over rendering of a colon-opened body, and everything
//! else passes through as plain LaTeX. The registry is immutable after
//! construction — use [`RegistryBuilder`] to assemble one.
//!
//! # Example
//!
//! ```ignore
//! use pretex::registry::{Command, Registry, RegistryBuilder};
//!
//! let mut builder = RegistryBuilder::with_builtins();
//! builder.command(Command::new("sect", "!", |args| {
//!     format!("\\section{{{}}}", args[0].as_deref().unwrap_or(""))
//! }));
//! let registry = builder.build();
//! ```

mod builtins;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use crate::runner::CodeRunner;

pub use types::{
    resolve_args, Argument, Command, CommandAction, EnvHooks, Environment, EnvironmentAction,
    ParamKind, ParamPattern,
};

/// Immutable lookup table of registered commands and environments.
#[derive(Debug, Default)]
pub struct Registry {
    commands: HashMap<String, Command>,
    environments: HashMap<String, Environment>,
}

impl Registry {
    /// The builtin set without a code runner: `\exec` is not registered.
    pub fn builtin() -> Self {
        RegistryBuilder::with_builtins().build()
    }

    /// The builtin set with `\exec` wired to the given runner.
    pub fn builtin_with_runner(runner: Arc<dyn CodeRunner>) -> Self {
        let mut builder = RegistryBuilder::with_builtins();
        builder.environment(builtins::exec_environment(runner));
        builder.build()
    }

    /// Look up a command by name.
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Look up an environment by name.
    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.get(name)
    }

    /// Get all command names.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(|s| s.as_str())
    }

    /// Get all environment names.
    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(|s| s.as_str())
    }
}

/// Builder for constructing a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    commands: HashMap<String, Command>,
    environments: HashMap<String, Environment>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder preloaded with the builtin commands and
    /// environments (`docclass`, `tbf`, `colon`, `verb`, `eq`, `verbatim`).
    pub fn with_builtins() -> Self {
        let mut builder = Self::new();
        builtins::install(&mut builder);
        builder
    }

    /// Register a command. A later registration with the same name wins.
    pub fn command(&mut self, command: Command) -> &mut Self {
        self.commands.insert(command.name.clone(), command);
        self
    }

    /// Register an environment. A later registration with the same name wins.
    pub fn environment(&mut self, environment: Environment) -> &mut Self {
        self.environments.insert(environment.name.clone(), environment);
        self
    }

    /// Build the registry.
    pub fn build(self) -> Registry {
        Registry {
            commands: self.commands,
            environments: self.environments,
        }
    }
}
