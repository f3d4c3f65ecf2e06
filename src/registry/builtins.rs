//! The builtin command and environment set.
//!
//! These are plain data as far as the translator is concerned; nothing here
//! touches the parsing algorithm. The set covers document setup
//! (`docclass`), inline conveniences (`tbf`, `colon`, `verb`), the labelled
//! equation environment (`eq`), and the two raw environments (`verbatim`,
//! `exec`).

use std::sync::Arc;

use super::types::{Command, Environment};
use super::RegistryBuilder;
use crate::runner::CodeRunner;

/// Install every builtin that needs no collaborator.
pub(super) fn install(builder: &mut RegistryBuilder) {
    builder.command(Command::new("docclass", "?!", |args| {
        let mut out = String::from("\\documentclass");
        if let Some(options) = &args[0] {
            out.push_str(&format!("[{options}]"));
        }
        out.push_str(&format!("{{{}}}", args[1].as_deref().unwrap_or("")));
        out
    }));

    builder.command(Command::new("tbf", "!", |args| {
        format!("\\textbf{{{}}}", args[0].as_deref().unwrap_or(""))
    }));

    // An escape hatch for a literal `:` where a trailing colon would
    // otherwise open an environment.
    builder.command(Command::new("colon", "", |_| ":".to_string()));

    builder.command(Command::raw("verb", |args| {
        format!("\\verb{{{}}}", args[0].as_deref().unwrap_or(""))
    }));

    builder.environment(Environment::new("eq", "?", |_hooks, body, args| {
        let label = match &args[0] {
            Some(label) => format!("\\label{{eq:{label}}}"),
            None => String::new(),
        };
        Ok(format!("\\begin{{equation}}{label}{body}\\end{{equation}}"))
    }));

    builder.environment(Environment::raw("verbatim", "", |_hooks, body, _args| {
        Ok(format!("\\begin{{verbatim}}{body}\\end{{verbatim}}"))
    }));
}

/// The `\exec` environment: hands its body to `runner` and splices captured
/// stdout. Files the run produced are registered as session artifacts; a
/// failed run aborts the translation.
pub(super) fn exec_environment(runner: Arc<dyn CodeRunner>) -> Environment {
    Environment::raw("exec", "", move |hooks, body, _args| {
        let output = runner.run(&dedent(body))?;
        for artifact in output.artifacts {
            hooks.register_artifact(artifact);
        }
        Ok(output.stdout)
    })
}

/// Strip the longest common leading whitespace of the non-blank lines, so an
/// indented environment body becomes a runnable top-level program.
fn dedent(body: &str) -> String {
    let prefix_len = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    body.lines()
        .map(|line| {
            if line.len() >= prefix_len {
                &line[prefix_len..]
            } else {
                line.trim_start()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
