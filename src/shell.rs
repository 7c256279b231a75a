//! Line commands for the interactive session
//!
//! Plain lines are commands for the orchestrator. Lines starting with `/`
//! operate on the session registry directly.

use std::fmt::Write as _;

use crate::orchestrator::Session;
use crate::plugins::{Plugin, PluginPatch};
use crate::{Error, Result};

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Free-text command for the orchestrator
    Prompt(String),
    /// List every plugin in the session
    Plugins,
    /// List active plugins
    Active,
    /// Flip a plugin's activation
    Toggle(String),
    /// Remove a plugin
    Remove(String),
    /// Rename a plugin
    Rename { id: String, name: String },
    /// Print a plugin's source
    Code(String),
    /// Print the last reply
    Reply,
    Help,
    Quit,
}

/// Help text for the slash commands
pub const HELP: &str = "\
commands:
  <text>               send a command
  /plugins             list plugins in this session
  /active              list active plugins
  /toggle <id>         activate or deactivate a plugin
  /remove <id>         remove a plugin
  /rename <id> <name>  rename a plugin
  /code <id>           show a plugin's source
  /reply               show the last reply
  /help                show this help
  /quit                leave the session";

/// Parse one input line
///
/// # Errors
///
/// Returns `Validation` for an unknown slash command or missing argument
pub fn parse(line: &str) -> Result<ShellCommand> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(ShellCommand::Prompt(line.to_string()));
    };

    let (name, args) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(n, a)| (n, a.trim()));

    let required = |what: &str| -> Result<String> {
        if args.is_empty() {
            Err(Error::Validation(format!("/{name} needs {what}")))
        } else {
            Ok(args.to_string())
        }
    };

    match name {
        "plugins" | "list" => Ok(ShellCommand::Plugins),
        "active" => Ok(ShellCommand::Active),
        "toggle" => required("a plugin id").map(ShellCommand::Toggle),
        "remove" | "rm" => required("a plugin id").map(ShellCommand::Remove),
        "code" => required("a plugin id").map(ShellCommand::Code),
        "rename" => {
            let args = required("a plugin id and a name")?;
            match args.split_once(char::is_whitespace) {
                Some((id, name)) if !name.trim().is_empty() => Ok(ShellCommand::Rename {
                    id: id.to_string(),
                    name: name.trim().to_string(),
                }),
                _ => Err(Error::Validation("/rename needs a plugin id and a name".to_string())),
            }
        }
        "reply" => Ok(ShellCommand::Reply),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(Error::Validation(format!("unknown command /{other}"))),
    }
}

/// Apply a registry command to the session and describe the result
///
/// Returns `None` for commands that are not registry operations.
pub fn apply(session: &mut Session, command: &ShellCommand) -> Option<String> {
    let message = match command {
        ShellCommand::Plugins => render_plugins(session.registry().plugins().iter()),
        ShellCommand::Active => render_plugins(session.active_plugins()),
        ShellCommand::Toggle(id) => {
            session.toggle_active(id);
            match session.registry().get(id) {
                Some(p) if p.is_active => format!("{id} activated"),
                Some(_) => format!("{id} deactivated"),
                None => format!("no plugin {id}"),
            }
        }
        ShellCommand::Remove(id) => {
            let existed = session.registry().get(id).is_some();
            session.remove(id);
            if existed {
                format!("{id} removed")
            } else {
                format!("no plugin {id}")
            }
        }
        ShellCommand::Rename { id, name } => {
            let Some(mut metadata) = session.registry().get(id).map(|p| p.metadata.clone())
            else {
                return Some(format!("no plugin {id}"));
            };
            metadata.name.clone_from(name);
            session.partial_update(id, PluginPatch::metadata(metadata));
            format!("{id} renamed to {name}")
        }
        ShellCommand::Code(id) => session
            .registry()
            .get(id)
            .map_or_else(|| format!("no plugin {id}"), |p| p.code.clone()),
        ShellCommand::Reply => session
            .last_reply()
            .map_or_else(|| "no reply yet".to_string(), ToString::to_string),
        ShellCommand::Help => HELP.to_string(),
        ShellCommand::Prompt(_) | ShellCommand::Quit => return None,
    };
    Some(message)
}

/// One line per plugin: marker, id, name, type and version
pub fn render_plugins<'a>(plugins: impl Iterator<Item = &'a Plugin>) -> String {
    let mut out = String::new();
    for plugin in plugins {
        let marker = if plugin.is_active { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {} - {} ({}, v{})",
            plugin.id, plugin.metadata.name, plugin.metadata.kind, plugin.metadata.version
        );
    }
    if out.is_empty() {
        "no plugins".to_string()
    } else {
        out.trim_end().to_string()
    }
}
