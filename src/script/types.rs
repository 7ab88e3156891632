//! Script model
//!
//! Plain data produced by the parser and consumed by the executor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A parsed script: global variable declarations plus tasks, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Script {
    /// Variables declared outside of any task
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,

    /// Tasks in declaration order
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Script {
    /// Look up a task by name. Duplicate names resolve to the first declaration.
    pub fn find_task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Names of all tasks in declaration order
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    /// Declared variables as a map. A later declaration of the same name
    /// replaces an earlier one.
    pub fn declared_vars(&self) -> HashMap<String, String> {
        self.variables
            .iter()
            .map(|v| (v.name.clone(), v.value.clone()))
            .collect()
    }
}

/// A `name = value` pair
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Variable {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A named, ordered list of commands
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Task {
    pub name: String,

    #[serde(default)]
    pub commands: Vec<Command>,

    /// 1-based line of the `task` header (0 when built in code)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub line: usize,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Task {
            name: name.into(),
            commands: Vec::new(),
            line: 0,
        }
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }
}

/// One command inside a task
///
/// `name` keeps the raw keyword so that unknown keywords survive parsing and
/// are reported when the command is executed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub name: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub line: usize,
}

impl Command {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Command {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
            line: 0,
        }
    }

    /// Recognized kind of this command, if any
    pub fn kind(&self) -> Option<CommandKind> {
        self.name.parse().ok()
    }
}

/// Recognized command keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Run a shell command
    Run,
    /// Delete a file
    Del,
    /// Print a message
    Ech,
    /// Invoke another task
    Tsk,
    /// Assign a runtime variable
    Var,
}

impl CommandKind {
    /// Number of arguments the command consumes
    pub fn arity(self) -> usize {
        match self {
            CommandKind::Var => 2,
            _ => 1,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            CommandKind::Run => "run",
            CommandKind::Del => "del",
            CommandKind::Ech => "ech",
            CommandKind::Tsk => "tsk",
            CommandKind::Var => "var",
        }
    }
}

impl FromStr for CommandKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(CommandKind::Run),
            "del" => Ok(CommandKind::Del),
            "ech" => Ok(CommandKind::Ech),
            "tsk" => Ok(CommandKind::Tsk),
            "var" => Ok(CommandKind::Var),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_task_returns_first_match() {
        let script = Script {
            variables: vec![],
            tasks: vec![
                Task::new("build").with_command(Command::new("ech", ["first"])),
                Task::new("build").with_command(Command::new("ech", ["second"])),
            ],
        };

        let task = script.find_task("build").unwrap();
        assert_eq!(task.commands[0].args, vec!["first"]);
        assert!(script.find_task("missing").is_none());
    }

    #[test]
    fn test_declared_vars_last_declaration_wins() {
        let script = Script {
            variables: vec![Variable::new("A", "1"), Variable::new("A", "2")],
            tasks: vec![],
        };

        assert_eq!(script.declared_vars().get("A"), Some(&"2".to_string()));
    }

    #[test]
    fn test_command_kind() {
        assert_eq!(Command::new("run", ["ls"]).kind(), Some(CommandKind::Run));
        assert_eq!(Command::new("zap", ["x"]).kind(), None);
        assert_eq!(CommandKind::Var.arity(), 2);
        assert_eq!(CommandKind::Tsk.arity(), 1);
    }

    #[test]
    fn test_serialize_uses_type_key() {
        let script = Script {
            variables: vec![],
            tasks: vec![Task::new("t").with_command(Command::new("ech", ["hi"]))],
        };
        let yaml = serde_yaml::to_string(&script).unwrap();
        assert!(yaml.contains("type: ech"));
        assert!(!yaml.contains("line:"));
    }
}
