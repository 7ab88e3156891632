//! Main CLI application
//!
//! A thin front-end over the executor: it locates and parses the script,
//! builds a context from the flags, then runs the requested tasks in order,
//! stopping at the first failure.

use crate::runner::{Context, Executor, Verbosity};
use crate::script::{parse_script_auto, parse_script_file, validate_script, Script};
use anyhow::Context as _;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One task to run, with its positional arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCall {
    pub name: String,
    pub args: Vec<String>,
}

impl TaskCall {
    /// Parse `name` or `name:arg1,arg2`
    pub fn parse(token: &str) -> Self {
        match token.split_once(':') {
            Some((name, rest)) if !rest.is_empty() => TaskCall {
                name: name.to_string(),
                args: rest.split(',').map(str::to_string).collect(),
            },
            Some((name, _)) => TaskCall {
                name: name.to_string(),
                args: Vec::new(),
            },
            None => TaskCall {
                name: token.to_string(),
                args: Vec::new(),
            },
        }
    }
}

/// Tasks and named arguments collected from the trailing command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub tasks: Vec<TaskCall>,
    pub named: HashMap<String, String>,
}

/// Split trailing tokens into task calls and `--key value` pairs
pub fn parse_invocation<'a, I>(tokens: I) -> Invocation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut invocation = Invocation::default();
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        let Some(key) = token.strip_prefix("--") else {
            invocation.tasks.push(TaskCall::parse(token));
            continue;
        };

        let (key, value) = match key.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => {
                let value = iter
                    .next_if(|next| !next.starts_with("--"))
                    .unwrap_or("true");
                (key.to_string(), value.to_string())
            }
        };
        invocation.named.insert(key, value);
    }

    invocation
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("taskr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run tasks from a Taskrfile")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to the Taskrfile"),
        )
        .arg(
            Arg::new("dir")
                .short('C')
                .long("dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Working directory for commands (default: current directory)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no diagnostics")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail `run` commands that exit with a non-zero status")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("env-file")
                .long("env-file")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Load environment variables from this file"),
        )
        .arg(
            Arg::new("no-dotenv")
                .long("no-dotenv")
                .help("Do not load .env next to the Taskrfile")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List tasks and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Validate the Taskrfile and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dump")
                .long("dump")
                .help("Print the parsed Taskrfile as YAML and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("invocation")
                .value_name("TASK[:ARGS]|--KEY VALUE")
                .help("Tasks to run, e.g. `build:debug,x86 deploy --env prod`")
                .num_args(1..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Render a parsed script as YAML
pub fn dump_script(script: &Script) -> crate::Result<String> {
    Ok(serde_yaml::to_string(script)?)
}

/// Load `--env-file`, or `.env` beside the script unless disabled
fn load_dotenv(matches: &ArgMatches, script_path: &Path) -> anyhow::Result<()> {
    if let Some(path) = matches.get_one::<PathBuf>("env-file") {
        dotenvy::from_path(path)
            .with_context(|| format!("Failed to load env file '{}'", path.display()))?;
        return Ok(());
    }

    if matches.get_flag("no-dotenv") {
        return Ok(());
    }

    let candidate = script_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(".env");
    if candidate.is_file() {
        dotenvy::from_path(&candidate)
            .with_context(|| format!("Failed to load env file '{}'", candidate.display()))?;
    }
    Ok(())
}

fn print_task_list(script: &Script) {
    if script.tasks.is_empty() {
        println!("No tasks defined");
        return;
    }
    println!("Available tasks:");
    for task in &script.tasks {
        println!("  {} ({} command(s))", task.name, task.commands.len());
    }
}

/// Run the CLI with the process arguments. Returns whether every task
/// succeeded.
pub fn run() -> anyhow::Result<bool> {
    let matches = build_command().get_matches();
    execute(&matches)
}

fn execute(matches: &ArgMatches) -> anyhow::Result<bool> {
    let verbosity = get_verbosity(matches);

    let (report, script_path) = match matches.get_one::<PathBuf>("file") {
        Some(path) => (parse_script_file(path)?, path.clone()),
        None => parse_script_auto()?,
    };

    load_dotenv(matches, &script_path)?;

    let mut ctx = Context::new()
        .with_verbosity(verbosity)
        .with_fail_on_exit_code(matches.get_flag("strict"));
    if let Some(dir) = matches.get_one::<PathBuf>("dir") {
        ctx = ctx.with_working_dir(dir.clone());
    }

    for skipped in &report.skipped {
        ctx.print_debug(&format!(
            "{}:{}: skipped ({}): {}",
            script_path.display(),
            skipped.line,
            skipped.reason,
            skipped.text.trim()
        ));
    }

    if matches.get_flag("dump") {
        print!("{}", dump_script(&report.script)?);
        return Ok(true);
    }

    if matches.get_flag("check") {
        return Ok(match validate_script(&report.script) {
            Ok(()) => {
                ctx.print_info(&format!("{} is valid", script_path.display()));
                true
            }
            Err(e) => {
                ctx.print_error(&e.to_string());
                false
            }
        });
    }

    let tokens: Vec<String> = matches
        .get_many::<String>("invocation")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let invocation = parse_invocation(tokens.iter().map(String::as_str));

    if matches.get_flag("list") || invocation.tasks.is_empty() {
        print_task_list(&report.script);
        return Ok(true);
    }

    let mut executor = Executor::with_context(report.script, ctx);
    for call in invocation.tasks {
        executor.set_task_args(call.name.clone(), call.args);
        executor.set_named_args(invocation.named.clone());

        let result = executor.execute_task(&call.name);
        if !result.success {
            executor.context_mut().print_error(result.message());
            return Ok(false);
        }
        executor.context_mut().print_info(result.message());
    }

    Ok(true)
}
