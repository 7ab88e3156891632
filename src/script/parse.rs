//! Script parsing and discovery
//!
//! The grammar is line oriented. A single pass walks the lines, tracking the
//! task that is currently open, and classifies each line with an ordered set
//! of matchers. Lines that match nothing are skipped, never rejected.

use crate::error::{ConfigError, ConfigResult};
use crate::script::types::{Command, Script, Task, Variable};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Script file names to search for, in priority order
pub const SCRIPT_FILE_NAMES: &[&str] = &["Taskrfile", "taskrfile", "Taskrfile.txt"];

static VAR_KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^var(\s|$)").unwrap());
static VAR_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^var\s+(\w+)\s*=\s*"([^"]*)""#).unwrap());
static TASK_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^task\s+(\w+)\s*:").unwrap());

static TWO_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s+(\w+)\s+"([^"]*)"\s+"([^"]*)"\s*$"#).unwrap());
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s+(\w+)\s+"([^"]*)"\s*$"#).unwrap());
static QUOTED_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s+(\w+)\s+"([^"]*)"\s*(.*)$"#).unwrap());
static UNQUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s+(\w+)\s+(.*)$").unwrap());

/// A command-line matcher returns the keyword and its arguments
type Matcher = fn(&str) -> Option<(String, Vec<String>)>;

/// Command shapes, most specific first. The first match wins.
const COMMAND_MATCHERS: &[Matcher] = &[
    match_two_quoted,
    match_quoted,
    match_quoted_tail,
    match_unquoted,
];

fn match_two_quoted(line: &str) -> Option<(String, Vec<String>)> {
    let caps = TWO_QUOTED.captures(line)?;
    Some((caps[1].to_string(), vec![caps[2].to_string(), caps[3].to_string()]))
}

fn match_quoted(line: &str) -> Option<(String, Vec<String>)> {
    let caps = QUOTED.captures(line)?;
    Some((caps[1].to_string(), vec![caps[2].to_string()]))
}

fn match_quoted_tail(line: &str) -> Option<(String, Vec<String>)> {
    let caps = QUOTED_TAIL.captures(line)?;
    let tail = caps[3].trim();
    if tail.is_empty() {
        return None;
    }
    Some((caps[1].to_string(), vec![format!("{} {}", &caps[2], tail)]))
}

fn match_unquoted(line: &str) -> Option<(String, Vec<String>)> {
    let caps = UNQUOTED.captures(line)?;
    Some((caps[1].to_string(), vec![caps[2].to_string()]))
}

/// A source line that the parser ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub text: String,
    pub reason: &'static str,
}

/// Parsed script plus the lines that were skipped on the way
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub script: Script,
    pub skipped: Vec<SkippedLine>,
}

/// How a single line is interpreted given the parser state
#[derive(Debug)]
enum Line {
    Ignored,
    GlobalVarDecl(Variable),
    TaskVarCommand(Command),
    TaskHeader(String),
    Command(Command),
    Skipped(&'static str),
}

/// Line-oriented script parser
#[derive(Debug, Default)]
pub struct Parser {
    report: ParseReport,
    /// Index of the open task in `report.script.tasks`
    current_task: Option<usize>,
}

impl Parser {
    /// Parse script text. Never fails; unrecognized lines are dropped.
    pub fn parse(content: &str) -> Script {
        Self::parse_with_report(content).script
    }

    /// Parse script text and keep a record of every skipped line
    pub fn parse_with_report(content: &str) -> ParseReport {
        let mut parser = Parser::default();
        for (index, raw) in content.lines().enumerate() {
            parser.feed(index + 1, raw);
        }
        parser.report
    }

    fn in_task(&self) -> bool {
        self.current_task.is_some()
    }

    fn feed(&mut self, line_no: usize, raw: &str) {
        match self.classify(raw) {
            Line::Ignored => {}
            Line::GlobalVarDecl(var) => self.report.script.variables.push(var),
            Line::TaskHeader(name) => {
                let mut task = Task::new(name);
                task.line = line_no;
                self.report.script.tasks.push(task);
                self.current_task = Some(self.report.script.tasks.len() - 1);
            }
            Line::TaskVarCommand(mut cmd) | Line::Command(mut cmd) => {
                cmd.line = line_no;
                if let Some(index) = self.current_task {
                    self.report.script.tasks[index].commands.push(cmd);
                }
            }
            Line::Skipped(reason) => self.report.skipped.push(SkippedLine {
                line: line_no,
                text: raw.to_string(),
                reason,
            }),
        }
    }

    fn classify(&self, raw: &str) -> Line {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Line::Ignored;
        }

        if VAR_KEYWORD.is_match(trimmed) {
            return match VAR_DECL.captures(trimmed) {
                Some(caps) if self.in_task() => Line::TaskVarCommand(Command::new(
                    "var",
                    [caps[1].to_string(), caps[2].to_string()],
                )),
                Some(caps) => Line::GlobalVarDecl(Variable::new(&caps[1], &caps[2])),
                None => Line::Skipped("malformed variable declaration"),
            };
        }

        if let Some(caps) = TASK_HEADER.captures(trimmed) {
            return Line::TaskHeader(caps[1].to_string());
        }

        if !self.in_task() {
            return Line::Skipped("outside of any task");
        }

        COMMAND_MATCHERS
            .iter()
            .find_map(|matcher| matcher(raw))
            .map(|(name, args)| Line::Command(Command::new(name, args)))
            .unwrap_or(Line::Skipped("unrecognized command line"))
    }
}

/// Find the script file by searching current and parent directories
pub fn find_script_file() -> ConfigResult<PathBuf> {
    find_script_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the script file starting from a specific directory
pub fn find_script_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in SCRIPT_FILE_NAMES {
            let script_path = current_dir.join(file_name);
            searched_paths.push(script_path.display().to_string());

            if script_path.is_file() {
                return Ok(script_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Read and parse a script file
pub fn parse_script_file(path: &Path) -> ConfigResult<ParseReport> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    Ok(Parser::parse_with_report(&contents))
}

/// Parse with automatic file discovery
pub fn parse_script_auto() -> ConfigResult<(ParseReport, PathBuf)> {
    let script_path = find_script_file()?;
    let report = parse_script_file(&script_path)?;
    Ok((report, script_path))
}
