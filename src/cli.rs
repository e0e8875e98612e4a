//! Command-line parsing and the process configuration it produces.
//!
//! `panex [-n names] <cmd>...` runs one PTY-backed process per command.
//! Names are optional, comma-separated, deduplicated with `-2`/`-3`…
//! suffixes, and may carry decorators: a trailing `!` keeps Esc/Shift-Tab
//! forwarded to the child in focus mode, a trailing `:w` starts the
//! process with line wrapping on. Decorators stack in any order and stay
//! part of the displayed name.

use std::path::PathBuf;

use clap::Parser;

/// Run multiple shell commands in PTYs behind a split-pane terminal UI.
#[derive(Debug, Parser)]
#[command(name = "panex", version, about)]
pub struct Args {
    /// Comma-separated display names for the commands, in order.
    /// Missing or empty names default to proc1, proc2, ...
    #[arg(short = 'n', long = "names", value_name = "NAMES")]
    pub names: Option<String>,

    /// Shell command lines, one per process.
    #[arg(value_name = "COMMAND", required = true, num_args = 1..)]
    pub commands: Vec<String>,
}

/// How one child process is launched.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Shell command line, run via the platform shell (`bash -c` / `sh -c`).
    pub command: String,
    /// Working directory; inherits the parent's when `None`.
    pub cwd: Option<PathBuf>,
    /// Environment entries merged over the inherited environment.
    pub env: Vec<(String, String)>,
    /// Restart automatically ~1s after a non-zero exit.
    pub auto_restart: bool,
}

impl CommandSpec {
    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
            env: Vec::new(),
            auto_restart: false,
        }
    }
}

/// One fleet entry: display name, parsed decorators, launch spec.
#[derive(Debug, Clone)]
pub struct ProcessEntry {
    /// Display name, decorators preserved (`fastfetch:w` and `fastfetch`
    /// remain distinct list entries).
    pub name: String,
    /// `!` decorator: forward Esc and Shift-Tab instead of leaving focus.
    pub passthrough: bool,
    /// `:w` decorator: start with line wrap enabled.
    pub wrap: bool,
    pub spec: CommandSpec,
}

/// The full launch configuration handed to the process manager.
#[derive(Debug, Clone)]
pub struct Config {
    pub entries: Vec<ProcessEntry>,
}

impl Config {
    pub fn from_args(args: &Args) -> Self {
        let names: Vec<String> = args
            .names
            .as_deref()
            .map(|list| list.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        let mut entries: Vec<ProcessEntry> = Vec::with_capacity(args.commands.len());
        for (i, command) in args.commands.iter().enumerate() {
            let raw = names
                .get(i)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map_or_else(|| format!("proc{}", i + 1), str::to_string);
            // Decorators are read off the raw name, so a dedup suffix on a
            // repeated `name!` does not strip its behavior.
            let (passthrough, wrap) = parse_decorators(&raw);
            let name = dedup_name(raw, &entries);
            entries.push(ProcessEntry {
                name,
                passthrough,
                wrap,
                spec: CommandSpec::shell(command.clone()),
            });
        }
        Self { entries }
    }
}

/// Strip decorators in any order and report which were present.
fn parse_decorators(name: &str) -> (bool, bool) {
    let mut rest = name;
    let mut passthrough = false;
    let mut wrap = false;
    loop {
        if let Some(stripped) = rest.strip_suffix('!') {
            passthrough = true;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_suffix(":w") {
            wrap = true;
            rest = stripped;
        } else {
            return (passthrough, wrap);
        }
    }
}

/// Keep display names unique by appending `-2`, `-3`, ... to repeats.
fn dedup_name(raw: String, existing: &[ProcessEntry]) -> String {
    if !existing.iter().any(|e| e.name == raw) {
        return raw;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{raw}-{n}");
        if !existing.iter().any(|e| e.name == candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(names: Option<&str>, commands: &[&str]) -> Config {
        let args = Args {
            names: names.map(str::to_string),
            commands: commands.iter().map(|c| (*c).to_string()).collect(),
        };
        Config::from_args(&args)
    }

    fn entry_names(config: &Config) -> Vec<&str> {
        config.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn defaults_when_no_names_given() {
        let c = config(None, &["echo a", "echo b"]);
        assert_eq!(entry_names(&c), vec!["proc1", "proc2"]);
    }

    #[test]
    fn missing_and_empty_names_fall_back_per_slot() {
        let c = config(Some("web,,"), &["a", "b", "c", "d"]);
        assert_eq!(entry_names(&c), vec!["web", "proc2", "proc3", "proc4"]);
    }

    #[test]
    fn duplicate_names_get_numeric_suffixes() {
        let c = config(Some("a,a,a"), &["1", "2", "3"]);
        assert_eq!(entry_names(&c), vec!["a", "a-2", "a-3"]);
    }

    #[test]
    fn dedup_skips_names_taken_explicitly() {
        let c = config(Some("a,a-2,a"), &["1", "2", "3"]);
        assert_eq!(entry_names(&c), vec!["a", "a-2", "a-3"]);
    }

    #[test]
    fn wrap_decorator_is_parsed_and_preserved() {
        let c = config(Some("build:w"), &["echo hi"]);
        let e = &c.entries[0];
        assert_eq!(e.name, "build:w");
        assert!(e.wrap);
        assert!(!e.passthrough);
    }

    #[test]
    fn passthrough_decorator_is_parsed_and_preserved() {
        let c = config(Some("helix!"), &["hx"]);
        let e = &c.entries[0];
        assert_eq!(e.name, "helix!");
        assert!(e.passthrough);
        assert!(!e.wrap);
    }

    #[test]
    fn decorators_stack_in_either_order() {
        let c = config(Some("a!:w,b:w!"), &["1", "2"]);
        assert!(c.entries[0].passthrough && c.entries[0].wrap);
        assert!(c.entries[1].passthrough && c.entries[1].wrap);
        assert_eq!(c.entries[0].name, "a!:w");
        assert_eq!(c.entries[1].name, "b:w!");
    }

    #[test]
    fn decorated_and_plain_names_stay_distinct() {
        let c = config(Some("fastfetch,fastfetch:w"), &["fastfetch", "fastfetch"]);
        assert_eq!(entry_names(&c), vec!["fastfetch", "fastfetch:w"]);
    }

    #[test]
    fn dedup_suffix_does_not_strip_decorators() {
        let c = config(Some("hx!,hx!"), &["hx", "hx"]);
        assert_eq!(entry_names(&c), vec!["hx!", "hx!-2"]);
        assert!(c.entries[1].passthrough);
    }

    #[test]
    fn no_two_entries_share_a_display_name() {
        let c = config(Some("x,x,x,x,x"), &["1", "2", "3", "4", "5"]);
        let mut names = entry_names(&c);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 5);
    }
}
