use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use devdeck_application::ProjectCoordinator;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use super::{ProjectCommand, projects};

const VERBS: &[&str] = &[
    "list",
    "add-local",
    "add-remote",
    "remove-remote",
    "remove-local",
    "open",
    "active",
    "help",
    "quit",
];

/// One line typed into the shell.
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "devdeck", no_binary_name = true, disable_version_flag = true)]
enum ShellLine {
    #[command(flatten)]
    Project(ProjectCommand),
    /// Show the backend's active session
    Active,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Completes and hints verbs at the start of the line.
struct ShellHelper;

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = VERBS
            .iter()
            .filter(|verb| verb.starts_with(line))
            .map(|verb| Pair {
                display: verb.to_string(),
                replacement: verb.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let verb = line.split_whitespace().next().unwrap_or_default();
        if VERBS.contains(&verb) {
            Owned(line.replacen(verb, &verb.bright_cyan().to_string(), 1))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }

        VERBS
            .iter()
            .find(|verb| verb.starts_with(line) && verb.len() > line.len())
            .map(|verb| verb[line.len()..].to_string())
    }
}

impl Validator for ShellHelper {}

fn parse_line(line: &str) -> Result<ShellLine, clap::Error> {
    ShellLine::try_parse_from(line.split_whitespace())
}

/// Interactive loop over one coordinator, so the session outlives each
/// command.
pub async fn run(coordinator: &ProjectCoordinator) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(ShellHelper));

    println!("{}", "=== devdeck shell ===".bright_magenta().bold());
    println!(
        "{}",
        "Type 'help' for commands, 'quit' to exit.".bright_black()
    );

    loop {
        match rl.readline("devdeck> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let parsed = match parse_line(trimmed) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        // Help and usage errors both render through clap.
                        println!("{}", e.render());
                        continue;
                    }
                };

                let result = match parsed {
                    ShellLine::Quit => break,
                    ShellLine::Active => projects::active(coordinator).await,
                    ShellLine::Project(command) => projects::run(coordinator, command).await,
                };
                if let Err(e) = result {
                    eprintln!("{}", e.to_string().red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
