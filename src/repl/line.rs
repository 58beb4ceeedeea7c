//! Line-based REPL shell with rustyline
//!
//! I/O glue only: line editing, history, Tab completion display, colored
//! output, and multi-line accumulation. All language behavior lives in the
//! session.

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, EditMode, Editor, Helper};

use super::commands::{CommandHandler, CommandResult};
use super::outcome::ExecutionStatus;
use super::session::ReplSession;
use crate::{NAME, VERSION};

/// Line REPL configuration
#[derive(Debug, Clone)]
pub struct LineReplConfig {
    /// Prompt to display
    pub prompt: String,
    /// Prompt while accumulating a multi-line submission
    pub continuation_prompt: String,
    /// Enable VI edit mode
    pub vi_mode: bool,
    /// History file path
    pub history_file: Option<PathBuf>,
}

impl Default for LineReplConfig {
    fn default() -> Self {
        Self {
            prompt: ">> ".into(),
            continuation_prompt: ".. ".into(),
            vi_mode: false,
            history_file: None,
        }
    }
}

/// rustyline helper that surfaces session-backed member completion
struct ReplHelper {
    session: Rc<RefCell<ReplSession>>,
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let result = self.session.borrow().complete(line, pos);
        if result.is_empty() {
            return Ok((pos, Vec::new()));
        }

        // Every candidate shares one replacement: the insertion suffix,
        // spliced in at the cursor. The display lines list the members.
        let candidates = if result.lines.is_empty() {
            vec![Pair {
                display: result.insertion_suffix.clone(),
                replacement: result.insertion_suffix.clone(),
            }]
        } else {
            result
                .lines
                .iter()
                .map(|display| Pair {
                    display: display.clone(),
                    replacement: result.insertion_suffix.clone(),
                })
                .collect()
        };
        Ok((pos, candidates))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Highlighter for ReplHelper {}
impl Validator for ReplHelper {}
impl Helper for ReplHelper {}

/// Interactive line REPL
pub struct LineRepl {
    config: LineReplConfig,
    editor: Editor<ReplHelper, FileHistory>,
    session: Rc<RefCell<ReplSession>>,
}

impl LineRepl {
    /// Create a REPL with default configuration
    pub fn new() -> io::Result<Self> {
        Self::with_config(LineReplConfig::default())
    }

    /// Create a REPL with custom configuration
    pub fn with_config(config: LineReplConfig) -> io::Result<Self> {
        let rl_config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(if config.vi_mode {
                EditMode::Vi
            } else {
                EditMode::Emacs
            })
            .build();

        let mut editor: Editor<ReplHelper, FileHistory> = Editor::with_config(rl_config)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        let session = Rc::new(RefCell::new(ReplSession::new()));
        editor.set_helper(Some(ReplHelper {
            session: Rc::clone(&session),
        }));

        if let Some(ref history_file) = config.history_file {
            if history_file.exists() {
                let _ = editor.load_history(history_file);
            }
        }

        Ok(Self {
            config,
            editor,
            session,
        })
    }

    /// Run the read-eval-print loop until EOF or `:quit`
    pub fn run(&mut self) -> io::Result<()> {
        println!("{} {}", NAME.bold(), VERSION);
        println!("{}", "Type :help for commands, Tab for completion".dimmed());
        println!();

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                &self.config.prompt
            } else {
                &self.config.continuation_prompt
            };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    if buffer.is_empty() && line.starts_with(':') {
                        let _ = self.editor.add_history_entry(&line);
                        let mut session = self.session.borrow_mut();
                        match CommandHandler::new(&mut session).handle(&line) {
                            CommandResult::Exit => break,
                            CommandResult::Continue => continue,
                            CommandResult::Output(msg) => {
                                drop(session);
                                println!("{}", msg);
                                continue;
                            }
                        }
                    }

                    if !buffer.is_empty() {
                        buffer.push('\n');
                    }
                    buffer.push_str(&line);

                    if !is_complete(&buffer) {
                        continue;
                    }

                    let code = std::mem::take(&mut buffer);
                    if code.trim().is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(code.replace('\n', " "));

                    let outcome = self.session.borrow_mut().submit(&code);
                    if let Some(ref result) = outcome.result {
                        println!();
                        match outcome.status {
                            ExecutionStatus::Error => println!("{}", result.red()),
                            ExecutionStatus::Ok => println!("{}", result.green()),
                        }
                        println!();
                    }
                }
                Err(ReadlineError::Eof) => break,
                Err(ReadlineError::Interrupted) => {
                    buffer.clear();
                    println!("(interrupted)");
                    continue;
                }
                Err(e) => {
                    return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
                }
            }
        }

        if let Some(ref history_file) = self.config.history_file {
            let _ = self.editor.save_history(history_file);
        }

        Ok(())
    }
}

/// Whether the buffered input is closed enough to submit: all brackets
/// balanced and no string literal left open. Surplus closers submit too,
/// so the parser gets to report them.
fn is_complete(code: &str) -> bool {
    let mut braces = 0usize;
    let mut brackets = 0usize;
    let mut parens = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in code.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => braces += 1,
            '}' if !in_string => {
                if braces == 0 {
                    return true;
                }
                braces -= 1;
            }
            '[' if !in_string => brackets += 1,
            ']' if !in_string => {
                if brackets == 0 {
                    return true;
                }
                brackets -= 1;
            }
            '(' if !in_string => parens += 1,
            ')' if !in_string => {
                if parens == 0 {
                    return true;
                }
                parens -= 1;
            }
            _ => {}
        }
    }

    braces == 0 && brackets == 0 && parens == 0 && !in_string
}

#[cfg(test)]
mod tests {
    use super::is_complete;

    #[test]
    fn balanced_input_is_complete() {
        assert!(is_complete("x = 1"));
        assert!(is_complete("xs = [1, 2, 3]"));
        assert!(is_complete("fn f(a) { return a }"));
    }

    #[test]
    fn open_brackets_continue() {
        assert!(!is_complete("fn f(a) {"));
        assert!(!is_complete("xs = [1, 2,"));
        assert!(!is_complete("f(1,"));
    }

    #[test]
    fn open_string_continues() {
        assert!(!is_complete("s = \"abc"));
        assert!(is_complete("s = \"abc\""));
    }

    #[test]
    fn brackets_inside_strings_are_ignored() {
        assert!(is_complete("s = \"{[(\""));
    }

    #[test]
    fn surplus_closer_submits_for_diagnosis() {
        assert!(is_complete("}"));
    }
}
