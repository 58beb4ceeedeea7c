//! REPL command handling
//!
//! Commands start with ':' and act on the session instead of being
//! evaluated.

use super::session::ReplSession;

/// Command result
#[derive(Debug)]
pub enum CommandResult {
    /// Exit the REPL
    Exit,
    /// Continue to next input
    Continue,
    /// Print a message, then continue
    Output(String),
}

/// Command handler for the REPL
pub struct CommandHandler<'a> {
    session: &'a mut ReplSession,
}

impl<'a> CommandHandler<'a> {
    /// Create a new command handler
    pub fn new(session: &'a mut ReplSession) -> Self {
        Self { session }
    }

    /// Handle a command line (leading ':' included)
    pub fn handle(&mut self, line: &str) -> CommandResult {
        let cmd = line.trim_start_matches(':').trim();
        let mut parts = cmd.split_whitespace();

        match parts.next().unwrap_or("") {
            "quit" | "q" => CommandResult::Exit,
            "help" | "h" => CommandResult::Output(help_text()),
            "clear" | "c" => {
                self.session.reset();
                CommandResult::Output("Session cleared".to_string())
            }
            "vars" | "v" => {
                let bindings = self.session.bindings();
                if bindings.is_empty() {
                    CommandResult::Output("(no bindings)".to_string())
                } else {
                    let rows: Vec<String> = bindings
                        .iter()
                        .map(|b| format!("{} = {} ({})", b.name, b.value, b.ty))
                        .collect();
                    CommandResult::Output(rows.join("\n"))
                }
            }
            "type" | "t" => match parts.next() {
                Some(name) => match self.session.bindings().iter().find(|b| b.name == name) {
                    Some(binding) => {
                        CommandResult::Output(format!("{}: {}", binding.name, binding.ty))
                    }
                    None => CommandResult::Output(format!("Unknown binding: {}", name)),
                },
                None => CommandResult::Output("Usage: :type <name>".to_string()),
            },
            "imports" | "i" => CommandResult::Output(self.session.imports().join("\n")),
            "" => CommandResult::Continue,
            other => CommandResult::Output(format!("Unknown command: :{}", other)),
        }
    }
}

fn help_text() -> String {
    [
        "Available commands:",
        "  :quit, :q       - Exit the REPL",
        "  :help, :h       - Show this help",
        "  :clear, :c      - Discard all session state",
        "  :vars, :v       - Show declared bindings",
        "  :type, :t <n>   - Show the type of a binding",
        "  :imports, :i    - Show imported namespaces",
        "",
        "Use Tab for member completion, and up-arrow for history",
    ]
    .join("\n")
}
