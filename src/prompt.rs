//! Interactive yes/no confirmation.
use std::io::{BufRead, Write};

/// Asks the operator a yes/no question. The default answer is no.
#[cfg_attr(test, mockall::automock)]
pub trait Prompt: Send + Sync {
    /// Return `true` only for an explicit yes.
    fn confirm(&self, question: &str) -> bool;
}

/// Prompt reading answers from standard input.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        ask(question, &mut std::io::stdin().lock(), &mut std::io::stdout())
    }
}

/// Write `question` to `output` and read one answer line from `input`.
///
/// Empty input, EOF and read errors all count as no.
pub fn ask(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    if write!(output, "{question} [y/N] ").is_err() || output.flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_yes(&answer),
    }
}

/// Whether `answer` is an affirmative reply (`y` or `yes`, any case).
#[must_use]
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
