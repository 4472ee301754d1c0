//! Interactive post-action pause.
//!
//! Blocks the executioner after each successful action until the operator
//! presses Enter. Any text typed before Enter is handed to the question
//! handler, which is where an advisor would answer it.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::executor::PostActionHook;

const BANNER: &str = "===================================================";

/// Read questions from `input` until an empty line (or EOF), passing each to
/// `on_question`. Returns the number of questions asked.
pub fn pause_for_questions<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    on_question: &mut dyn FnMut(&str),
) -> std::io::Result<usize> {
    let mut asked = 0;
    loop {
        writeln!(output, "{BANNER}")?;
        writeln!(output, " ## Enter a question or leave empty to continue ## ")?;
        write!(output, " > Question: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(asked);
        }
        let question = line.trim();
        if question.is_empty() {
            return Ok(asked);
        }
        debug!(question, "operator question");
        on_question(question);
        asked += 1;
    }
}

/// Post-action hook that pauses on stdin.
///
/// Without an advisor attached, questions are acknowledged on stdout.
pub fn stdin_pause() -> PostActionHook {
    Box::new(|| {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        let mut acknowledge = |question: &str| {
            println!("(no advisor attached; question not answered: {question})");
        };
        if let Err(err) = pause_for_questions(&mut input, &mut output, &mut acknowledge) {
            warn!(error = %err, "interactive pause failed; continuing");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn empty_line_resumes_immediately() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        let mut seen = Vec::new();
        let asked =
            pause_for_questions(&mut input, &mut output, &mut |q: &str| seen.push(q.to_string()))
                .expect("pause");
        assert_eq!(asked, 0);
        assert!(seen.is_empty());
        assert!(String::from_utf8_lossy(&output).contains("> Question:"));
    }

    #[test]
    fn questions_are_forwarded_until_blank() {
        let mut input = Cursor::new("what is the goal?\nwhy did it fail?\n\nignored\n");
        let mut output = Vec::new();
        let mut seen = Vec::new();
        let asked =
            pause_for_questions(&mut input, &mut output, &mut |q: &str| seen.push(q.to_string()))
                .expect("pause");
        assert_eq!(asked, 2);
        assert_eq!(seen, vec!["what is the goal?", "why did it fail?"]);
    }

    #[test]
    fn eof_resumes() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let asked = pause_for_questions(&mut input, &mut output, &mut |_: &str| {}).expect("pause");
        assert_eq!(asked, 0);
    }
}
