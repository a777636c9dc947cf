use std::io::BufRead;
use std::io::Write;

use calm_io::stdout;
use miette::IntoDiagnostic;

/// Ask a yes/no question on the terminal.
///
/// Empty input takes the default; otherwise any prefix of "yes" is a yes.
pub fn confirm(message: &str, default: bool) -> miette::Result<bool> {
    let suffix = if default { "Y/n" } else { "y/N" };
    let _ = stdout!("{message} [{suffix}] ");
    std::io::stdout().flush().into_diagnostic()?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .into_diagnostic()?;
    Ok(interpret(&answer, default))
}

fn interpret(answer: &str, default: bool) -> bool {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        default
    } else {
        "yes".starts_with(&answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_yes_prefixes() {
        for answer in ["y", "Y", "ye", "yes", "YES"] {
            assert!(interpret(answer, false), "{answer} should be a yes");
        }
    }

    #[test]
    fn test_interpret_no() {
        for answer in ["n", "no", "nope", "x", "yess"] {
            assert!(!interpret(answer, true), "{answer} should be a no");
        }
    }

    #[test]
    fn test_interpret_empty_takes_default() {
        assert!(interpret("", true));
        assert!(!interpret("", false));
        assert!(interpret("\n", true));
    }
}
