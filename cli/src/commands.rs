//! Line commands read from stdin.
//!
//! Indices are 1-based, matching the numbers printed next to each input.

use anyhow::{Context, Result, anyhow, bail};
use simmatrix_session::PointerEvent;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Append an empty input.
    Add,

    /// Replace input `index` (0-based) with `text`.
    Set { index: usize, text: String },

    /// Remove input `index` (0-based).
    Delete(usize),

    /// Simulated pointer movement over the matrix.
    Pointer(PointerEvent),

    /// Print the current view.
    Show,

    /// Print the command summary.
    Help,

    /// Leave the program.
    Quit,
}

pub const HELP: &str = "\
commands:
  add                    append an empty input
  set <n> <text>         replace input n
  del <n>                remove input n
  hover col <n>          pointer on column header n
  hover row <n>          pointer on row header n
  hover cell <r> <c>     pointer on cell (r, c)
  hover corner           pointer on the corner header
  leave                  pointer leaves the matrix
  show                   print inputs, embeddings and matrix
  help                   this text
  quit                   exit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line, ""),
    };

    let command = match word {
        "add" => Command::Add,
        "set" => {
            let (index, text) = match rest.split_once(char::is_whitespace) {
                Some((index, text)) => (index, text.to_string()),
                None => (rest, String::new()),
            };
            Command::Set {
                index: position(index)?,
                text,
            }
        }
        "del" | "delete" => Command::Delete(position(rest)?),
        "hover" => Command::Pointer(hover(rest)?),
        "leave" => Command::Pointer(PointerEvent::LeaveMatrix),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command `{other}` (try `help`)"),
    };

    Ok(Some(command))
}

fn hover(args: &str) -> Result<PointerEvent> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let event = match parts.as_slice() {
        ["corner"] => PointerEvent::EnterCorner,
        ["col", n] => PointerEvent::EnterColumnHeader(position(n)?),
        ["row", n] => PointerEvent::EnterRowHeader(position(n)?),
        ["cell", r, c] => PointerEvent::EnterCell {
            row: position(r)?,
            col: position(c)?,
        },
        _ => bail!("usage: hover corner | col <n> | row <n> | cell <r> <c>"),
    };
    Ok(event)
}

/// Convert a 1-based position argument to a 0-based index.
fn position(arg: &str) -> Result<usize> {
    let n: usize = arg
        .trim()
        .parse()
        .with_context(|| format!("expected a position, got `{arg}`"))?;
    n.checked_sub(1)
        .ok_or_else(|| anyhow!("positions start at 1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_edits() {
        assert_eq!(parse("add").unwrap(), Some(Command::Add));
        assert_eq!(
            parse("set 2 The fast orange fox").unwrap(),
            Some(Command::Set {
                index: 1,
                text: "The fast orange fox".to_string()
            })
        );
        assert_eq!(
            parse("set 1").unwrap(),
            Some(Command::Set {
                index: 0,
                text: String::new()
            })
        );
        assert_eq!(parse("del 3").unwrap(), Some(Command::Delete(2)));
    }

    #[test]
    fn test_parse_pointer() {
        assert_eq!(
            parse("hover cell 2 3").unwrap(),
            Some(Command::Pointer(PointerEvent::EnterCell { row: 1, col: 2 }))
        );
        assert_eq!(
            parse("hover col 1").unwrap(),
            Some(Command::Pointer(PointerEvent::EnterColumnHeader(0)))
        );
        assert_eq!(
            parse("hover corner").unwrap(),
            Some(Command::Pointer(PointerEvent::EnterCorner))
        );
        assert_eq!(
            parse("leave").unwrap(),
            Some(Command::Pointer(PointerEvent::LeaveMatrix))
        );
    }

    #[test]
    fn test_parse_blank_and_errors() {
        assert_eq!(parse("   ").unwrap(), None);
        assert!(parse("del 0").is_err());
        assert!(parse("del x").is_err());
        assert!(parse("hover diagonal").is_err());
        assert!(parse("frobnicate").is_err());
    }
}
