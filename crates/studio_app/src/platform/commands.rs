//! Line-oriented editor commands.

use std::path::PathBuf;

use studio_core::{Direction, Msg, Placement};

pub const HELP: &str = "\
commands:
  show                                 print the story
  lock <page> <block>                  toggle a block lock
  lock-page <page>                     toggle a page lock
  edit <page> <block> <text...>        replace a text block with everything after
                                       the space following <block>, spaces kept
                                       (\\n for a line break)
  up|down <page> <block>               move a block one step
  drop <page> <src> before|after <tgt> move a block next to another
  save                                 save edits
  regen <page> [instruction...]        rewrite the unlocked text of a page
  apply                                save and re-render all pages
  reload                               fetch the story again
  export <dir>                         write the story and page texts
  reset                                drop the current job
  help                                 this text
  quit                                 leave";

/// What a line of input asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Msg(Msg),
    Show,
    Export(PathBuf),
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }
    let (verb, rest) = next_word(line);
    let input = match verb {
        "show" => Input::Show,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        "save" => Input::Msg(Msg::SaveRequested),
        "apply" => Input::Msg(Msg::ApplyRequested),
        "reload" => Input::Msg(Msg::ReloadStoryRequested),
        "reset" => Input::Msg(Msg::ResetRequested),
        "lock" => {
            let (page, rest) = page_arg(rest)?;
            let (block_id, _) = word_arg(rest, "block")?;
            Input::Msg(Msg::ToggleLock {
                page,
                block_id: block_id.to_string(),
            })
        }
        "lock-page" => {
            let (page, _) = page_arg(rest)?;
            Input::Msg(Msg::TogglePageLock { page })
        }
        "edit" => {
            let (page, rest) = page_arg(rest)?;
            let (block_id, text) = block_and_text(rest)?;
            Input::Msg(Msg::EditText {
                page,
                block_id: block_id.to_string(),
                text: text.replace("\\n", "\n"),
            })
        }
        "up" | "down" => {
            let (page, rest) = page_arg(rest)?;
            let (block_id, _) = word_arg(rest, "block")?;
            let direction = if verb == "up" {
                Direction::Up
            } else {
                Direction::Down
            };
            Input::Msg(Msg::MoveBlock {
                page,
                block_id: block_id.to_string(),
                direction,
            })
        }
        "drop" => {
            let (page, rest) = page_arg(rest)?;
            let (source_id, rest) = word_arg(rest, "source block")?;
            let (placement, rest) = word_arg(rest, "before|after")?;
            let placement = match placement {
                "before" => Placement::Before,
                "after" => Placement::After,
                other => return Err(format!("expected before or after, got `{other}`")),
            };
            let (target_id, _) = word_arg(rest, "target block")?;
            Input::Msg(Msg::DropBlock {
                page,
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
                placement,
            })
        }
        "regen" => {
            let (page, rest) = page_arg(rest)?;
            let rest = rest.trim_end();
            Input::Msg(Msg::RegenerateRequested {
                page,
                instruction: Some(rest.to_string()).filter(|text| !text.is_empty()),
            })
        }
        "export" => {
            let rest = rest.trim_end();
            if rest.is_empty() {
                return Err("export needs a directory".to_string());
            }
            Input::Export(PathBuf::from(rest))
        }
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(Some(input))
}

/// Split off the first word; the remainder is trimmed at the front only.
fn next_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

/// Split `<block> <text>`. Only the one separator after the block id is
/// consumed; the text is kept as typed.
fn block_and_text(text: &str) -> Result<(&str, &str), String> {
    let text = text.trim_start();
    let (block_id, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    if block_id.is_empty() {
        return Err("missing block".to_string());
    }
    Ok((block_id, rest))
}

fn word_arg<'a>(text: &'a str, what: &str) -> Result<(&'a str, &'a str), String> {
    let (word, rest) = next_word(text);
    if word.is_empty() {
        return Err(format!("missing {what}"));
    }
    Ok((word, rest))
}

fn page_arg(text: &str) -> Result<(u32, &str), String> {
    let (word, rest) = word_arg(text, "page number")?;
    let page = word
        .parse::<u32>()
        .ok()
        .filter(|page| *page > 0)
        .ok_or_else(|| format!("`{word}` is not a page number"))?;
    Ok((page, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn edit_keeps_the_rest_of_the_line() {
        assert_eq!(
            parse("edit 2 b1  Rust is  fast\\nand safe \n"),
            Ok(Some(Input::Msg(Msg::EditText {
                page: 2,
                block_id: "b1".to_string(),
                text: " Rust is  fast\nand safe ".to_string(),
            })))
        );
        assert_eq!(
            parse("edit 1 t1"),
            Ok(Some(Input::Msg(Msg::EditText {
                page: 1,
                block_id: "t1".to_string(),
                text: String::new(),
            })))
        );
        assert!(parse("edit 1").is_err());
    }

    #[test]
    fn drop_reads_placement() {
        assert_eq!(
            parse("drop 1 i1 before t1"),
            Ok(Some(Input::Msg(Msg::DropBlock {
                page: 1,
                source_id: "i1".to_string(),
                target_id: "t1".to_string(),
                placement: Placement::Before,
            })))
        );
        assert!(parse("drop 1 i1 beside t1").is_err());
        assert!(parse("drop 1 i1 after").is_err());
    }

    #[test]
    fn regen_instruction_is_optional() {
        assert_eq!(
            parse("regen 3"),
            Ok(Some(Input::Msg(Msg::RegenerateRequested {
                page: 3,
                instruction: None,
            })))
        );
        assert_eq!(
            parse("regen 3 shorter sentences"),
            Ok(Some(Input::Msg(Msg::RegenerateRequested {
                page: 3,
                instruction: Some("shorter sentences".to_string()),
            })))
        );
    }

    #[test]
    fn bad_page_numbers_are_reported() {
        assert!(parse("lock 0 b1").is_err());
        assert!(parse("lock x b1").is_err());
        assert!(parse("lock 1").is_err());
        assert!(parse("frobnicate").is_err());
    }

    #[test]
    fn simple_verbs() {
        assert_eq!(parse("quit"), Ok(Some(Input::Quit)));
        assert_eq!(parse("show"), Ok(Some(Input::Show)));
        assert_eq!(
            parse("export out/deck"),
            Ok(Some(Input::Export(PathBuf::from("out/deck"))))
        );
        assert_eq!(parse("up 1 b2").map(|i| i.is_some()), Ok(true));
    }
}
