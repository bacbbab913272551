use anyhow::bail;
use taskmon_core::{BulkAction, Msg, ViewLocation};

/// One line of `--watch` input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Msg),
    Quit,
}

pub const HELP: &str = "commands: open <path> | back <path> | toggle <path> | bookmark <folder> | \
search [query] | sort <key> | more | uncheck-all | delete-checked | delete-metadata | quit";

/// Parses a command line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> anyhow::Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let msg = match verb {
        "quit" | "exit" => return Ok(Some(Command::Quit)),
        "open" => Msg::FolderClicked {
            location: ViewLocation::from_pathname(required(verb, rest)?),
        },
        "back" | "forward" => Msg::HistoryNavigated {
            location: ViewLocation::from_pathname(required(verb, rest)?),
        },
        "toggle" => Msg::FolderToggled {
            path: required(verb, rest)?.trim_matches('/').to_string(),
        },
        "bookmark" => Msg::BookmarkOpened {
            folder: rest.trim_matches('/').to_string(),
        },
        "search" => Msg::SearchChanged(rest.to_string()),
        "sort" => Msg::SortChanged(required(verb, rest)?.to_string()),
        "more" => Msg::LoadMoreRequested,
        "uncheck-all" => Msg::BulkActionClicked(BulkAction::UncheckAll),
        "delete-checked" => Msg::BulkActionClicked(BulkAction::DeleteChecked),
        "delete-metadata" => Msg::BulkActionClicked(BulkAction::DeleteMetadata),
        other => bail!("unknown command {other:?}; {HELP}"),
    };
    Ok(Some(Command::Dispatch(msg)))
}

fn required<'a>(verb: &str, argument: &'a str) -> anyhow::Result<&'a str> {
    if argument.is_empty() {
        bail!("{verb} needs an argument");
    }
    Ok(argument)
}
