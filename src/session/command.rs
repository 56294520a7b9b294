use crate::api::{Category, Rating};
use crate::viewer::ViewerKey;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Gallery,
    Generate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    Prompt,
    NegativePrompt,
}

/// One line of session input. Positions are 0-based here and 1-based when typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Filter(Option<Category>),
    Open(usize),
    Key(ViewerKey),
    Info,
    Rate {
        position: Option<usize>,
        rating: Rating,
    },
    Delete(Option<usize>),
    Restore(Option<usize>),
    Purge,
    Yes,
    No,
    Copy(CopyTarget),
    Tab(Tab),
    Set {
        field: String,
        value: String,
    },
    Model(String),
    Generate,
    Status,
    Setup(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Type a command, or `help` for the list")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("`{command}` does not understand {value:?}")]
    InvalidArgument { command: &'static str, value: String },
}

fn missing(command: &'static str, argument: &'static str) -> CommandError {
    CommandError::MissingArgument { command, argument }
}

fn invalid(command: &'static str, value: &str) -> CommandError {
    CommandError::InvalidArgument {
        command,
        value: value.to_string(),
    }
}

fn parse_position(command: &'static str, value: &str) -> Result<usize, CommandError> {
    match value.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(invalid(command, value)),
    }
}

fn parse_rating(command: &'static str, value: &str) -> Result<Rating, CommandError> {
    value.parse().map_err(|_| invalid(command, value))
}

fn optional_position(command: &'static str, rest: &str) -> Result<Option<usize>, CommandError> {
    if rest.is_empty() {
        Ok(None)
    } else {
        parse_position(command, rest).map(Some)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let word = word.to_lowercase();

        if rest.is_empty()
            && let Ok(key) = word.parse::<ViewerKey>()
        {
            return Ok(Command::Key(key));
        }

        let command = match word.as_str() {
            "refresh" => Command::Refresh,
            "filter" => match rest.to_lowercase().as_str() {
                "" => return Err(missing("filter", "a category or `all`")),
                "all" => Command::Filter(None),
                other => Command::Filter(Some(
                    other.parse::<Category>().map_err(|_| invalid("filter", rest))?,
                )),
            },
            "open" => {
                if rest.is_empty() {
                    return Err(missing("open", "an image number"));
                }
                Command::Open(parse_position("open", rest)?)
            }
            "info" => Command::Info,
            "rate" => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                match args.as_slice() {
                    [] => return Err(missing("rate", "a rating")),
                    [rating] => Command::Rate {
                        position: None,
                        rating: parse_rating("rate", rating)?,
                    },
                    [position, rating] => Command::Rate {
                        position: Some(parse_position("rate", position)?),
                        rating: parse_rating("rate", rating)?,
                    },
                    _ => return Err(invalid("rate", rest)),
                }
            }
            "delete" => Command::Delete(optional_position("delete", rest)?),
            "restore" => Command::Restore(optional_position("restore", rest)?),
            "purge" => Command::Purge,
            "yes" | "y" => Command::Yes,
            "no" | "n" => Command::No,
            "copy" => match rest.to_lowercase().as_str() {
                "" => return Err(missing("copy", "`prompt` or `negative`")),
                "prompt" => Command::Copy(CopyTarget::Prompt),
                "negative" | "negative_prompt" => Command::Copy(CopyTarget::NegativePrompt),
                _ => return Err(invalid("copy", rest)),
            },
            "tab" => match rest.to_lowercase().as_str() {
                "" => return Err(missing("tab", "`gallery` or `generate`")),
                "gallery" => Command::Tab(Tab::Gallery),
                "generate" => Command::Tab(Tab::Generate),
                _ => return Err(invalid("tab", rest)),
            },
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| missing("set", "a field and a value"))?;
                Command::Set {
                    field: field.to_lowercase(),
                    value: value.trim().to_string(),
                }
            }
            "model" => {
                if rest.is_empty() {
                    return Err(missing("model", "a model id"));
                }
                Command::Model(rest.to_string())
            }
            "generate" => Command::Generate,
            "status" => Command::Status,
            "setup" => {
                if rest.is_empty() {
                    return Err(missing("setup", "a folder path"));
                }
                Command::Setup(rest.to_string())
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(CommandError::Unknown(word)),
        };

        Ok(command)
    }
}
