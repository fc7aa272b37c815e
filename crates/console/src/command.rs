//! Console command parsing.

use std::path::PathBuf;
use std::str::FromStr;

use almirah_core::error::CoreError;
use almirah_core::product::{Category, Field};
use almirah_core::types::DbId;

pub const HELP: &str = "\
Commands:
  list [category]          reload products (optionally Men, Women or Kids)
  show                     render the form and the product grid
  set <field> <value...>   edit name, description, price, discount or brand
  category <name>          choose Men, Women or Kids
  image [path]             attach an image from disk, or clear the choice
  drag | leave             start or cancel dragging a file over the drop zone
  drop <path>              drop an image file onto the form
  unimage                  remove the attached image
  submit                   add the product
  delete <id>              delete a product (asks for confirmation)
  yes | no                 answer the confirmation
  dismiss                  hide the notification
  help                     show this help
  quit                     exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(Option<Category>),
    Show,
    Set(Field, String),
    Category(Category),
    Image(PathBuf),
    /// `image` with no path: the picker closed without a file.
    ClearPicker,
    DragEnter,
    DragLeave,
    Drop(PathBuf),
    Unimage,
    Submit,
    Delete(DbId),
    Yes,
    No,
    Dismiss,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a product id")]
    InvalidId(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "list" | "ls" | "refresh" => {
                let filter = if rest.is_empty() {
                    None
                } else {
                    Some(rest.parse()?)
                };
                Ok(Command::List(filter))
            }
            "show" => Ok(Command::Show),
            "set" => parse_set(rest),
            "category" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("category <Men|Women|Kids>"));
                }
                Ok(Command::Category(rest.parse()?))
            }
            "image" if rest.is_empty() => Ok(Command::ClearPicker),
            "image" => Ok(Command::Image(PathBuf::from(rest))),
            "drag" => Ok(Command::DragEnter),
            "leave" => Ok(Command::DragLeave),
            "drop" => Ok(Command::Drop(require_path(rest, "drop <path>")?)),
            "unimage" => Ok(Command::Unimage),
            "submit" => Ok(Command::Submit),
            "delete" | "rm" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("delete <id>"));
                }
                rest.parse::<DbId>()
                    .map(Command::Delete)
                    .map_err(|_| CommandError::InvalidId(rest.to_string()))
            }
            "yes" | "y" => Ok(Command::Yes),
            "no" | "n" => Ok(Command::No),
            "dismiss" => Ok(Command::Dismiss),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_set(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "set <name|description|price|discount|brand> <value...>";

    let (field, value) = match rest.split_once(char::is_whitespace) {
        Some((field, value)) => (field, value.trim()),
        None => (rest, ""),
    };
    if field.is_empty() {
        return Err(CommandError::Usage(USAGE));
    }

    match field.parse::<Field>()? {
        Field::Image => Err(CommandError::Usage("image <path>")),
        Field::Category => Ok(Command::Category(value.parse()?)),
        field => Ok(Command::Set(field, value.to_string())),
    }
}

fn require_path(rest: &str, usage: &'static str) -> Result<PathBuf, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok(PathBuf::from(rest))
}
