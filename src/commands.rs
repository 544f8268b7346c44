/*!
 * Line commands of the interactive worksheet session.
 *
 * Sentence positions are typed 1-based and stored 0-based.
 */

use std::str::FromStr;
use thiserror::Error;

use crate::generation::GenerationInput;

/// Shown by `help`
pub const HELP_TEXT: &str = "\
Commands:
  gen [grade] [level] [count] [goal...]  generate sentences (missing values keep the current form)
  add <sentence>                          add one sentence
  add                                     add several lines, finish with a lone '.'
  edit <n> <text>                         replace sentence n
  del <n>                                 delete sentence n
  list                                    show all sentences
  pages                                   show the page layout
  export <n|all>                          save page n or every page as PNG
  reset                                   clear the worksheet
  status                                  show session state
  ping                                    check the generation provider
  help                                    show this text
  quit                                    leave the session";

/// A command line that could not be understood
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("Positions start at 1")]
    InvalidPosition,
}

/// Overrides for the generation form; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateArgs {
    pub grade_level: Option<String>,
    pub proficiency_level: Option<String>,
    pub number_of_sentences: Option<i64>,
    pub dictation_goal: Option<String>,
}

impl GenerateArgs {
    /// Write the overrides into the form
    pub fn apply(&self, form: &mut GenerationInput) {
        if let Some(grade) = &self.grade_level {
            form.grade_level = grade.clone();
        }
        if let Some(level) = &self.proficiency_level {
            form.proficiency_level = level.clone();
        }
        if let Some(count) = self.number_of_sentences {
            form.number_of_sentences = count;
        }
        if let Some(goal) = &self.dictation_goal {
            form.dictation_goal = goal.clone();
        }
    }
}

/// Which pages to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Page(usize),
    All,
}

/// One parsed session command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Generate(GenerateArgs),
    /// `None` starts multi-line entry
    Add(Option<String>),
    Edit { index: usize, text: String },
    Delete { index: usize },
    List,
    Pages,
    Export(ExportTarget),
    Reset,
    Status,
    Ping,
    Help,
    Quit,
}

fn parse_number(word: &str) -> Result<i64, CommandError> {
    word.parse::<i64>()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

fn parse_position(word: Option<&str>, command: &'static str) -> Result<usize, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument {
        command,
        argument: "a sentence number",
    })?;
    let position = word
        .parse::<usize>()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))?;
    position.checked_sub(1).ok_or(CommandError::InvalidPosition)
}

fn parse_generate(rest: &str) -> Result<GenerateArgs, CommandError> {
    let mut words = rest.split_whitespace();
    let mut args = GenerateArgs {
        grade_level: words.next().map(str::to_string),
        proficiency_level: words.next().map(str::to_string),
        ..GenerateArgs::default()
    };
    if let Some(count) = words.next() {
        args.number_of_sentences = Some(parse_number(count)?);
    }
    let goal = words.collect::<Vec<_>>().join(" ");
    if !goal.is_empty() {
        args.dictation_goal = Some(goal);
    }
    Ok(args)
}

impl FromStr for SessionCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(k, r)| (k, r.trim()));

        match keyword.to_lowercase().as_str() {
            "gen" | "generate" => Ok(Self::Generate(parse_generate(rest)?)),
            "add" => Ok(Self::Add(Some(rest.to_string()).filter(|s| !s.is_empty()))),
            "edit" => {
                let (position, text) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(p, t)| (p, t.trim()));
                let index = parse_position(Some(position).filter(|p| !p.is_empty()), "edit")?;
                if text.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "edit",
                        argument: "the new text",
                    });
                }
                Ok(Self::Edit {
                    index,
                    text: text.to_string(),
                })
            }
            "del" | "delete" => Ok(Self::Delete {
                index: parse_position(rest.split_whitespace().next(), "del")?,
            }),
            "list" | "ls" => Ok(Self::List),
            "pages" => Ok(Self::Pages),
            "export" => match rest {
                "" => Err(CommandError::MissingArgument {
                    command: "export",
                    argument: "a page number or 'all'",
                }),
                "all" => Ok(Self::Export(ExportTarget::All)),
                page => {
                    let page = page
                        .parse::<usize>()
                        .map_err(|_| CommandError::InvalidNumber(page.to_string()))?;
                    Ok(Self::Export(ExportTarget::Page(page)))
                }
            },
            "reset" => Ok(Self::Reset),
            "status" => Ok(Self::Status),
            "ping" => Ok(Self::Ping),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
