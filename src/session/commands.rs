//! Line commands accepted by the interactive browser.

use thiserror::Error;

use super::Facet;
use crate::output::ViewMode;
use crate::utils::parse_list_csv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Set the free-text term
    Search(String),
    ClearSearch,
    /// Replace the category selection; empty clears it
    Category(Vec<String>),
    /// Replace the country selection; empty clears it
    Country(Vec<String>),
    /// Drop every filter
    Clear,
    Page(usize),
    Next,
    Prev,
    View(ViewMode),
    /// List the values available for a facet
    List(Facet),
    Show,
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("invalid page number '{0}'")]
    InvalidPage(String),

    #[error("unknown view '{0}', expected table or cards")]
    InvalidView(String),
}

pub const HELP: &str = "\
Commands:
  search <term>         search name, description and focus
  clear-search          drop the search term
  category [a,b,...]    filter by categories (no value clears)
  country [a,b,...]     filter by countries (no value clears)
  clear                 drop every filter
  page <n> | next | prev
  view table|cards
  categories | countries
  show                  redraw the current page
  reload                re-read the data file
  help | quit
";

impl SessionCommand {
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CommandError::Empty);
        }
        let (word, rest) = match input.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (input, ""),
        };

        match word.to_lowercase().as_str() {
            "search" | "s" | "/" => {
                if rest.is_empty() {
                    Err(CommandError::MissingArgument {
                        command: "search",
                        expected: "a search term",
                    })
                } else {
                    Ok(Self::Search(rest.to_string()))
                }
            }
            "clear-search" => Ok(Self::ClearSearch),
            "category" | "cat" => Ok(Self::Category(parse_list_csv(rest))),
            "country" => Ok(Self::Country(parse_list_csv(rest))),
            "clear" | "reset" => Ok(Self::Clear),
            "page" | "p" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "page",
                        expected: "a page number",
                    });
                }
                rest.parse::<usize>()
                    .map(Self::Page)
                    .map_err(|_| CommandError::InvalidPage(rest.to_string()))
            }
            "next" | "n" => Ok(Self::Next),
            "prev" | "previous" => Ok(Self::Prev),
            "view" => ViewMode::parse(rest)
                .map(Self::View)
                .ok_or_else(|| CommandError::InvalidView(rest.to_string())),
            "table" => Ok(Self::View(ViewMode::Table)),
            "cards" => Ok(Self::View(ViewMode::Cards)),
            "categories" => Ok(Self::List(Facet::Categories)),
            "countries" => Ok(Self::List(Facet::Countries)),
            "show" | "ls" => Ok(Self::Show),
            "reload" => Ok(Self::Reload),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_keeps_the_rest_of_the_line() {
        assert_eq!(
            SessionCommand::parse("search  clean water ").unwrap(),
            SessionCommand::Search("clean water".to_string())
        );
        assert!(matches!(
            SessionCommand::parse("search"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn selections_split_on_commas() {
        assert_eq!(
            SessionCommand::parse("category Health, Education").unwrap(),
            SessionCommand::Category(vec!["Health".to_string(), "Education".to_string()])
        );
        assert_eq!(
            SessionCommand::parse("country").unwrap(),
            SessionCommand::Country(Vec::new())
        );
    }

    #[test]
    fn paging_commands() {
        assert_eq!(SessionCommand::parse("page 3").unwrap(), SessionCommand::Page(3));
        assert_eq!(SessionCommand::parse("NEXT").unwrap(), SessionCommand::Next);
        assert_eq!(
            SessionCommand::parse("page two").unwrap_err(),
            CommandError::InvalidPage("two".to_string())
        );
        assert_eq!(
            SessionCommand::parse("page -1").unwrap_err(),
            CommandError::InvalidPage("-1".to_string())
        );
    }

    #[test]
    fn view_and_facets() {
        assert_eq!(
            SessionCommand::parse("view cards").unwrap(),
            SessionCommand::View(ViewMode::Cards)
        );
        assert!(matches!(
            SessionCommand::parse("view list"),
            Err(CommandError::InvalidView(_))
        ));
        assert_eq!(
            SessionCommand::parse("countries").unwrap(),
            SessionCommand::List(Facet::Countries)
        );
    }

    #[test]
    fn unknown_and_empty_input_are_errors() {
        assert_eq!(SessionCommand::parse("   ").unwrap_err(), CommandError::Empty);
        assert_eq!(
            SessionCommand::parse("dance now").unwrap_err(),
            CommandError::Unknown("dance".to_string())
        );
    }
}
