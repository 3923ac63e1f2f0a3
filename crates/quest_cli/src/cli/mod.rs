use clap::{Args, Parser, Subcommand, ValueEnum};
use quest_core::error::QuestError;
use quest_core::view_state::{Screen, SortKey};

#[derive(Parser, Debug)]
#[command(author, version, about = "Track quests from not started to completed", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new quest
    ///
    /// Example: questlog add "Slay Dragon" --difficulty 3 --reward "100 Gold"
    Add {
        name: Option<String>,
        #[arg(long, value_name = "1-5")]
        difficulty: Option<String>,
        #[arg(long)]
        reward: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List quests
    ///
    /// Example: questlog list accept --search gold --sort difficulty --desc
    List {
        #[arg(value_enum, default_value_t = ListView::All)]
        view: ListView,
        #[command(flatten)]
        filters: FilterArgs,
        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Accept a quest, using the number shown by `list accept`
    ///
    /// Example: questlog accept 2
    Accept {
        number: usize,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Complete a quest, using the number shown by `list complete`
    ///
    /// Example: questlog complete 1
    Complete {
        number: usize,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Start an interactive session (default when no command is given)
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListView {
    Active,
    Completed,
    Accept,
    Complete,
    All,
}

impl ListView {
    /// Screen whose status filter this listing uses. `All` stays on the menu,
    /// which filters nothing.
    pub fn screen(self) -> Screen {
        match self {
            ListView::Active => Screen::ActiveQuests,
            ListView::Completed => Screen::CompletedQuests,
            ListView::Accept => Screen::AcceptQuest,
            ListView::Complete => Screen::CompleteQuest,
            ListView::All => Screen::MainMenu,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text matched against name, description, reward and difficulty
    #[arg(long)]
    pub search: Option<String>,
    /// Only show quests of this difficulty
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub difficulty: Option<u8>,
    /// Sort by name, difficulty or reward
    #[arg(long, value_parser = parse_sort_key)]
    pub sort: Option<SortKey>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

fn parse_sort_key(raw: &str) -> Result<SortKey, String> {
    raw.parse::<SortKey>().map_err(|err| err.message().to_string())
}

/// One line typed into the interactive session.
#[derive(Parser, Debug)]
#[command(name = "questlog", no_binary_name = true, disable_help_flag = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Open a screen from the main menu: active, completed, accept, complete, create
    Open { screen: String },
    /// Select a quest by its number
    Select { number: usize },
    /// Sort by a key; repeating the key flips the direction
    Sort { key: String },
    /// Filter by difficulty 1-5, or `none`
    Difficulty { value: String },
    /// Search text; empty clears it
    Search { text: Vec<String> },
    /// Next page
    Next,
    /// Previous page
    Prev,
    /// Fill a create-form field: name, description, difficulty, reward
    Set {
        field: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Create the quest from the form
    Submit,
    /// Discard the form
    Cancel,
    /// Return to the main menu
    Back,
    /// Save progress
    Save,
    /// Leave the session (from the main menu)
    #[command(alias = "quit")]
    Exit,
}

pub fn parse_difficulty_filter(raw: &str) -> Result<Option<u8>, QuestError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("any") {
        return Ok(None);
    }

    match trimmed.parse::<u8>() {
        Ok(value) if (1..=5).contains(&value) => Ok(Some(value)),
        _ => Err(QuestError::invalid_query(
            "difficulty filter must be 1-5 or none",
        )),
    }
}

/// Converts a quest number as displayed into a position on the current page.
pub fn page_position(
    number: usize,
    current_page: usize,
    page_size: usize,
) -> Result<usize, QuestError> {
    let not_here = || QuestError::invalid_query(format!("quest {number} is not on this page"));
    if number == 0 || page_size == 0 || (number - 1) / page_size != current_page {
        return Err(not_here());
    }
    Ok((number - 1) % page_size)
}

/// Splits a line into arguments, honouring double quotes and `\"` escapes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, QuestError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(QuestError::validation("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, Command, ListView, SessionCommand, SessionLine, page_position,
        parse_difficulty_filter, split_command_line,
    };
    use clap::Parser;
    use quest_core::view_state::SortKey;

    #[test]
    fn split_command_line_honours_quotes() {
        let args = split_command_line(r#"set name "Slay \"Big\" Dragon""#).unwrap();
        assert_eq!(args, vec!["set", "name", "Slay \"Big\" Dragon"]);
    }

    #[test]
    fn split_command_line_rejects_unterminated_quote() {
        let err = split_command_line("search \"gold").unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn list_parses_filters() {
        let cli = Cli::try_parse_from([
            "questlog",
            "list",
            "accept",
            "--search",
            "gold",
            "--difficulty",
            "3",
            "--sort",
            "Reward",
            "--desc",
            "--page",
            "2",
        ])
        .unwrap();

        match cli.command {
            Some(Command::List {
                view,
                filters,
                page,
            }) => {
                assert_eq!(view, ListView::Accept);
                assert_eq!(filters.search.as_deref(), Some("gold"));
                assert_eq!(filters.difficulty, Some(3));
                assert_eq!(filters.sort, Some(SortKey::Reward));
                assert!(filters.desc);
                assert_eq!(page, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_rejects_out_of_range_difficulty() {
        assert!(Cli::try_parse_from(["questlog", "list", "--difficulty", "6"]).is_err());
        assert!(Cli::try_parse_from(["questlog", "list", "--sort", "xp"]).is_err());
    }

    #[test]
    fn session_line_collects_free_text() {
        let line = SessionLine::try_parse_from(["set", "reward", "100", "Gold"]).unwrap();
        match line.command {
            SessionCommand::Set { field, value } => {
                assert_eq!(field, "reward");
                assert_eq!(value.join(" "), "100 Gold");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let line = SessionLine::try_parse_from(["search"]).unwrap();
        assert!(matches!(line.command, SessionCommand::Search { text } if text.is_empty()));
    }

    #[test]
    fn page_position_is_relative_to_current_page() {
        assert_eq!(page_position(1, 0, 5).unwrap(), 0);
        assert_eq!(page_position(7, 1, 5).unwrap(), 1);
        assert_eq!(page_position(3, 1, 5).unwrap_err().code(), "invalid_query");
        assert!(page_position(11, 1, 5).is_err());
        assert!(page_position(0, 0, 5).is_err());
    }

    #[test]
    fn page_position_handles_huge_page_size() {
        assert_eq!(page_position(1, 0, usize::MAX).unwrap(), 0);
        assert_eq!(page_position(usize::MAX, 0, usize::MAX).unwrap(), usize::MAX - 1);
        assert!(page_position(1, 1, usize::MAX).is_err());
    }

    #[test]
    fn quit_is_an_alias_for_exit() {
        let line = SessionLine::try_parse_from(["quit"]).unwrap();
        assert!(matches!(line.command, SessionCommand::Exit));
    }

    #[test]
    fn difficulty_filter_accepts_none() {
        assert_eq!(parse_difficulty_filter("none").unwrap(), None);
        assert_eq!(parse_difficulty_filter(" 4 ").unwrap(), Some(4));
        assert_eq!(
            parse_difficulty_filter("0").unwrap_err().code(),
            "invalid_query"
        );
    }
}
