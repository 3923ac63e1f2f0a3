use clap::{CommandFactory, Parser};
use quest_cli::cli::{
    Cli, Command, FilterArgs, SessionCommand, SessionLine, page_position,
    parse_difficulty_filter, split_command_line,
};
use quest_cli::render;
use quest_core::config::{self, ConfigOverrides, Palette};
use quest_core::error::QuestError;
use quest_core::model::Quest;
use quest_core::storage::{JsonFileStore, PersistenceAdapter};
use quest_core::store::{QuestId, QuestStore};
use quest_core::tracker::{QuestTracker, TrackerSettings};
use quest_core::view_state::{Flow, FormField, Intent, MessageKind, Screen, SortDirection};
use std::io::{self, BufRead};
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "QUESTLOG_LOG";

struct Context {
    settings: TrackerSettings,
    store_path: PathBuf,
    palette: Palette,
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_context(cli: &Cli) -> Result<Context, QuestError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        eprintln!("WARNING: {} (using default configuration)", err);
    }

    let mut overrides = ConfigOverrides::default();
    for raw in &cli.config_override {
        overrides.apply(raw)?;
    }
    let config = config::merge_overrides(&loaded.config, &overrides);

    Ok(Context {
        settings: config.tracker_settings()?,
        store_path: config.store_path()?,
        palette: config::palette_for_theme(config.theme.as_deref()),
        json: cli.json,
    })
}

fn normalize_parse_error(err: clap::Error) -> QuestError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    QuestError::validation(message)
}

fn quest_to_json(quest: &Quest) -> Result<String, QuestError> {
    serde_json::to_string(quest).map_err(|err| QuestError::io(err.to_string()))
}

/// Loads the store for a one-shot command. Unlike the interactive session,
/// a damaged file is an error here so that the command cannot overwrite it.
fn open_tracker(context: &Context) -> Result<QuestTracker<JsonFileStore>, QuestError> {
    let adapter = JsonFileStore::new(&context.store_path);
    let load = QuestStore::hydrate(&adapter);
    if let Some(err) = load.error {
        return Err(err);
    }
    Ok(QuestTracker::new(
        load.store,
        adapter,
        context.settings.clone(),
    ))
}

fn apply_filters<P: PersistenceAdapter>(
    tracker: &mut QuestTracker<P>,
    filters: &FilterArgs,
    now: OffsetDateTime,
) {
    if let Some(search) = filters.search.as_ref() {
        tracker.dispatch_at(Intent::Search(search.clone()), now);
    }
    if let Some(difficulty) = filters.difficulty {
        tracker.dispatch_at(Intent::FilterDifficulty(Some(difficulty)), now);
    }

    let key = filters.sort.unwrap_or(tracker.view_state().sort_key);
    if key != tracker.view_state().sort_key {
        tracker.dispatch_at(Intent::SortBy(key), now);
    }
    if filters.desc && tracker.view_state().sort_direction == SortDirection::Ascending {
        tracker.dispatch_at(Intent::SortBy(key), now);
    }
}

/// Pages forward to the quest shown as `number` and returns its position on
/// that page.
fn seek_number<P: PersistenceAdapter>(
    tracker: &mut QuestTracker<P>,
    number: usize,
    now: OffsetDateTime,
) -> Result<(usize, QuestId), QuestError> {
    let total = tracker.visible_page()?.total;
    if number == 0 || number > total {
        return Err(QuestError::invalid_query(format!(
            "no quest numbered {number} in this list"
        )));
    }

    let page_size = tracker.settings().page_size;
    for _ in 0..(number - 1) / page_size {
        tracker.dispatch_at(Intent::NextPage, now);
    }

    let position = (number - 1) % page_size;
    let id = tracker
        .visible_page()?
        .items
        .get(position)
        .map(|item| item.id)
        .ok_or_else(|| QuestError::invalid_query(format!("no quest numbered {number}")))?;
    Ok((position, id))
}

fn save<P: PersistenceAdapter>(
    tracker: &mut QuestTracker<P>,
    now: OffsetDateTime,
) -> Result<(), QuestError> {
    tracker.dispatch_at(Intent::Save, now);
    match tracker.active_message(now) {
        Some(message) if message.kind == MessageKind::Error => {
            Err(QuestError::io(message.text.clone()))
        }
        _ => Ok(()),
    }
}

fn run_add(
    context: &Context,
    name: Option<String>,
    difficulty: Option<String>,
    reward: Option<String>,
    description: Option<String>,
) -> Result<(), QuestError> {
    let now = OffsetDateTime::now_utc();
    let mut tracker = open_tracker(context)?;

    tracker.dispatch_at(Intent::Open(Screen::CreateQuest), now);
    let fields = [
        (FormField::Name, name),
        (FormField::Description, description),
        (FormField::Difficulty, difficulty),
        (FormField::Reward, reward),
    ];
    for (field, value) in fields {
        tracker.dispatch_at(Intent::EditField(field, value.unwrap_or_default()), now);
    }
    tracker.dispatch_at(Intent::SubmitForm, now);

    if tracker.view_state().current_view == Screen::CreateQuest {
        let reason = tracker
            .active_message(now)
            .map(|message| message.text.clone())
            .unwrap_or_else(|| "quest could not be created".to_string());
        return Err(QuestError::validation(reason));
    }

    save(&mut tracker, now)?;
    let quest = tracker
        .store()
        .all()
        .last()
        .ok_or_else(|| QuestError::io("created quest is missing"))?;

    if context.json {
        println!("{}", quest_to_json(quest)?);
    } else {
        println!(
            "Created quest: {} (difficulty {}, reward {})",
            quest.name, quest.difficulty, quest.reward
        );
    }
    Ok(())
}

fn run_list(
    context: &Context,
    screen: Screen,
    filters: &FilterArgs,
    page: usize,
) -> Result<(), QuestError> {
    if page == 0 {
        return Err(QuestError::invalid_query("pages start at 1"));
    }

    let now = OffsetDateTime::now_utc();
    let mut tracker = open_tracker(context)?;
    if screen != Screen::MainMenu {
        tracker.dispatch_at(Intent::Open(screen), now);
    }
    apply_filters(&mut tracker, filters, now);

    let last_page = tracker.visible_page()?.total_pages.max(1);
    if page > last_page {
        eprintln!("NOTE: page {page} is past the end, showing page {last_page} of {last_page}");
    }
    for _ in 1..page.min(last_page) {
        tracker.dispatch_at(Intent::NextPage, now);
    }

    let visible = tracker.visible_page()?;
    if context.json {
        println!("{}", render::page_json(screen, &visible));
    } else {
        let title = match screen {
            Screen::MainMenu => "All Quests",
            other => other.title(),
        };
        println!("{}", context.palette.accentize(title));
        println!(
            "{}",
            render::page_table(&visible, tracker.view_state(), &context.palette)
        );
    }
    Ok(())
}

fn run_advance(
    context: &Context,
    screen: Screen,
    number: usize,
    filters: &FilterArgs,
) -> Result<(), QuestError> {
    let now = OffsetDateTime::now_utc();
    let mut tracker = open_tracker(context)?;

    tracker.dispatch_at(Intent::Open(screen), now);
    apply_filters(&mut tracker, filters, now);
    let (position, id) = seek_number(&mut tracker, number, now)?;
    tracker.dispatch_at(Intent::SelectQuest(position), now);

    if tracker.view_state().current_view != Screen::MainMenu {
        return Err(QuestError::illegal_transition(format!(
            "quest {number} could not be updated"
        )));
    }

    save(&mut tracker, now)?;
    let quest = tracker
        .store()
        .get(id)
        .ok_or_else(|| QuestError::io("updated quest is missing"))?;

    if context.json {
        println!("{}", quest_to_json(quest)?);
    } else {
        let verb = if screen == Screen::AcceptQuest {
            "Accepted"
        } else {
            "Completed"
        };
        println!("{verb} quest: {}", quest.name);
    }
    Ok(())
}

fn print_session_help() {
    let mut cmd = SessionLine::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn session_intent<P: PersistenceAdapter>(
    tracker: &QuestTracker<P>,
    command: SessionCommand,
) -> Result<Intent, QuestError> {
    let intent = match command {
        SessionCommand::Open { screen } => Intent::Open(screen.parse()?),
        SessionCommand::Select { number } => Intent::SelectQuest(page_position(
            number,
            tracker.view_state().current_page,
            tracker.settings().page_size,
        )?),
        SessionCommand::Sort { key } => Intent::SortBy(key.parse()?),
        SessionCommand::Difficulty { value } => {
            Intent::FilterDifficulty(parse_difficulty_filter(&value)?)
        }
        SessionCommand::Search { text } => Intent::Search(text.join(" ")),
        SessionCommand::Next => Intent::NextPage,
        SessionCommand::Prev => Intent::PreviousPage,
        SessionCommand::Set { field, value } => Intent::EditField(field.parse()?, value.join(" ")),
        SessionCommand::Submit => Intent::SubmitForm,
        SessionCommand::Cancel => Intent::CancelForm,
        SessionCommand::Back => Intent::Back,
        SessionCommand::Save => Intent::Save,
        SessionCommand::Exit => Intent::Exit,
    };
    Ok(intent)
}

fn print_screen<P: PersistenceAdapter>(tracker: &QuestTracker<P>, palette: &Palette) {
    match render::render_screen(tracker, OffsetDateTime::now_utc(), palette) {
        Ok(screen) => println!("{screen}\n"),
        Err(err) => eprintln!("ERROR: {}", err),
    }
}

fn run_interactive(context: &Context) -> Result<(), QuestError> {
    let adapter = JsonFileStore::new(&context.store_path);
    let mut tracker = QuestTracker::open(adapter, context.settings.clone());
    print_screen(&tracker, &context.palette);

    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| QuestError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line == "help" || line == "?" {
            print_session_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let command = match SessionLine::try_parse_from(args) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        let intent = match session_intent(&tracker, command) {
            Ok(intent) => intent,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        let exiting = intent == Intent::Exit;
        if tracker.dispatch(intent) == Flow::Exit {
            break;
        }
        if exiting {
            eprintln!("NOTE: exit works from the main menu; use `back` first");
        }
        print_screen(&tracker, &context.palette);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), QuestError> {
    let context = load_context(&cli)?;

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Add {
            name,
            difficulty,
            reward,
            description,
        } => run_add(&context, name, difficulty, reward, description),
        Command::List {
            view,
            filters,
            page,
        } => run_list(&context, view.screen(), &filters, page),
        Command::Accept { number, filters } => {
            run_advance(&context, Screen::AcceptQuest, number, &filters)
        }
        Command::Complete { number, filters } => {
            run_advance(&context, Screen::CompleteQuest, number, &filters)
        }
        Command::Interactive => run_interactive(&context),
    }
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
