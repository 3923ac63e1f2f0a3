use quest_core::config::Palette;
use quest_core::error::QuestError;
use quest_core::model::Quest;
use quest_core::query::QuestPage;
use quest_core::storage::PersistenceAdapter;
use quest_core::tracker::QuestTracker;
use quest_core::view_state::{CreateForm, MessageKind, Screen, TransientMessage, ViewState};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;

const MENU_OPTIONS: [(&str, &str); 7] = [
    ("open active", "View Active Quests"),
    ("open completed", "View Completed Quests"),
    ("open accept", "Accept a New Quest"),
    ("open complete", "Complete a Quest"),
    ("open create", "Create a New Quest"),
    ("save", "Save Progress"),
    ("exit", "Exit"),
];

#[derive(Tabled)]
struct QuestRow {
    #[tabled(rename = "#")]
    number: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Difficulty")]
    difficulty: u8,
    #[tabled(rename = "Reward")]
    reward: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

pub fn quest_json(number: usize, quest: &Quest) -> serde_json::Value {
    serde_json::json!({
        "number": number,
        "name": quest.name,
        "description": quest.description,
        "difficulty": quest.difficulty,
        "reward": quest.reward,
        "status": quest.status.as_str(),
    })
}

pub fn page_json(screen: Screen, page: &QuestPage<'_>) -> serde_json::Value {
    let items: Vec<_> = page
        .items
        .iter()
        .map(|item| quest_json(item.number, item.quest))
        .collect();
    serde_json::json!({
        "view": screen.as_str(),
        "page": page.page + 1,
        "total_pages": page.total_pages,
        "total": page.total,
        "items": items,
    })
}

/// Renders the page as a table. The selected quest is marked with `>`.
pub fn page_table(page: &QuestPage<'_>, state: &ViewState, palette: &Palette) -> String {
    if page.items.is_empty() {
        return palette.mutedize("No quests available");
    }

    let rows = page.items.iter().map(|item| QuestRow {
        number: if state.selected_quest == Some(item.id) {
            format!("> {}", item.number)
        } else {
            item.number.to_string()
        },
        name: item.quest.name.clone(),
        difficulty: item.quest.difficulty,
        reward: item.quest.reward.clone(),
        status: item.quest.status.as_str(),
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!(
        "{}\n{}",
        table,
        palette.mutedize(&format!(
            "Page {} of {} ({} quests)",
            page.page + 1,
            page.total_pages,
            page.total
        ))
    )
}

fn filter_summary(state: &ViewState) -> String {
    let difficulty = state
        .difficulty_filter
        .map(|value| value.to_string())
        .unwrap_or_else(|| "any".to_string());
    let search = if state.search_text.is_empty() {
        "-".to_string()
    } else {
        format!("\"{}\"", state.search_text)
    };
    format!(
        "search: {} | difficulty: {} | sort: {} {}",
        search,
        difficulty,
        state.sort_key.as_str(),
        state.sort_direction.as_str()
    )
}

fn form_lines(form: &CreateForm) -> String {
    [
        ("Name", &form.name),
        ("Description", &form.description),
        ("Difficulty (1-5)", &form.difficulty),
        ("Reward", &form.reward),
    ]
    .iter()
    .map(|(label, value)| format!("{label}: {value}"))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn message_line(message: &TransientMessage, palette: &Palette) -> String {
    match message.kind {
        MessageKind::Info => palette.accentize(&message.text),
        MessageKind::Error => format!("! {}", message.text),
    }
}

/// Text rendering of the current screen, the terminal stand-in for a window frame.
pub fn render_screen<P: PersistenceAdapter>(
    tracker: &QuestTracker<P>,
    now: OffsetDateTime,
    palette: &Palette,
) -> Result<String, QuestError> {
    let state = tracker.view_state();
    let screen = state.current_view;
    let mut lines = vec![palette.accentize(screen.title())];

    match screen {
        Screen::MainMenu => {
            for (command, label) in MENU_OPTIONS {
                lines.push(format!("  {label:<24} {}", palette.mutedize(command)));
            }
        }
        Screen::CreateQuest => {
            lines.push(form_lines(&state.form));
            lines.push(palette.mutedize("set <field> <value> | submit | cancel | back"));
        }
        _ => {
            let page = tracker.visible_page()?;
            lines.push(palette.mutedize(&filter_summary(state)));
            lines.push(page_table(&page, state, palette));
            let hint = match screen {
                Screen::AcceptQuest => "select <n> to accept",
                Screen::CompleteQuest => "select <n> to complete",
                _ => "select <n> to highlight",
            };
            lines.push(palette.mutedize(&format!(
                "{hint} | sort | difficulty | search | next | prev | back"
            )));
        }
    }

    if let Some(message) = tracker.active_message(now) {
        lines.push(message_line(message, palette));
    }

    Ok(lines.join("\n"))
}
