use crate::error::QuestError;
use crate::model::QuestStatus;
use crate::store::QuestId;
use std::str::FromStr;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    #[default]
    MainMenu,
    ActiveQuests,
    CompletedQuests,
    AcceptQuest,
    CompleteQuest,
    CreateQuest,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::MainMenu => "main_menu",
            Screen::ActiveQuests => "active_quests",
            Screen::CompletedQuests => "completed_quests",
            Screen::AcceptQuest => "accept_quest",
            Screen::CompleteQuest => "complete_quest",
            Screen::CreateQuest => "create_quest",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::MainMenu => "Quest Tracking System",
            Screen::ActiveQuests => "Active Quests",
            Screen::CompletedQuests => "Completed Quests",
            Screen::AcceptQuest => "Available Quests",
            Screen::CompleteQuest => "Quests to Complete",
            Screen::CreateQuest => "Create New Quest",
        }
    }

    /// Status a quest must have to be listed on this screen.
    pub fn status_filter(&self) -> Option<QuestStatus> {
        match self {
            Screen::ActiveQuests | Screen::CompleteQuest => Some(QuestStatus::Active),
            Screen::CompletedQuests => Some(QuestStatus::Completed),
            Screen::AcceptQuest => Some(QuestStatus::NotStarted),
            Screen::MainMenu | Screen::CreateQuest => None,
        }
    }

    pub fn is_quest_list(&self) -> bool {
        matches!(
            self,
            Screen::ActiveQuests
                | Screen::CompletedQuests
                | Screen::AcceptQuest
                | Screen::CompleteQuest
        )
    }
}

impl FromStr for Screen {
    type Err = QuestError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "main_menu" | "menu" => Ok(Screen::MainMenu),
            "active_quests" | "active" => Ok(Screen::ActiveQuests),
            "completed_quests" | "completed" => Ok(Screen::CompletedQuests),
            "accept_quest" | "accept" => Ok(Screen::AcceptQuest),
            "complete_quest" | "complete" => Ok(Screen::CompleteQuest),
            "create_quest" | "create" => Ok(Screen::CreateQuest),
            other => Err(QuestError::invalid_query(format!("unknown screen '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Difficulty,
    Reward,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Difficulty => "difficulty",
            SortKey::Reward => "reward",
        }
    }
}

impl FromStr for SortKey {
    type Err = QuestError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "difficulty" => Ok(SortKey::Difficulty),
            "reward" => Ok(SortKey::Reward),
            other => Err(QuestError::invalid_query(format!("unknown sort key '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    Difficulty,
    Reward,
}

impl FromStr for FormField {
    type Err = QuestError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(FormField::Name),
            "description" | "desc" => Ok(FormField::Description),
            "difficulty" => Ok(FormField::Difficulty),
            "reward" => Ok(FormField::Reward),
            other => Err(QuestError::validation(format!("unknown form field '{other}'"))),
        }
    }
}

/// Raw text of the create-quest form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub name: String,
    pub description: String,
    pub difficulty: String,
    pub reward: String,
}

impl CreateForm {
    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.name = value,
            FormField::Description => self.description = value,
            FormField::Difficulty => self.difficulty = value,
            FormField::Reward => self.reward = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientMessage {
    pub text: String,
    pub kind: MessageKind,
    pub expires_at: OffsetDateTime,
}

impl TransientMessage {
    pub fn is_visible(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub current_view: Screen,
    /// Highlighted quest; a handle into the store, never a copy.
    pub selected_quest: Option<QuestId>,
    pub difficulty_filter: Option<u8>,
    pub search_text: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    /// Zero-based.
    pub current_page: usize,
    pub transient_message: Option<TransientMessage>,
    pub form: CreateForm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Open(Screen),
    Save,
    Exit,
    /// Zero-based position within the current page.
    SelectQuest(usize),
    SortBy(SortKey),
    FilterDifficulty(Option<u8>),
    Search(String),
    NextPage,
    PreviousPage,
    EditField(FormField, String),
    SubmitForm,
    CancelForm,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[cfg(test)]
mod tests {
    use super::{FormField, MessageKind, Screen, SortDirection, SortKey, TransientMessage};
    use crate::model::QuestStatus;
    use time::macros::datetime;

    #[test]
    fn screens_map_to_status_filters() {
        assert_eq!(Screen::ActiveQuests.status_filter(), Some(QuestStatus::Active));
        assert_eq!(Screen::CompleteQuest.status_filter(), Some(QuestStatus::Active));
        assert_eq!(
            Screen::CompletedQuests.status_filter(),
            Some(QuestStatus::Completed)
        );
        assert_eq!(
            Screen::AcceptQuest.status_filter(),
            Some(QuestStatus::NotStarted)
        );
        assert_eq!(Screen::MainMenu.status_filter(), None);
        assert_eq!(Screen::CreateQuest.status_filter(), None);
    }

    #[test]
    fn parses_screen_aliases() {
        assert_eq!("accept".parse::<Screen>().unwrap(), Screen::AcceptQuest);
        assert_eq!(
            "Completed-Quests".parse::<Screen>().unwrap(),
            Screen::CompletedQuests
        );
        let err = "inventory".parse::<Screen>().unwrap_err();
        assert_eq!(err.code(), "invalid_query");
    }

    #[test]
    fn parses_sort_keys() {
        assert_eq!(" Reward ".parse::<SortKey>().unwrap(), SortKey::Reward);
        assert_eq!("bogus".parse::<SortKey>().unwrap_err().code(), "invalid_query");
        assert_eq!(SortDirection::Ascending.toggled(), SortDirection::Descending);
    }

    #[test]
    fn parses_form_fields() {
        assert_eq!("desc".parse::<FormField>().unwrap(), FormField::Description);
        assert!("colour".parse::<FormField>().is_err());
    }

    #[test]
    fn message_visible_until_expiry() {
        let message = TransientMessage {
            text: "Progress saved!".to_string(),
            kind: MessageKind::Info,
            expires_at: datetime!(2025-01-01 12:00:03 UTC),
        };

        assert!(message.is_visible(datetime!(2025-01-01 12:00:02 UTC)));
        assert!(!message.is_visible(datetime!(2025-01-01 12:00:03 UTC)));
    }
}
