use crate::error::QuestError;
use crate::model::{DIFFICULTY_RANGE, QuestStatus};
use crate::query::{self, DEFAULT_PAGE_SIZE, Query, QuestPage};
use crate::storage::PersistenceAdapter;
use crate::store::{QuestId, QuestStore};
use crate::view_state::{
    CreateForm, Flow, Intent, MessageKind, Screen, SortDirection, TransientMessage, ViewState,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub page_size: usize,
    pub message_duration: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            message_duration: Duration::seconds(3),
        }
    }
}

/// Owns the quest set and the view state, and applies user intents to both.
pub struct QuestTracker<P: PersistenceAdapter> {
    store: QuestStore,
    adapter: P,
    state: ViewState,
    settings: TrackerSettings,
}

impl<P: PersistenceAdapter> QuestTracker<P> {
    pub fn new(store: QuestStore, adapter: P, settings: TrackerSettings) -> Self {
        Self {
            store,
            adapter,
            state: ViewState::default(),
            settings,
        }
    }

    pub fn open(adapter: P, settings: TrackerSettings) -> Self {
        Self::open_at(adapter, settings, OffsetDateTime::now_utc())
    }

    /// Hydrates from the adapter. A failed load starts empty and leaves an
    /// error message for the user.
    pub fn open_at(adapter: P, settings: TrackerSettings, now: OffsetDateTime) -> Self {
        let load = QuestStore::hydrate(&adapter);
        let mut tracker = Self::new(load.store, adapter, settings);
        if let Some(err) = load.error {
            tracker.set_message(
                format!("Could not load quests: {}", err.message()),
                MessageKind::Error,
                now,
            );
        }
        tracker
    }

    pub fn view_state(&self) -> &ViewState {
        &self.state
    }

    pub fn store(&self) -> &QuestStore {
        &self.store
    }

    pub fn adapter(&self) -> &P {
        &self.adapter
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn visible_page(&self) -> Result<QuestPage<'_>, QuestError> {
        let visible = query::visible_quests(&self.store, &Query::for_view(&self.state))?;
        query::paginate(visible, self.state.current_page, self.settings.page_size)
    }

    pub fn active_message(&self, now: OffsetDateTime) -> Option<&TransientMessage> {
        self.state
            .transient_message
            .as_ref()
            .filter(|message| message.is_visible(now))
    }

    pub fn dispatch(&mut self, intent: Intent) -> Flow {
        self.dispatch_at(intent, OffsetDateTime::now_utc())
    }

    pub fn dispatch_at(&mut self, intent: Intent, now: OffsetDateTime) -> Flow {
        let screen = self.state.current_view;
        match intent {
            Intent::Open(target) if screen == Screen::MainMenu && target != Screen::MainMenu => {
                self.state.current_view = target;
                self.state.current_page = 0;
                self.state.difficulty_filter = None;
                self.state.selected_quest = None;
            }
            Intent::Save if screen == Screen::MainMenu => self.save(now),
            Intent::Exit if screen == Screen::MainMenu => {
                info!("exit requested");
                return Flow::Exit;
            }
            Intent::SelectQuest(position) if screen.is_quest_list() => {
                self.select_quest(position, now);
            }
            Intent::SortBy(key) => {
                if self.state.sort_key == key {
                    self.state.sort_direction = self.state.sort_direction.toggled();
                } else {
                    self.state.sort_key = key;
                    self.state.sort_direction = SortDirection::Ascending;
                }
                self.state.current_page = 0;
            }
            Intent::FilterDifficulty(difficulty)
                if difficulty.is_none_or(|value| DIFFICULTY_RANGE.contains(&value)) =>
            {
                self.state.difficulty_filter = difficulty;
                self.state.current_page = 0;
            }
            Intent::Search(text) => {
                self.state.search_text = text;
                self.state.current_page = 0;
            }
            Intent::NextPage => {
                let total_pages = self.total_pages();
                if self.state.current_page + 1 < total_pages {
                    self.state.current_page += 1;
                }
            }
            Intent::PreviousPage => {
                self.state.current_page = self.state.current_page.saturating_sub(1);
            }
            Intent::EditField(field, value) if screen == Screen::CreateQuest => {
                self.state.form.set(field, value);
            }
            Intent::SubmitForm if screen == Screen::CreateQuest => self.submit_form(now),
            Intent::CancelForm if screen == Screen::CreateQuest => {
                self.state.form = CreateForm::default();
                self.state.current_view = Screen::MainMenu;
            }
            Intent::Back if screen != Screen::MainMenu => {
                self.state.selected_quest = None;
                self.state.difficulty_filter = None;
                self.state.search_text.clear();
                self.state.current_view = Screen::MainMenu;
            }
            other => {
                debug!(intent = ?other, screen = screen.as_str(), "intent ignored");
            }
        }

        Flow::Continue
    }

    fn total_pages(&self) -> usize {
        self.visible_page()
            .map(|page| page.total_pages)
            .unwrap_or(0)
    }

    fn quest_on_page(&self, position: usize) -> Option<QuestId> {
        let page = self.visible_page().ok()?;
        page.items.get(position).map(|item| item.id)
    }

    fn select_quest(&mut self, position: usize, now: OffsetDateTime) {
        let Some(id) = self.quest_on_page(position) else {
            debug!(position, "no quest at position");
            return;
        };

        let target = match self.state.current_view {
            Screen::AcceptQuest => QuestStatus::Active,
            Screen::CompleteQuest => QuestStatus::Completed,
            _ => {
                self.state.selected_quest = Some(id);
                return;
            }
        };

        match self.store.advance(id, target) {
            Ok(quest) => {
                let text = match target {
                    QuestStatus::Active => format!("{} accepted!", quest.name),
                    _ => format!("{} completed!", quest.name),
                };
                self.set_message(text, MessageKind::Info, now);
                self.state.selected_quest = None;
                self.state.current_view = Screen::MainMenu;
            }
            Err(err) => warn!(error = %err, "status change ignored"),
        }
    }

    fn submit_form(&mut self, now: OffsetDateTime) {
        let form = &self.state.form;
        // Text that is not a number is reported as out of range.
        let difficulty = form.difficulty.trim().parse::<i64>().unwrap_or(0);
        let created = self
            .store
            .create(&form.name, &form.description, difficulty, &form.reward);

        match created {
            Ok(_) => {
                self.state.form = CreateForm::default();
                self.state.current_view = Screen::MainMenu;
                self.set_message("Quest created!".to_string(), MessageKind::Info, now);
            }
            Err(err) => {
                self.set_message(err.message().to_string(), MessageKind::Error, now);
            }
        }
    }

    fn save(&mut self, now: OffsetDateTime) {
        match self.store.persist(&self.adapter) {
            Ok(()) => self.set_message("Progress saved!".to_string(), MessageKind::Info, now),
            Err(err) => {
                warn!(error = %err, "save failed");
                self.set_message(
                    format!("Save failed: {}", err.message()),
                    MessageKind::Error,
                    now,
                );
            }
        }
    }

    fn set_message(&mut self, text: String, kind: MessageKind, now: OffsetDateTime) {
        self.state.transient_message = Some(TransientMessage {
            text,
            kind,
            expires_at: now + self.settings.message_duration,
        });
    }
}
