//! Derives the visible quest list from the store and the current view.
//!
//! Everything here is a pure function of its inputs. Filters are tagged
//! predicates combined with AND, the sort is stable, and pagination returns a
//! window over the sorted result.

use crate::error::QuestError;
use crate::model::{DIFFICULTY_RANGE, Quest, QuestStatus};
use crate::store::{QuestId, QuestStore};
use crate::view_state::{SortDirection, SortKey, ViewState};
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestFilter {
    Status(QuestStatus),
    Difficulty(u8),
    /// Lowercased needle matched as a substring of name, description, reward
    /// and difficulty. Whitespace is part of the needle.
    Search(String),
}

impl QuestFilter {
    /// Builds a search filter, or `None` when the text is empty.
    pub fn search(text: &str) -> Option<Self> {
        if text.is_empty() {
            None
        } else {
            Some(Self::Search(text.to_lowercase()))
        }
    }

    pub fn matches(&self, quest: &Quest) -> bool {
        match self {
            Self::Status(status) => quest.status == *status,
            Self::Difficulty(difficulty) => quest.difficulty == *difficulty,
            Self::Search(needle) => {
                quest.name.to_lowercase().contains(needle)
                    || quest.description.to_lowercase().contains(needle)
                    || quest.reward.to_lowercase().contains(needle)
                    || quest.difficulty.to_string().contains(needle)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<QuestFilter>,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_view(state: &ViewState) -> Self {
        let mut query = Self::new().sorted_by(state.sort_key, state.sort_direction);
        if let Some(status) = state.current_view.status_filter() {
            query = query.with_filter(QuestFilter::Status(status));
        }
        if let Some(difficulty) = state.difficulty_filter {
            query = query.with_filter(QuestFilter::Difficulty(difficulty));
        }
        if let Some(search) = QuestFilter::search(&state.search_text) {
            query = query.with_filter(search);
        }
        query
    }

    pub fn with_filter(mut self, filter: QuestFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sorted_by(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort_key = key;
        self.sort_direction = direction;
        self
    }

    fn validate(&self) -> Result<(), QuestError> {
        for filter in &self.filters {
            if let QuestFilter::Difficulty(difficulty) = filter
                && !DIFFICULTY_RANGE.contains(difficulty)
            {
                return Err(QuestError::invalid_query(format!(
                    "difficulty filter {difficulty} is outside 1-5"
                )));
            }
        }
        Ok(())
    }

    fn matches(&self, quest: &Quest) -> bool {
        self.filters.iter().all(|filter| filter.matches(quest))
    }

    fn compare(&self, left: &Quest, right: &Quest) -> Ordering {
        let ordering = match self.sort_key {
            SortKey::Name => compare_text(&left.name, &right.name),
            SortKey::Difficulty => left.difficulty.cmp(&right.difficulty),
            SortKey::Reward => compare_text(&left.reward, &right.reward),
        };

        match self.sort_direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}

/// Filters and sorts the store. Ties keep store order.
pub fn visible_quests<'a>(
    store: &'a QuestStore,
    query: &Query,
) -> Result<Vec<(QuestId, &'a Quest)>, QuestError> {
    query.validate()?;

    let mut visible: Vec<_> = store
        .iter()
        .filter(|(_, quest)| query.matches(quest))
        .collect();
    visible.sort_by(|(_, left), (_, right)| query.compare(left, right));

    Ok(visible)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleQuest<'a> {
    pub id: QuestId,
    /// One-based position in the whole visible list, as shown to the user.
    pub number: usize,
    pub quest: &'a Quest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestPage<'a> {
    pub items: Vec<VisibleQuest<'a>>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size)
}

/// Slices `[page * size, min((page + 1) * size, total))`. A page past the end
/// yields no items; resetting it is up to the caller.
pub fn paginate<'a>(
    visible: Vec<(QuestId, &'a Quest)>,
    page: usize,
    page_size: usize,
) -> Result<QuestPage<'a>, QuestError> {
    if page_size == 0 {
        return Err(QuestError::invalid_query("page size must be at least 1"));
    }

    let total = visible.len();
    let start = page.saturating_mul(page_size);
    let items = visible
        .into_iter()
        .enumerate()
        .skip(start)
        .take(page_size)
        .map(|(position, (id, quest))| VisibleQuest {
            id,
            number: position + 1,
            quest,
        })
        .collect();

    Ok(QuestPage {
        items,
        page,
        total_pages: total_pages(total, page_size),
        total,
    })
}
