use crate::error::QuestError;
use crate::model::{DIFFICULTY_RANGE, Quest, QuestSnapshot, QuestStatus};
use crate::storage::PersistenceAdapter;
use tracing::{info, warn};

/// Stable handle to a quest owned by a [`QuestStore`].
///
/// Quests are only ever appended, so the insertion position never changes
/// for the lifetime of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestId(usize);

impl QuestId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QuestStore {
    quests: Vec<Quest>,
}

#[derive(Debug)]
pub struct StoreLoad {
    pub store: QuestStore,
    pub error: Option<QuestError>,
}

impl QuestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        name: &str,
        description: &str,
        difficulty: i64,
        reward: &str,
    ) -> Result<QuestId, QuestError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QuestError::validation("name is required"));
        }

        let difficulty = u8::try_from(difficulty)
            .ok()
            .filter(|value| DIFFICULTY_RANGE.contains(value))
            .ok_or_else(|| QuestError::validation("difficulty must be between 1 and 5"))?;

        let reward = reward.trim();
        if reward.is_empty() {
            return Err(QuestError::validation("reward is required"));
        }

        let id = QuestId(self.quests.len());
        self.quests.push(Quest {
            name: name.to_string(),
            description: description.trim().to_string(),
            difficulty,
            reward: reward.to_string(),
            status: QuestStatus::NotStarted,
        });
        info!(quest = name, difficulty, "quest created");

        Ok(id)
    }

    /// Moves a quest to `target` when that is the single legal next step.
    /// The quest is left untouched otherwise.
    pub fn advance(&mut self, id: QuestId, target: QuestStatus) -> Result<&Quest, QuestError> {
        let quest = self
            .quests
            .get_mut(id.0)
            .ok_or_else(|| QuestError::illegal_transition("quest not found"))?;

        if !quest.status.can_advance_to(target) {
            return Err(QuestError::illegal_transition(format!(
                "'{}' cannot move from {} to {}",
                quest.name,
                quest.status.as_str(),
                target.as_str()
            )));
        }

        quest.status = target;
        info!(quest = %quest.name, status = target.as_str(), "quest advanced");

        Ok(quest)
    }

    pub fn all(&self) -> &[Quest] {
        &self.quests
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestId, &Quest)> {
        self.quests
            .iter()
            .enumerate()
            .map(|(index, quest)| (QuestId(index), quest))
    }

    pub fn get(&self, id: QuestId) -> Option<&Quest> {
        self.quests.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    pub fn to_snapshots(&self) -> Vec<QuestSnapshot> {
        self.quests.iter().map(QuestSnapshot::from).collect()
    }

    /// Rebuilds a store from persisted records, rejecting the whole set if
    /// any record is malformed.
    pub fn from_snapshots(snapshots: Vec<QuestSnapshot>) -> Result<Self, QuestError> {
        let quests = snapshots
            .into_iter()
            .map(Quest::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { quests })
    }

    pub fn hydrate(adapter: &dyn PersistenceAdapter) -> StoreLoad {
        let loaded = adapter.load().and_then(|snapshots| match snapshots {
            Some(snapshots) => Self::from_snapshots(snapshots),
            None => Ok(Self::new()),
        });

        match loaded {
            Ok(store) => {
                info!(quests = store.len(), "quest store loaded");
                StoreLoad { store, error: None }
            }
            Err(err) => {
                warn!(error = %err, "quest store could not be loaded, starting empty");
                StoreLoad {
                    store: Self::new(),
                    error: Some(err),
                }
            }
        }
    }

    pub fn persist(&self, adapter: &dyn PersistenceAdapter) -> Result<(), QuestError> {
        adapter.save(&self.to_snapshots())?;
        info!(quests = self.len(), "quest store saved");
        Ok(())
    }
}
