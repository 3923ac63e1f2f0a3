use crate::error::QuestError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const DIFFICULTY_RANGE: RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestStatus {
    NotStarted,
    Active,
    Completed,
}

impl QuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestStatus::NotStarted => "NotStarted",
            QuestStatus::Active => "Active",
            QuestStatus::Completed => "Completed",
        }
    }

    /// The single status a quest may move to from this one, if any.
    pub fn next(&self) -> Option<QuestStatus> {
        match self {
            QuestStatus::NotStarted => Some(QuestStatus::Active),
            QuestStatus::Active => Some(QuestStatus::Completed),
            QuestStatus::Completed => None,
        }
    }

    pub fn can_advance_to(&self, target: QuestStatus) -> bool {
        self.next() == Some(target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quest {
    pub name: String,
    pub description: String,
    pub difficulty: u8,
    pub reward: String,
    pub status: QuestStatus,
}

/// Persisted shape of a quest. Every key is required and no others are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestSnapshot {
    pub name: String,
    pub description: String,
    pub difficulty: u8,
    pub reward: String,
    pub status: QuestStatus,
}

impl From<&Quest> for QuestSnapshot {
    fn from(quest: &Quest) -> Self {
        Self {
            name: quest.name.clone(),
            description: quest.description.clone(),
            difficulty: quest.difficulty,
            reward: quest.reward.clone(),
            status: quest.status,
        }
    }
}

impl TryFrom<QuestSnapshot> for Quest {
    type Error = QuestError;

    fn try_from(snapshot: QuestSnapshot) -> Result<Self, Self::Error> {
        if snapshot.name.is_empty() {
            return Err(QuestError::corrupt_snapshot("quest name is empty"));
        }

        if !DIFFICULTY_RANGE.contains(&snapshot.difficulty) {
            return Err(QuestError::corrupt_snapshot(format!(
                "difficulty {} of '{}' is outside 1-5",
                snapshot.difficulty, snapshot.name
            )));
        }

        Ok(Self {
            name: snapshot.name,
            description: snapshot.description,
            difficulty: snapshot.difficulty,
            reward: snapshot.reward,
            status: snapshot.status,
        })
    }
}
