mod quest;

pub use quest::{DIFFICULTY_RANGE, Quest, QuestSnapshot, QuestStatus};
