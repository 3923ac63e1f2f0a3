use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestError {
    Validation(String),
    IllegalTransition(String),
    CorruptSnapshot(String),
    Io(String),
    InvalidQuery(String),
    InvalidConfig(String),
}

impl QuestError {
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn illegal_transition<M: Into<String>>(message: M) -> Self {
        Self::IllegalTransition(message.into())
    }

    pub fn corrupt_snapshot<M: Into<String>>(message: M) -> Self {
        Self::CorruptSnapshot(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn invalid_query<M: Into<String>>(message: M) -> Self {
        Self::InvalidQuery(message.into())
    }

    pub fn invalid_config<M: Into<String>>(message: M) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::IllegalTransition(_) => "illegal_transition",
            Self::CorruptSnapshot(_) => "corrupt_snapshot",
            Self::Io(_) => "io_error",
            Self::InvalidQuery(_) => "invalid_query",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            Self::IllegalTransition(message) => message,
            Self::CorruptSnapshot(message) => message,
            Self::Io(message) => message,
            Self::InvalidQuery(message) => message,
            Self::InvalidConfig(message) => message,
        }
    }
}

impl fmt::Display for QuestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for QuestError {}
