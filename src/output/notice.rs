use std::fmt;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

/// A transient one-line status message, the terminal's version of a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: &str, description: impl Into<String>) -> Self {
        Self::new(Level::Info, title, description)
    }

    pub fn success(title: &str, description: impl Into<String>) -> Self {
        Self::new(Level::Success, title, description)
    }

    pub fn error(title: &str, description: impl Into<String>) -> Self {
        Self::new(Level::Error, title, description)
    }

    fn new(level: Level, title: &str, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            Level::Info => "info",
            Level::Success => "ok",
            Level::Error => "error",
        };
        if self.description.is_empty() {
            write!(f, "[{tag}] {}", self.title)
        } else {
            write!(f, "[{tag}] {}: {}", self.title, self.description)
        }
    }
}

/// Print a notice to stderr and mirror it into the log.
pub fn emit(notice: &Notice) {
    match notice.level {
        Level::Error => warn!("{}: {}", notice.title, notice.description),
        _ => info!("{}: {}", notice.title, notice.description),
    }
    eprintln!("{notice}");
}
