//! collected messages and errors of a run
//!
//! [Results] is what the user gets to see at the end: messages filtered by severity, followed by
//! every error. Errors are never filtered, and [Results::has_errors] decides the exit code.
use tracing::Level;

/// A message with a severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub message: String,
}

impl Record {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn trace(message: impl Into<String>) -> Self {
        Self::new(Level::TRACE, message)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Level::DEBUG, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::INFO, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Level::WARN, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::ERROR, message)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Anything that can be added to [Results]
#[derive(Debug)]
pub enum Entry {
    Record(Record),
    Error(anyhow::Error),
    Nested(Results),
}

impl From<Record> for Entry {
    fn from(value: Record) -> Self {
        Entry::Record(value)
    }
}

impl From<anyhow::Error> for Entry {
    fn from(value: anyhow::Error) -> Self {
        Entry::Error(value)
    }
}

impl From<Results> for Entry {
    fn from(value: Results) -> Self {
        Entry::Nested(value)
    }
}

#[derive(Debug)]
pub struct Results {
    level: Level,
    records: Vec<Record>,
    errors: Vec<anyhow::Error>,
}

impl Default for Results {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl Results {
    /// Records less severe than `level` are kept but not rendered
    pub fn new(level: Level) -> Self {
        Self {
            level,
            records: vec![],
            errors: vec![],
        }
    }

    pub fn append(&mut self, entry: impl Into<Entry>) {
        match entry.into() {
            Entry::Record(record) => self.records.push(record),
            Entry::Error(error) => self.errors.push(error),
            Entry::Nested(results) => {
                self.records.extend(results.records);
                self.errors.extend(results.errors);
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &anyhow::Error> {
        self.errors.iter()
    }

    /// Records at or above the configured severity, in insertion order
    pub fn visible_records(&self) -> impl Iterator<Item = &Record> {
        // tracing orders levels by verbosity, ERROR is the smallest
        self.records
            .iter()
            .filter(|record| record.level <= self.level)
    }

    /// Visible records first, then all errors including their causes
    pub fn render(&self) -> String {
        self.visible_records()
            .map(ToString::to_string)
            .chain(self.errors.iter().map(|error| format!("{error:#}")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
