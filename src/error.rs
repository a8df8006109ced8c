use thiserror::Error;

/// Input the splitter cannot work with.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChapterizeError {
    #[error("No chapter format found (第X章 or Chương + number)")]
    NoChapterMarkers,

    #[error("Characters/words per part must be a positive number")]
    InvalidSplitLength,
}

/// Failures talking to the chat-completions API.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API Error: {0}")]
    Api(String),

    #[error("API returned no choices")]
    EmptyResponse,

    #[error("{0}")]
    MissingField(&'static str),
}

/// The splitter could not produce chunks. Carries the server-reported message.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// A single chunk could not be processed. Carries the server-reported message.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("A request is already being processed. Please wait.")]
    AlreadyProcessing,

    #[error("Errors:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("Error splitting text: {0}")]
    Split(#[from] SplitError),

    #[error("No chapters found after splitting")]
    EmptyChunkSet,

    #[error("Error processing part {part}: {source}")]
    Process {
        part: usize,
        #[source]
        source: ProcessError,
    },

    #[error("No results available to load.")]
    NoResults,
}
