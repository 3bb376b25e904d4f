use thiserror::Error;

/// Failures the dashboard can surface while turning the two sheets into a gameweek.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("{what} unavailable: {reason}")]
    Unavailable { what: &'static str, reason: String },

    #[error("{table} table is missing required column `{column}`")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("no current round: fixture table has no selectable round")]
    NoCurrentRound,
}

impl DataError {
    pub fn unavailable(what: &'static str, err: impl std::fmt::Display) -> Self {
        DataError::Unavailable {
            what,
            reason: err.to_string(),
        }
    }
}

pub type DataResult<T> = std::result::Result<T, DataError>;
