use super::*;

/// Everything that can go wrong while building, querying or persisting games.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Player {0} is out of range")]
    PlayerOutOfRange(Player),
    #[error("Number of players must be between 1 and 32, got {0}")]
    PlayerCountOutOfRange(usize),
    #[error("{coalition} is not a coalition of a game with {players} players")]
    CoalitionOutOfRange { coalition: Coalition, players: usize },
    #[error("Parameter k must be between 1 and {players}, got {k}")]
    KOutOfRange { k: usize, players: usize },
    #[error("Lower bound must be non-negative, got {0}")]
    NegativeLowerBound(i64),
    #[error("Cannot draw from the empty range [{lower}, {upper})")]
    EmptyRange { lower: i64, upper: i64 },
    #[error("Payoff vector has {found} entries, expected {expected}")]
    PayoffLength { expected: usize, found: usize },
    #[error("Field separator and coalition separator cannot be the same ('{0}')")]
    SameSeparators(char),
    #[error("The file does not contain the number of players")]
    MissingPlayerCount,
    #[error("Malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("Cannot read a list of players from key {0:?}")]
    InvalidKey(String),
    #[error("Value of {0} is not a finite number")]
    NonFiniteValue(Coalition),
    #[error("Polyhedron contains a line and has no vertices")]
    NotPointed,
    #[error("Polyhedron is unbounded")]
    Unbounded,
    #[error("{0} is not available")]
    Unavailable(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
