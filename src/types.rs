/// Player identifier, a bit position in a [`crate::Coalition`].
pub type Player = usize;
/// Worth of a coalition. `NaN` marks a value that was never set.
pub type Value = f64;

/// Smallest allowed player identifier.
pub const MIN_PLAYER: Player = 0;
/// Largest allowed player identifier.
pub const MAX_PLAYER: Player = 31;
/// Smallest allowed number of players in a game.
pub const MINIMUM_NUMBER_OF_PLAYERS: usize = 1;
/// Largest allowed number of players in a game.
pub const MAXIMUM_NUMBER_OF_PLAYERS: usize = 32;

/// Value substituted for unset coalitions by solution concepts.
pub const DEFAULT_VALUE: Value = 0.0;
/// Slack added to the larger marginal contribution in the convexity check.
pub const CONVEXITY_TOLERANCE: Value = 1e-5;
/// Band around zero accepted for Möbius coefficients in k-game checks.
pub const MOBIUS_EPSILON: Value = 1e-10;

/// Result of an allocation rule: one player's share or the whole payoff vector.
#[derive(Clone, Debug, PartialEq)]
pub enum Allocation {
    Player(Value),
    Game(Vec<Value>),
}
