use std::fmt;
use std::ops::{Index, IndexMut};

use super::*;

/// A characteristic function stored as a dense table of `2^n` values indexed by coalition.
///
/// Unset coalitions hold `NaN`; the empty coalition is always worth `0.0`
/// right after construction.
#[derive(Clone, Debug)]
pub struct Game {
    number_of_players: usize,
    values: Vec<Value>,
}

impl Game {
    pub fn new(number_of_players: usize) -> Result<Self> {
        let grand = Coalition::grand_coalition(number_of_players)?;
        let mut game = Game {
            number_of_players,
            values: vec![Value::NAN; grand.id() as usize + 1],
        };
        game.init_values();
        Ok(game)
    }

    fn init_values(&mut self) {
        self.values.fill(Value::NAN);
        self[Coalition::EMPTY] = 0.0;
    }

    pub fn number_of_players(&self) -> usize {
        self.number_of_players
    }

    pub fn grand_coalition(&self) -> Coalition {
        Coalition::from_id((self.values.len() - 1) as u32)
    }

    pub fn players(&self) -> std::ops::Range<Player> {
        0..self.number_of_players
    }

    /// Every coalition of the game in ascending bitmask order, empty coalition first.
    pub fn all_coalitions(&self) -> Subcoalitions {
        self.grand_coalition().all_subcoalitions()
    }

    /// Normalizes `members` and checks that it only names players of this game.
    pub fn coalition(&self, members: impl Into<Members>) -> Result<Coalition> {
        let coalition = members.into().into_coalition()?;
        if !self.grand_coalition().contains_coalition(coalition) {
            return Err(GameError::CoalitionOutOfRange {
                coalition,
                players: self.number_of_players,
            });
        }
        Ok(coalition)
    }

    pub(crate) fn check_player(&self, player: Player) -> Result<()> {
        if player >= self.number_of_players {
            return Err(GameError::PlayerOutOfRange(player));
        }
        Ok(())
    }

    pub fn set_value(&mut self, coalition: impl Into<Members>, value: Value) -> Result<()> {
        let coalition = self.coalition(coalition)?;
        self[coalition] = value;
        Ok(())
    }

    /// Writes every pair in order; a later pair overwrites an earlier one for the same coalition.
    pub fn set_values<M, I>(&mut self, values: I) -> Result<()>
    where
        M: Into<Members>,
        I: IntoIterator<Item = (M, Value)>,
    {
        for (coalition, value) in values {
            self.set_value(coalition, value)?;
        }
        Ok(())
    }

    /// The value of a coalition, `NaN` if it was never set.
    pub fn get_value(&self, coalition: impl Into<Members>) -> Result<Value> {
        Ok(self[self.coalition(coalition)?])
    }

    /// Values of the requested coalitions in input order.
    ///
    /// All inputs are validated before anything is returned.
    pub fn get_values<M, I>(&self, coalitions: I) -> Result<Vec<(Coalition, Value)>>
    where
        M: Into<Members>,
        I: IntoIterator<Item = M>,
    {
        coalitions
            .into_iter()
            .map(|c| self.coalition(c).map(|c| (c, self[c])))
            .collect()
    }

    /// Every `(coalition, value)` pair in ascending bitmask order.
    pub fn values(&self) -> impl Iterator<Item = (Coalition, Value)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(id, &v)| (Coalition::from_id(id as u32), v))
    }

    pub fn is_set(&self, coalition: Coalition) -> bool {
        !self[coalition].is_nan()
    }

    /// The raw table, indexed by coalition bitmask.
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Value] {
        &mut self.values
    }
}

impl Index<Coalition> for Game {
    type Output = Value;

    fn index(&self, coalition: Coalition) -> &Self::Output {
        debug_assert!(
            self.grand_coalition().contains_coalition(coalition),
            "Coalition out of range."
        );
        &self.values[coalition.id() as usize]
    }
}

impl IndexMut<Coalition> for Game {
    fn index_mut(&mut self, coalition: Coalition) -> &mut Self::Output {
        debug_assert!(
            self.grand_coalition().contains_coalition(coalition),
            "Coalition out of range."
        );
        &mut self.values[coalition.id() as usize]
    }
}

/// Two games are equal when they have the same players and the same table,
/// where two unset entries at the same coalition are considered equal.
impl PartialEq for Game {
    fn eq(&self, other: &Self) -> bool {
        self.number_of_players == other.number_of_players
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Game(number_of_players={},", self.number_of_players)?;
        for (coalition, value) in self.values() {
            write!(f, "\n\t{coalition}: {value:?},")?;
        }
        write!(f, "\n)")
    }
}
