use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use super::*;

/// A set of players encoded as a bitmask: bit `i` is set iff player `i` is a member.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coalition(u32);

/// Anything that names a coalition: a coalition, a single player or a list of players.
#[derive(Clone, Debug, PartialEq)]
pub enum Members {
    Coalition(Coalition),
    Player(Player),
    Players(Vec<Player>),
}

impl Members {
    /// Converts to a coalition, checking every player identifier.
    pub fn into_coalition(self) -> Result<Coalition> {
        match self {
            Members::Coalition(c) => Ok(c),
            Members::Player(p) => Coalition::singleton(p),
            Members::Players(ps) => Coalition::from_players(ps),
        }
    }
}

impl From<Coalition> for Members {
    fn from(c: Coalition) -> Self {
        Members::Coalition(c)
    }
}

impl From<&Coalition> for Members {
    fn from(c: &Coalition) -> Self {
        Members::Coalition(*c)
    }
}

impl From<Player> for Members {
    fn from(p: Player) -> Self {
        Members::Player(p)
    }
}

impl From<Vec<Player>> for Members {
    fn from(ps: Vec<Player>) -> Self {
        Members::Players(ps)
    }
}

impl From<&[Player]> for Members {
    fn from(ps: &[Player]) -> Self {
        Members::Players(ps.to_vec())
    }
}

impl<const N: usize> From<[Player; N]> for Members {
    fn from(ps: [Player; N]) -> Self {
        Members::Players(ps.to_vec())
    }
}

impl Coalition {
    pub const EMPTY: Coalition = Coalition(0);

    fn player_bit(player: Player) -> Result<u32> {
        if player > MAX_PLAYER {
            return Err(GameError::PlayerOutOfRange(player));
        }
        Ok(1 << player)
    }

    /// Wraps a raw bitmask.
    pub const fn from_id(id: u32) -> Self {
        Coalition(id)
    }

    /// The raw bitmask, also the index of the coalition in a value table.
    pub const fn id(&self) -> u32 {
        self.0
    }

    pub fn singleton(player: Player) -> Result<Self> {
        Ok(Coalition(Self::player_bit(player)?))
    }

    /// Builds a coalition from player identifiers; duplicates are collapsed.
    pub fn from_players<I: IntoIterator<Item = Player>>(players: I) -> Result<Self> {
        let mut id = 0;
        for player in players {
            id |= Self::player_bit(player)?;
        }
        Ok(Coalition(id))
    }

    /// The coalition `{0, ..., n - 1}`.
    pub fn grand_coalition(number_of_players: usize) -> Result<Self> {
        if !(MINIMUM_NUMBER_OF_PLAYERS..=MAXIMUM_NUMBER_OF_PLAYERS).contains(&number_of_players) {
            return Err(GameError::PlayerCountOutOfRange(number_of_players));
        }
        Ok(Coalition(u32::MAX >> (MAXIMUM_NUMBER_OF_PLAYERS - number_of_players)))
    }

    /// Every coalition of a game with `number_of_players` players, the empty one first.
    pub fn all_coalitions(number_of_players: usize) -> Result<Subcoalitions> {
        Ok(Self::grand_coalition(number_of_players)?.all_subcoalitions())
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, player: Player) -> bool {
        player <= MAX_PLAYER && self.0 & (1 << player) != 0
    }

    /// Returns `true` if `other` is a subset of `self`.
    pub fn contains_coalition(&self, other: Coalition) -> bool {
        self.0 & other.0 == other.0
    }

    /// Members in ascending order.
    pub fn players(&self) -> Players {
        Players { rest: self.0 }
    }

    /// Every subset of `self` in ascending bitmask order, from the empty coalition to `self`.
    pub fn all_subcoalitions(&self) -> Subcoalitions {
        Subcoalitions {
            mask: self.0,
            next: Some(0),
        }
    }

    /// The coalitions obtained by removing exactly one member.
    pub fn all_one_player_missing_subcoalitions(self) -> impl Iterator<Item = Coalition> {
        self.players().map(move |p| Coalition(self.0 & !(1 << p)))
    }

    pub fn union(&self, other: impl Into<Members>) -> Result<Self> {
        Ok(*self + other.into().into_coalition()?)
    }

    pub fn difference(&self, other: impl Into<Members>) -> Result<Self> {
        Ok(*self - other.into().into_coalition()?)
    }

    pub fn intersection(&self, other: impl Into<Members>) -> Result<Self> {
        Ok(*self * other.into().into_coalition()?)
    }

    pub fn symmetric_difference(&self, other: impl Into<Members>) -> Result<Self> {
        Ok(*self / other.into().into_coalition()?)
    }
}

macro_rules! coalition_operator {
    ($tr:ident, $method:ident, |$a:ident, $b:ident| $body:expr) => {
        impl $tr<Coalition> for Coalition {
            type Output = Coalition;

            fn $method(self, rhs: Coalition) -> Coalition {
                let ($a, $b) = (self.0, rhs.0);
                Coalition($body)
            }
        }

        /// # Panics
        ///
        /// Panics if the player is greater than [`MAX_PLAYER`].
        impl $tr<Player> for Coalition {
            type Output = Coalition;

            fn $method(self, rhs: Player) -> Coalition {
                assert!(rhs <= MAX_PLAYER, "Player number out of range.");
                self.$method(Coalition(1 << rhs))
            }
        }
    };
}

coalition_operator!(Add, add, |a, b| a | b);
coalition_operator!(Sub, sub, |a, b| a & !b);
coalition_operator!(Mul, mul, |a, b| a & b);
coalition_operator!(Div, div, |a, b| a ^ b);

impl fmt::Debug for Coalition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coalition(id={:b})", self.0)
    }
}

impl fmt::Display for Coalition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coalition({:?})", self.players().collect::<Vec<_>>())
    }
}

/// Ascending iterator over the members of a coalition.
#[derive(Clone, Debug)]
pub struct Players {
    rest: u32,
}

impl Iterator for Players {
    type Item = Player;

    fn next(&mut self) -> Option<Player> {
        if self.rest == 0 {
            return None;
        }
        let player = self.rest.trailing_zeros() as Player;
        self.rest &= self.rest - 1;
        Some(player)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rest.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Players {}

/// Ascending iterator over the subsets of a bitmask.
///
/// `(sub - mask) & mask` is the smallest submask greater than `sub`, which
/// wraps back to zero after the full mask has been produced.
#[derive(Clone, Debug)]
pub struct Subcoalitions {
    mask: u32,
    next: Option<u32>,
}

impl Iterator for Subcoalitions {
    type Item = Coalition;

    fn next(&mut self) -> Option<Coalition> {
        let current = self.next?;
        self.next = if current == self.mask {
            None
        } else {
            Some(current.wrapping_sub(self.mask) & self.mask)
        };
        Some(Coalition(current))
    }
}
