use std::fmt;

use log::trace;

use super::*;

/// Classes of the standard hierarchy, strongest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameClass {
    Positive,
    Convex,
    Superadditive,
    WeaklySuperadditive,
    Monotone,
    None,
}

impl fmt::Display for GameClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameClass::Positive => "Positive",
            GameClass::Convex => "Convex",
            GameClass::Superadditive => "Superadditive",
            GameClass::WeaklySuperadditive => "Weakly superadditive",
            GameClass::Monotone => "Monotone",
            GameClass::None => "None",
        };
        f.write_str(label)
    }
}

/// Möbius coefficient `m(S) = Σ_{T ⊆ S} (-1)^{|S| - |T|} v(T)`.
pub fn mobius_value(game: &Game, coalition: Coalition) -> Value {
    let size = coalition.len();
    coalition
        .all_subcoalitions()
        .map(|t| {
            let v = game[t];
            if (size - t.len()) % 2 == 0 { v } else { -v }
        })
        .sum()
}

/// Smallest `k` such that some coalition of size `k` has a non-zero value,
/// or the number of players for the zero game.
fn determine_k_for_k_game(game: &Game) -> usize {
    let n = game.number_of_players();
    (1..=n)
        .find(|&k| game.all_coalitions().any(|s| s.len() == k && game[s] != 0.0))
        .unwrap_or(n)
}

fn check_k(game: &Game, k: usize) -> Result<()> {
    if k == 0 || k > game.number_of_players() {
        return Err(GameError::KOutOfRange {
            k,
            players: game.number_of_players(),
        });
    }
    Ok(())
}

pub fn check_monotonicity(game: &Game) -> bool {
    for s in game.all_coalitions() {
        let value_of_s = game[s];
        for s_minus_one in s.all_one_player_missing_subcoalitions() {
            if value_of_s < game[s_minus_one] {
                trace!("monotonicity violated by {s} and {s_minus_one}");
                return false;
            }
        }
    }
    true
}

pub fn check_weakly_superadditivity(game: &Game) -> bool {
    let grand = game.grand_coalition();
    for i in game.players() {
        let value_of_i = game[Coalition::EMPTY + i];
        for s in (grand - i).all_subcoalitions() {
            if game[s] + value_of_i > game[s + i] {
                trace!("weak superadditivity violated by {s} and player {i}");
                return false;
            }
        }
    }
    true
}

/// Every pair of disjoint coalitions; the partners of `t` are exactly the subsets of its complement.
pub fn check_superadditivity(game: &Game) -> bool {
    let grand = game.grand_coalition();
    for t in game.all_coalitions() {
        let value_of_t = game[t];
        for s in (grand - t).all_subcoalitions() {
            if value_of_t + game[s] > game[t + s] {
                trace!("superadditivity violated by {t} and {s}");
                return false;
            }
        }
    }
    true
}

pub fn check_convexity(game: &Game) -> bool {
    check_convexity_with(game, CONVEXITY_TOLERANCE)
}

/// Convexity with an explicit slack added to the marginal contribution of `j` to `S ∪ {i}`.
pub fn check_convexity_with(game: &Game, tolerance: Value) -> bool {
    is_supermodular_table(game.as_slice(), game.number_of_players(), tolerance)
}

pub fn check_supermodularity(game: &Game) -> bool {
    check_convexity(game)
}

/// Supermodularity of a raw table of `2^n` values indexed by coalition bitmask.
///
/// The condition is symmetric in `i` and `j`, so only `i < j` is visited.
pub(crate) fn is_supermodular_table(values: &[Value], number_of_players: usize, tolerance: Value) -> bool {
    debug_assert_eq!(values.len(), 1usize << number_of_players);
    let grand = Coalition::from_id((values.len() - 1) as u32);
    let v = |c: Coalition| values[c.id() as usize];
    for i in 0..number_of_players.saturating_sub(1) {
        for j in (i + 1)..number_of_players {
            for s in (grand - i - j).all_subcoalitions() {
                if tolerance + v(s + i + j) - v(s + i) < v(s + j) - v(s) {
                    trace!("supermodularity violated by {s} and players {i}, {j}");
                    return false;
                }
            }
        }
    }
    true
}

pub fn check_positivity(game: &Game) -> bool {
    for s in game.all_coalitions() {
        if mobius_value(game, s) < 0.0 {
            trace!("negative Möbius coefficient at {s}");
            return false;
        }
    }
    true
}

/// `k` defaults to the size of the smallest coalition with a non-zero value.
pub fn check_k_game(game: &Game, k: Option<usize>) -> Result<bool> {
    check_k_game_with(game, k, MOBIUS_EPSILON)
}

pub fn check_k_game_with(game: &Game, k: Option<usize>, epsilon: Value) -> Result<bool> {
    let k = k.unwrap_or_else(|| determine_k_for_k_game(game));
    check_k(game, k)?;
    for s in game.all_coalitions().filter(|s| s.len() != k) {
        if s.len() < k {
            if game[s] != 0.0 {
                return Ok(false);
            }
        } else if !(-epsilon..=epsilon).contains(&mobius_value(game, s)) {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn check_k_additivity(game: &Game, k: usize) -> Result<bool> {
    check_k_additivity_with(game, k, MOBIUS_EPSILON)
}

pub fn check_k_additivity_with(game: &Game, k: usize, epsilon: Value) -> Result<bool> {
    check_k(game, k)?;
    Ok(game
        .all_coalitions()
        .filter(|s| s.len() > k)
        .all(|s| (-epsilon..=epsilon).contains(&mobius_value(game, s))))
}

/// The strongest class of the hierarchy the game belongs to.
pub fn determine_class(game: &Game) -> GameClass {
    let checks: [(GameClass, fn(&Game) -> bool); 5] = [
        (GameClass::Positive, check_positivity),
        (GameClass::Convex, check_convexity),
        (GameClass::Superadditive, check_superadditivity),
        (GameClass::WeaklySuperadditive, check_weakly_superadditivity),
        (GameClass::Monotone, check_monotonicity),
    ];
    checks
        .into_iter()
        .find(|(_, check)| check(game))
        .map_or(GameClass::None, |(class, _)| class)
}
