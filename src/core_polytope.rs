use grid::*;
use num_traits::{One, Zero};

use super::*;
use crate::default_value::ValueLookup;
use crate::polyhedron::{Rational, to_value};

/// Total payoff of the members of `coalition`.
pub fn payoff(coalition: Coalition, payoff_vector: &[Value]) -> Result<Value> {
    if let Some(last) = coalition.players().last()
        && last >= payoff_vector.len()
    {
        return Err(GameError::PayoffLength {
            expected: last + 1,
            found: payoff_vector.len(),
        });
    }
    Ok(members_payoff(coalition, payoff_vector))
}

fn members_payoff(coalition: Coalition, payoff_vector: &[Value]) -> Value {
    coalition.players().map(|player| payoff_vector[player]).sum()
}

fn check_payoff_length(game: &Game, payoff_vector: &[Value]) -> Result<()> {
    if payoff_vector.len() != game.number_of_players() {
        return Err(GameError::PayoffLength {
            expected: game.number_of_players(),
            found: payoff_vector.len(),
        });
    }
    Ok(())
}

/// Tests whether `payoff_vector` is efficient and coalitionally rational.
///
/// Efficiency is an exact comparison against the stored grand coalition value;
/// unset coalitions are filled according to `default` for the rationality constraints.
pub fn solution_in_core(game: &Game, payoff_vector: &[Value], default: impl Into<DefaultValue>) -> Result<bool> {
    check_payoff_length(game, payoff_vector)?;
    let grand = game.grand_coalition();
    if members_payoff(grand, payoff_vector) != game[grand] {
        return Ok(false);
    }
    let lookup = ValueLookup::new(game, default.into());
    Ok(game
        .all_coalitions()
        .all(|coalition| members_payoff(coalition, payoff_vector) >= lookup.get(coalition)))
}

/// The core as an exact polyhedron: one inequality `x(S) >= v(S)` per coalition
/// and the efficiency equality `x(N) = v(N)`.
pub fn core_polyhedron(game: &Game, default: impl Into<DefaultValue>) -> Result<Polyhedron> {
    let n = game.number_of_players();
    let lookup = ValueLookup::new(game, default.into());
    let exact = |coalition: Coalition| {
        Rational::from_float(lookup.get(coalition)).ok_or(GameError::NonFiniteValue(coalition))
    };

    let coalitions = game.all_coalitions().collect::<Vec<_>>();
    let mut inequalities = Grid::init(coalitions.len(), n, Rational::zero());
    let mut bounds = Vec::with_capacity(coalitions.len());
    for (row, &coalition) in coalitions.iter().enumerate() {
        for player in coalition.players() {
            inequalities[(row, player)] = Rational::one();
        }
        bounds.push(exact(coalition)?);
    }
    let equalities = Grid::init(1, n, Rational::one());
    let efficiency = vec![exact(game.grand_coalition())?];
    Ok(Polyhedron::new(n, inequalities, bounds, equalities, efficiency))
}

pub fn core_is_empty(
    game: &Game,
    backend: &impl PolyhedronBackend,
    default: impl Into<DefaultValue>,
) -> Result<bool> {
    backend.is_empty(&core_polyhedron(game, default)?)
}

/// Vertices of the core in lexicographic order.
pub fn core_vertices(
    game: &Game,
    backend: &impl PolyhedronBackend,
    default: impl Into<DefaultValue>,
) -> Result<Vec<Vec<Value>>> {
    let mut vertices = backend.vertices(&core_polyhedron(game, default)?)?;
    vertices.sort();
    Ok(vertices
        .iter()
        .map(|vertex| vertex.iter().map(to_value).collect())
        .collect())
}

pub fn core_contains_integer_point(
    game: &Game,
    backend: &impl PolyhedronBackend,
    default: impl Into<DefaultValue>,
) -> Result<bool> {
    backend.contains_integer_point(&core_polyhedron(game, default)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static SPLIT: LazyLock<Game> = LazyLock::new(|| {
        let mut game = Game::new(2).unwrap();
        game.set_values([(vec![0usize], 0.0), (vec![1], 0.0), (vec![0, 1], 1.0)]).unwrap();
        game
    });

    static SQUARE: LazyLock<Game> = LazyLock::new(|| {
        let mut game = Game::new(3).unwrap();
        for coalition in game.all_coalitions() {
            game[coalition] = (coalition.len() * coalition.len()) as Value;
        }
        game
    });

    static MAJORITY: LazyLock<Game> = LazyLock::new(|| {
        let mut game = Game::new(3).unwrap();
        for coalition in game.all_coalitions() {
            game[coalition] = if coalition.len() >= 2 { 1.0 } else { 0.0 };
        }
        game
    });

    #[test]
    fn test_payoff() {
        assert_eq!(payoff(Coalition::from_players([0]).unwrap(), &[1.0, 2.0]).unwrap(), 1.0);
        assert_eq!(payoff(Coalition::from_players([1]).unwrap(), &[1.0, 2.0]).unwrap(), 2.0);
        assert_eq!(payoff(Coalition::from_players([0, 1]).unwrap(), &[1.0, 2.0]).unwrap(), 3.0);
        assert_eq!(payoff(Coalition::EMPTY, &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_payoff_of_missing_player() {
        assert!(matches!(
            payoff(Coalition::from_players([0, 2]).unwrap(), &[1.0, 2.0]),
            Err(GameError::PayoffLength { expected: 3, found: 2 })
        ));
        assert!(matches!(
            payoff(Coalition::from_players([0]).unwrap(), &[]),
            Err(GameError::PayoffLength { expected: 1, found: 0 })
        ));
    }

    #[test]
    fn test_solution_in_core() {
        assert!(solution_in_core(&SPLIT, &[0.5, 0.5], DefaultValue::Implicit).unwrap());
        assert!(!solution_in_core(&SPLIT, &[0.5, 0.4], DefaultValue::Implicit).unwrap());
        assert!(!solution_in_core(&SPLIT, &[1.0, 5.0], DefaultValue::Implicit).unwrap());
        assert!(matches!(
            solution_in_core(&SPLIT, &[1.0], DefaultValue::Implicit),
            Err(GameError::PayoffLength { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_solution_in_core_with_default_value() {
        let mut game = Game::new(2).unwrap();
        game.set_value(vec![0usize, 1], 1.0).unwrap();
        assert!(solution_in_core(&game, &[0.5, 0.5], DefaultValue::Implicit).unwrap());
        assert!(!solution_in_core(&game, &[0.5, 0.5], 0.6).unwrap());
        assert!(solution_in_core(&game, &[0.5, 0.5], 0.5).unwrap());
    }

    #[test]
    fn test_core_polyhedron() {
        let polyhedron = core_polyhedron(&SPLIT, DefaultValue::Implicit).unwrap();
        assert_eq!(polyhedron.dimension(), 2);
        let (a, b) = polyhedron.inequalities();
        assert_eq!(a.rows(), 4);
        assert_eq!(b.len(), 4);
        assert_eq!(b[3], Rational::one());
        assert!(a.iter_row(0).all(|x| x.is_zero()));
        let (e, f) = polyhedron.equalities();
        assert_eq!(e.rows(), 1);
        assert_eq!(f, [Rational::one()]);

        let mut game = Game::new(1).unwrap();
        game.set_value(0usize, Value::INFINITY).unwrap();
        assert!(matches!(
            core_polyhedron(&game, DefaultValue::Implicit),
            Err(GameError::NonFiniteValue(_))
        ));
    }

    #[test]
    fn test_core_vertices() {
        assert_eq!(
            core_vertices(&SPLIT, &ExactBackend, DefaultValue::Implicit).unwrap(),
            [vec![0.0, 1.0], vec![1.0, 0.0]]
        );
        let vertices = core_vertices(&SQUARE, &ExactBackend, DefaultValue::Implicit).unwrap();
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0], [1.0, 3.0, 5.0]);
        assert!(vertices.iter().all(|v| v.iter().sum::<Value>() == 9.0));
        assert!(vertices.iter().all(|v| solution_in_core(&SQUARE, v, DefaultValue::Implicit).unwrap()));
    }

    #[test]
    fn test_core_is_empty() {
        assert!(!core_is_empty(&SPLIT, &ExactBackend, DefaultValue::Implicit).unwrap());
        assert!(!core_is_empty(&SQUARE, &ExactBackend, DefaultValue::Implicit).unwrap());
        assert!(core_is_empty(&MAJORITY, &ExactBackend, DefaultValue::Implicit).unwrap());
    }

    #[test]
    fn test_core_contains_integer_point() {
        assert!(core_contains_integer_point(&SPLIT, &ExactBackend, DefaultValue::Implicit).unwrap());
        assert!(!core_contains_integer_point(&MAJORITY, &ExactBackend, DefaultValue::Implicit).unwrap());
        let mut game = Game::new(2).unwrap();
        game.set_values([(vec![0usize], 0.5), (vec![1], 0.5), (vec![0, 1], 1.0)]).unwrap();
        assert_eq!(
            core_vertices(&game, &ExactBackend, DefaultValue::Implicit).unwrap(),
            [vec![0.5, 0.5]]
        );
        assert!(!core_contains_integer_point(&game, &ExactBackend, DefaultValue::Implicit).unwrap());
    }

    fn by_size(number_of_players: usize, value: impl Fn(usize) -> Value) -> Game {
        let mut game = Game::new(number_of_players).unwrap();
        for coalition in game.all_coalitions() {
            game[coalition] = value(coalition.len());
        }
        game
    }

    #[test]
    fn test_core_of_larger_games() {
        // v(S) = |S|^2 is strictly convex: every marginal vector is a distinct vertex
        let square = by_size(5, |s| (s * s) as Value);
        let vertices = core_vertices(&square, &ExactBackend, DefaultValue::Implicit).unwrap();
        assert_eq!(vertices.len(), 120);
        assert_eq!(vertices[0], [1.0, 3.0, 5.0, 7.0, 9.0]);
        assert!(vertices.iter().all(|v| solution_in_core(&square, v, DefaultValue::Implicit).unwrap()));

        for n in [6, 7] {
            let square = by_size(n, |s| (s * s) as Value);
            assert!(!core_is_empty(&square, &ExactBackend, DefaultValue::Implicit).unwrap());
            let majority = by_size(n, |s| if 2 * s > n { 1.0 } else { 0.0 });
            assert!(core_is_empty(&majority, &ExactBackend, DefaultValue::Implicit).unwrap());
        }
    }

    #[test]
    fn test_integer_search_with_large_values() {
        let scale = 1e6;
        // x0 + x1 = scale + 1/2 over the non-negative quadrant
        let mut game = Game::new(2).unwrap();
        game.set_values([(vec![0usize], 0.0), (vec![1], 0.0), (vec![0, 1], scale + 0.5)]).unwrap();
        assert!(!core_is_empty(&game, &ExactBackend, DefaultValue::Implicit).unwrap());
        assert!(!core_contains_integer_point(&game, &ExactBackend, DefaultValue::Implicit).unwrap());

        // x0 is pinned to scale + 1/2 while x1 + x2 ranges over a long segment
        let mut game = Game::new(3).unwrap();
        game.set_values([
            (vec![0usize], scale + 0.5),
            (vec![1], 0.0),
            (vec![2], 0.0),
            (vec![0, 1], 0.0),
            (vec![0, 2], 0.0),
            (vec![1, 2], scale + 0.5),
            (vec![0, 1, 2], 2.0 * scale + 1.0),
        ])
        .unwrap();
        assert!(!core_is_empty(&game, &ExactBackend, DefaultValue::Implicit).unwrap());
        assert!(!core_contains_integer_point(&game, &ExactBackend, DefaultValue::Implicit).unwrap());

        let mut game = by_size(3, |s| if s == 3 { 3.0 * scale } else { 0.0 });
        assert!(core_contains_integer_point(&game, &ExactBackend, DefaultValue::Implicit).unwrap());
        game.set_value(vec![0usize, 1, 2], 3.0 * scale + 0.25).unwrap();
        assert!(!core_contains_integer_point(&game, &ExactBackend, DefaultValue::Implicit).unwrap());
    }

    #[test]
    fn test_unavailable_backend() {
        assert!(matches!(
            core_is_empty(&SPLIT, &UnavailableBackend, DefaultValue::Implicit),
            Err(GameError::Unavailable(_))
        ));
        assert!(matches!(
            core_vertices(&SPLIT, &UnavailableBackend, DefaultValue::Implicit),
            Err(GameError::Unavailable(_))
        ));
        assert!(matches!(
            core_contains_integer_point(&SPLIT, &UnavailableBackend, DefaultValue::Implicit),
            Err(GameError::Unavailable(_))
        ));
        assert!(solution_in_core(&SPLIT, &[0.5, 0.5], DefaultValue::Implicit).unwrap());
    }
}
