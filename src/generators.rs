use log::debug;
use rand::Rng;

use super::*;
use crate::checkers::is_supermodular_table;

/// Whether generated values are whole numbers or carry a fractional part.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ReturnType {
    #[default]
    Float,
    Integer,
}

/// Range of generated values: an integer in `[lower_bound, upper_bound)`,
/// plus a uniform fraction in `[0, 1)` for [`ReturnType::Float`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ValueRange {
    pub return_type: ReturnType,
    pub lower_bound: i64,
    pub upper_bound: i64,
}

impl Default for ValueRange {
    fn default() -> Self {
        ValueRange {
            return_type: ReturnType::Float,
            lower_bound: 0,
            upper_bound: 1,
        }
    }
}

impl ValueRange {
    pub fn new(return_type: ReturnType, lower_bound: i64, upper_bound: i64) -> Self {
        ValueRange {
            return_type,
            lower_bound,
            upper_bound,
        }
    }

    fn check(&self) -> Result<()> {
        if self.lower_bound >= self.upper_bound {
            return Err(GameError::EmptyRange {
                lower: self.lower_bound,
                upper: self.upper_bound,
            });
        }
        Ok(())
    }

    fn check_non_negative(&self) -> Result<()> {
        if self.lower_bound < 0 {
            return Err(GameError::NegativeLowerBound(self.lower_bound));
        }
        self.check()
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        let integer = rng.random_range(self.lower_bound..self.upper_bound) as Value;
        match self.return_type {
            ReturnType::Integer => integer,
            ReturnType::Float => integer + rng.random::<Value>(),
        }
    }
}

/// A single random value from `range`.
pub fn generate_random<R: Rng + ?Sized>(rng: &mut R, range: &ValueRange) -> Result<Value> {
    range.check()?;
    Ok(range.draw(rng))
}

fn check_k(number_of_players: usize, k: usize) -> Result<()> {
    if !(1..=number_of_players).contains(&k) {
        return Err(GameError::KOutOfRange {
            k,
            players: number_of_players,
        });
    }
    Ok(())
}

/// The game `v(S) = Σ_{T ⊆ S} m(T)` whose Möbius coefficients are the values of `unanimity`.
pub fn game_from_unanimity_coefficients(unanimity: &Game) -> Game {
    let mut game = unanimity.clone();
    let values = game.as_mut_slice();
    for player in 0..unanimity.number_of_players() {
        let bit = 1usize << player;
        for id in 0..values.len() {
            if id & bit != 0 {
                values[id] += values[id ^ bit];
            }
        }
    }
    game
}

/// Draws the unanimity coefficients of the coalitions accepted by `filter`, zero elsewhere.
fn unanimity_game<R, F>(number_of_players: usize, rng: &mut R, range: &ValueRange, filter: F) -> Result<Game>
where
    R: Rng + ?Sized,
    F: Fn(Coalition) -> bool,
{
    let mut unanimity = Game::new(number_of_players)?;
    for coalition in unanimity.all_coalitions().skip(1) {
        unanimity[coalition] = if filter(coalition) { range.draw(rng) } else { 0.0 };
    }
    Ok(game_from_unanimity_coefficients(&unanimity))
}

/// Every non-empty coalition gets an independent draw; the empty coalition stays `0.0`.
pub fn random_game_generator<R: Rng + ?Sized>(
    number_of_players: usize,
    rng: &mut R,
    range: &ValueRange,
) -> Result<Game> {
    range.check()?;
    let mut game = Game::new(number_of_players)?;
    for coalition in game.all_coalitions().skip(1) {
        game[coalition] = range.draw(rng);
    }
    Ok(game)
}

/// A game with non-negative Möbius coefficients drawn from `range`.
pub fn positive_game_generator<R: Rng + ?Sized>(
    number_of_players: usize,
    rng: &mut R,
    range: &ValueRange,
) -> Result<Game> {
    range.check_non_negative()?;
    unanimity_game(number_of_players, rng, range, |_| true)
}

/// A game whose Möbius coefficients vanish outside coalitions of size `k`.
pub fn k_game_generator<R: Rng + ?Sized>(
    number_of_players: usize,
    k: usize,
    rng: &mut R,
    range: &ValueRange,
) -> Result<Game> {
    range.check_non_negative()?;
    check_k(number_of_players, k)?;
    unanimity_game(number_of_players, rng, range, |s| s.len() == k)
}

/// A game whose Möbius coefficients vanish on coalitions larger than `k`.
pub fn k_additive_game_generator<R: Rng + ?Sized>(
    number_of_players: usize,
    k: usize,
    rng: &mut R,
    range: &ValueRange,
) -> Result<Game> {
    range.check_non_negative()?;
    check_k(number_of_players, k)?;
    unanimity_game(number_of_players, rng, range, |s| s.len() <= k)
}

/// Source of candidate supermodular tables for [`convex_game_generator`].
pub trait ConvexSampler {
    /// A table of `2^n` values indexed by coalition bitmask, empty coalition first.
    fn sample(&mut self, number_of_players: usize) -> Result<Vec<Value>>;

    /// The sampler's own acceptance test, exact by default.
    fn is_supermodular(&self, values: &[Value], number_of_players: usize) -> bool {
        is_supermodular_table(values, number_of_players, 0.0)
    }
}

/// Stands in for a sampler that is not present on this platform.
#[derive(Copy, Clone, Debug, Default)]
pub struct UnavailableSampler;

impl ConvexSampler for UnavailableSampler {
    fn sample(&mut self, _number_of_players: usize) -> Result<Vec<Value>> {
        Err(GameError::Unavailable("convex game sampler"))
    }
}

/// Samples a positive game plus a convex function of the coalition size.
///
/// Both parts are supermodular, so only rounding can make a sample fail the test.
#[derive(Clone, Debug)]
pub struct CardinalityConvexSampler<R> {
    rng: R,
}

impl<R: Rng> CardinalityConvexSampler<R> {
    pub fn new(rng: R) -> Self {
        CardinalityConvexSampler { rng }
    }
}

impl<R: Rng> ConvexSampler for CardinalityConvexSampler<R> {
    fn sample(&mut self, number_of_players: usize) -> Result<Vec<Value>> {
        let positive = positive_game_generator(number_of_players, &mut self.rng, &ValueRange::default())?;

        // f(0) = 0 and increments that never decrease
        let mut by_size = vec![0.0; number_of_players + 1];
        let mut increment = 0.0;
        for size in 1..=number_of_players {
            increment += self.rng.random::<Value>();
            by_size[size] = by_size[size - 1] + increment;
        }

        Ok(positive
            .values()
            .map(|(coalition, value)| value + by_size[coalition.len()])
            .collect())
    }
}

/// Draws tables from `sampler` until one passes both the sampler's test and [`check_convexity`].
pub fn convex_game_generator(number_of_players: usize, sampler: &mut impl ConvexSampler) -> Result<Game> {
    let mut game = Game::new(number_of_players)?;
    let mut attempts = 0usize;
    loop {
        attempts += 1;
        let values = sampler.sample(number_of_players)?;
        debug_assert_eq!(values.len(), game.as_slice().len());
        if !sampler.is_supermodular(&values, number_of_players) {
            debug!("Sample {attempts} rejected by the sampler");
            continue;
        }
        game.as_mut_slice().copy_from_slice(&values);
        if check_convexity(&game) {
            debug!("Convex game found after {attempts} samples");
            return Ok(game);
        }
        debug!("Sample {attempts} rejected by the convexity check");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn non_empty_values(game: &Game) -> &[Value] {
        &game.as_slice()[1..]
    }

    #[test]
    fn test_generate_random() {
        let mut rng = rng();
        for _ in 0..100 {
            let x = generate_random(&mut rng, &ValueRange::new(ReturnType::Integer, -3, 3)).unwrap();
            assert!((-3.0..3.0).contains(&x) && x.fract() == 0.0);
            let x = generate_random(&mut rng, &ValueRange::new(ReturnType::Float, 2, 4)).unwrap();
            assert!((2.0..5.0).contains(&x));
        }
        assert!(matches!(
            generate_random(&mut rng, &ValueRange::new(ReturnType::Float, 1, 1)),
            Err(GameError::EmptyRange { lower: 1, upper: 1 })
        ));
    }

    #[test]
    fn test_random_game_generator() {
        let mut rng = rng();
        let game = random_game_generator(10, &mut rng, &ValueRange::default()).unwrap();
        assert_eq!(game.get_value(Coalition::EMPTY).unwrap(), 0.0);
        assert!(non_empty_values(&game).iter().all(|v| (0.0..=1.0).contains(v)));

        let range = ValueRange::new(ReturnType::Integer, 0, 10);
        let game = random_game_generator(10, &mut rng, &range).unwrap();
        assert!(non_empty_values(&game).iter().all(|v| (0.0..=10.0).contains(v) && v.fract() == 0.0));

        let range = ValueRange::new(ReturnType::Float, 0, 10);
        let game = random_game_generator(10, &mut rng, &range).unwrap();
        assert!(non_empty_values(&game).iter().all(|v| (0.0..=11.0).contains(v)));

        let range = ValueRange::new(ReturnType::Float, 10, 0);
        assert!(matches!(
            random_game_generator(10, &mut rng, &range),
            Err(GameError::EmptyRange { lower: 10, upper: 0 })
        ));
    }

    #[test]
    fn test_game_from_unanimity_coefficients() {
        let mut unanimity = Game::new(3).unwrap();
        for coalition in unanimity.all_coalitions().skip(1) {
            unanimity[coalition] = if coalition.len() == 2 { 1.0 } else { 0.0 };
        }
        let game = game_from_unanimity_coefficients(&unanimity);
        assert_eq!(game.as_slice(), [0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 3.0]);
        for coalition in game.all_coalitions() {
            assert_eq!(mobius_value(&game, coalition), unanimity[coalition]);
        }
    }

    #[test]
    fn test_positive_game_generator() {
        let mut rng = rng();
        let game = positive_game_generator(5, &mut rng, &ValueRange::default()).unwrap();
        assert!(check_positivity(&game));

        let range = ValueRange::new(ReturnType::Integer, 0, 10);
        let game = positive_game_generator(5, &mut rng, &range).unwrap();
        assert!(non_empty_values(&game).iter().all(|v| v.fract() == 0.0));
        assert!(check_positivity(&game));

        let range = ValueRange::new(ReturnType::Float, -1, 1);
        assert!(matches!(
            positive_game_generator(5, &mut rng, &range),
            Err(GameError::NegativeLowerBound(-1))
        ));
    }

    #[test]
    fn test_k_game_generator() {
        let mut rng = rng();
        let range = ValueRange::new(ReturnType::Integer, 1, 5);
        let game = k_game_generator(4, 2, &mut rng, &range).unwrap();
        assert!(check_k_game(&game, Some(2)).unwrap());
        assert!(check_k_game(&game, None).unwrap());
        assert!(matches!(
            k_game_generator(4, 5, &mut rng, &range),
            Err(GameError::KOutOfRange { k: 5, players: 4 })
        ));
        assert!(matches!(
            k_game_generator(4, 0, &mut rng, &range),
            Err(GameError::KOutOfRange { k: 0, players: 4 })
        ));
        let negative = ValueRange::new(ReturnType::Integer, -1, 5);
        assert!(matches!(
            k_game_generator(4, 7, &mut rng, &negative),
            Err(GameError::NegativeLowerBound(-1))
        ));
    }

    #[test]
    fn test_k_additive_game_generator() {
        let mut rng = rng();
        let game = k_additive_game_generator(5, 2, &mut rng, &ValueRange::default()).unwrap();
        assert!(check_k_additivity(&game, 2).unwrap());
        assert!(check_positivity(&game));
        assert!(k_additive_game_generator(5, 6, &mut rng, &ValueRange::default()).is_err());
    }

    #[test]
    fn test_convex_game_generator() {
        let mut sampler = CardinalityConvexSampler::new(rng());
        for n in 1..=5 {
            let game = convex_game_generator(n, &mut sampler).unwrap();
            assert_eq!(game.number_of_players(), n);
            assert_eq!(game.get_value(Coalition::EMPTY).unwrap(), 0.0);
            assert!(check_convexity(&game));
        }
    }

    #[test]
    fn test_convex_game_generator_unavailable() {
        assert!(matches!(
            convex_game_generator(3, &mut UnavailableSampler),
            Err(GameError::Unavailable(_))
        ));
    }

    /// Alternates a non-convex and a convex table.
    struct Alternating {
        calls: usize,
    }

    impl ConvexSampler for Alternating {
        fn sample(&mut self, _number_of_players: usize) -> Result<Vec<Value>> {
            self.calls += 1;
            Ok(if self.calls % 2 == 1 {
                vec![0.0, 1.0, 1.0, 1.0]
            } else {
                vec![0.0, 0.0, 0.0, 1.0]
            })
        }
    }

    #[test]
    fn test_convex_game_generator_retries() {
        let mut sampler = Alternating { calls: 0 };
        let game = convex_game_generator(2, &mut sampler).unwrap();
        assert_eq!(sampler.calls, 2);
        assert_eq!(game.as_slice(), [0.0, 0.0, 0.0, 1.0]);
    }

    proptest! {
        #[test]
        fn prop_generated_games_belong_to_their_class(seed in any::<u64>(), n in 1usize..6) {
            let mut rng = StdRng::seed_from_u64(seed);
            let range = ValueRange::new(ReturnType::Integer, 0, 10);
            let game = positive_game_generator(n, &mut rng, &range).unwrap();
            prop_assert!(check_positivity(&game));
            prop_assert!(check_convexity(&game));
            prop_assert!(check_superadditivity(&game));
            prop_assert!(check_monotonicity(&game));
            let k = 1 + (seed as usize) % n;
            let game = k_game_generator(n, k, &mut rng, &range).unwrap();
            prop_assert!(check_k_game(&game, Some(k)).unwrap());
            let game = k_additive_game_generator(n, k, &mut rng, &range).unwrap();
            prop_assert!(check_k_additivity(&game, k).unwrap());
        }
    }
}
