use super::*;
use crate::default_value::ValueLookup;

fn factorial(n: usize) -> Value {
    (1..=n).map(|k| k as Value).product()
}

/// Weight `s! (n - s - 1)!` of a coalition of size `s` not containing the player.
fn weights(number_of_players: usize) -> Vec<Value> {
    (0..number_of_players)
        .map(|s| factorial(s) * factorial(number_of_players - s - 1))
        .collect()
}

fn shapley_value_with(lookup: &ValueLookup, player: Player, weights: &[Value], n_fac: Value) -> Value {
    lookup
        .marginal_contributions(player)
        .map(|(s, contribution)| contribution * weights[s.len()])
        .sum::<Value>()
        / n_fac
}

pub fn shapley_value_of_player(game: &Game, player: Player, default: impl Into<DefaultValue>) -> Result<Value> {
    game.check_player(player)?;
    let n = game.number_of_players();
    let lookup = ValueLookup::new(game, default.into());
    Ok(shapley_value_with(&lookup, player, &weights(n), factorial(n)))
}

/// The payoff vector, computed lazily one player at a time in increasing player order.
pub fn shapley_value_of_game(game: &Game, default: impl Into<DefaultValue>) -> impl Iterator<Item = Value> + '_ {
    let n = game.number_of_players();
    let (weights, n_fac) = (weights(n), factorial(n));
    let lookup = ValueLookup::new(game, default.into());
    game.players()
        .map(move |player| shapley_value_with(&lookup, player, &weights, n_fac))
}

/// Shapley value of `player`, or of every player when `player` is `None`.
pub fn shapley(game: &Game, player: Option<Player>, default: impl Into<DefaultValue>) -> Result<Allocation> {
    match player {
        Some(player) => shapley_value_of_player(game, player, default).map(Allocation::Player),
        None => Ok(Allocation::Game(shapley_value_of_game(game, default).collect())),
    }
}
