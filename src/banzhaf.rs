use super::*;
use crate::default_value::ValueLookup;

fn banzhaf_value_with(lookup: &ValueLookup, player: Player) -> Value {
    let n = lookup.game().number_of_players();
    let total: Value = lookup
        .marginal_contributions(player)
        .map(|(_, contribution)| contribution)
        .sum();
    total / (2.0 as Value).powi(n as i32 - 1)
}

pub fn banzhaf_value_of_player(game: &Game, player: Player, default: impl Into<DefaultValue>) -> Result<Value> {
    game.check_player(player)?;
    let lookup = ValueLookup::new(game, default.into());
    Ok(banzhaf_value_with(&lookup, player))
}

/// The Banzhaf payoff vector, lazily, in increasing player order.
pub fn banzhaf_value_of_game(game: &Game, default: impl Into<DefaultValue>) -> impl Iterator<Item = Value> + '_ {
    let lookup = ValueLookup::new(game, default.into());
    game.players().map(move |player| banzhaf_value_with(&lookup, player))
}

pub fn banzhaf(game: &Game, player: Option<Player>, default: impl Into<DefaultValue>) -> Result<Allocation> {
    match player {
        Some(player) => banzhaf_value_of_player(game, player, default).map(Allocation::Player),
        None => Ok(Allocation::Game(banzhaf_value_of_game(game, default).collect())),
    }
}
