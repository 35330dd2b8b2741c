use super::*;

/// Divides every value, the empty coalition included, by the current value of the grand coalition.
///
/// The game is not checked for being normalized already. A second pass divides by
/// `v(N) = 1` and changes nothing, unless the first pass was degenerate (`v(N)` zero or
/// not finite), in which case every value ends up `NaN`.
pub fn standard_normalization(game: &mut Game) {
    let grand = game[game.grand_coalition()];
    for value in game.as_mut_slice() {
        *value /= grand;
    }
}

/// Removes the additive part `Σ_{i ∈ S} v({i})` from every coalition, then applies
/// [`standard_normalization`], so that singletons are worth `0` and the grand coalition `1`.
pub fn zero_one_normalization(game: &mut Game) {
    let singletons = game
        .players()
        .map(|player| game[Coalition::from_id(1 << player)])
        .collect::<Vec<_>>();
    for coalition in game.all_coalitions() {
        let additive: Value = coalition.players().map(|player| singletons[player]).sum();
        game[coalition] -= additive;
    }
    standard_normalization(game);
}
