//! Coalitional games with transferable utility.
//!
//! Coalitions combine with `+` (union), `-` (difference), `*` (intersection) and `/`
//! (symmetric difference). The right operand is another [`Coalition`] or a single
//! [`Player`], and a player above [`MAX_PLAYER`] makes the operator panic. The named
//! methods [`Coalition::union`], [`Coalition::difference`], [`Coalition::intersection`]
//! and [`Coalition::symmetric_difference`] accept any [`Members`] and report
//! [`GameError::PlayerOutOfRange`] instead.

mod types;
mod error;
mod coalition;
mod game;
mod checkers;
mod default_value;
mod shapley;
mod banzhaf;
mod polyhedron;
mod core_polytope;
mod generators;
mod normalization;
mod storage;

pub use types::*;
pub use error::{GameError, Result};
pub use coalition::{Coalition, Members, Players, Subcoalitions};
pub use game::Game;
pub use checkers::{
    GameClass, check_convexity, check_convexity_with, check_k_additivity, check_k_additivity_with, check_k_game,
    check_k_game_with, check_monotonicity, check_positivity, check_superadditivity, check_supermodularity,
    check_weakly_superadditivity, determine_class, mobius_value,
};
pub use default_value::DefaultValue;
pub use shapley::{shapley, shapley_value_of_game, shapley_value_of_player};
pub use banzhaf::{banzhaf, banzhaf_value_of_game, banzhaf_value_of_player};
pub use polyhedron::{ExactBackend, Polyhedron, PolyhedronBackend, Rational, UnavailableBackend};
pub use core_polytope::{
    core_contains_integer_point, core_is_empty, core_polyhedron, core_vertices, payoff, solution_in_core,
};
pub use generators::{
    CardinalityConvexSampler, ConvexSampler, ReturnType, UnavailableSampler, ValueRange, convex_game_generator,
    game_from_unanimity_coefficients, generate_random, k_additive_game_generator, k_game_generator,
    positive_game_generator, random_game_generator,
};
pub use normalization::{standard_normalization, zero_one_normalization};
pub use storage::{
    CsvFormat, load_game_from_csv, load_game_from_csv_str, load_game_from_json, load_game_from_json_str,
    save_game_to_csv, save_game_to_csv_string, save_game_to_json, save_game_to_json_string,
};
