use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::*;

/// Separators of the CSV game format: `n:3` and `0,2:5.0` with the defaults.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CsvFormat {
    pub field_separator: char,
    pub coalition_separator: char,
}

impl Default for CsvFormat {
    fn default() -> Self {
        CsvFormat {
            field_separator: ':',
            coalition_separator: ',',
        }
    }
}

impl CsvFormat {
    pub fn new(field_separator: char, coalition_separator: char) -> Result<Self> {
        let format = CsvFormat {
            field_separator,
            coalition_separator,
        };
        format.check()?;
        Ok(format)
    }

    fn check(&self) -> Result<()> {
        if self.field_separator == self.coalition_separator {
            return Err(GameError::SameSeparators(self.field_separator));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredGame {
    n: Option<usize>,
    #[serde(default, with = "values_serde")]
    values: BTreeMap<String, Value>,
}

/// JSON numbers cannot be infinite, so `±inf` is stored as the string `"inf"` or `"-inf"`.
mod values_serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    use crate::Value;

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum StoredValue {
        Number(Value),
        Named(String),
    }

    pub fn serialize<S>(values: &BTreeMap<String, Value>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        values
            .iter()
            .map(|(key, &value)| {
                let stored = if value.is_finite() {
                    StoredValue::Number(value)
                } else {
                    StoredValue::Named(value.to_string())
                };
                (key, stored)
            })
            .collect::<BTreeMap<_, _>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, StoredValue>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, stored)| match stored {
                StoredValue::Number(value) => Ok((key, value)),
                StoredValue::Named(name) => match name.parse::<Value>() {
                    Ok(value) => Ok((key, value)),
                    Err(_) => Err(D::Error::custom(format!("invalid value {name:?} for key {key}"))),
                },
            })
            .collect()
    }
}

fn players_key(coalition: Coalition) -> String {
    format!("{:?}", coalition.players().collect::<Vec<_>>())
}

/// Set values only, the empty coalition included.
fn set_values(game: &Game) -> impl Iterator<Item = (Coalition, Value)> + '_ {
    game.values().filter(|(_, value)| !value.is_nan())
}

pub fn load_game_from_json_str(json: &str) -> Result<Game> {
    let stored: StoredGame = serde_json::from_str(json)?;
    let n = stored.n.ok_or(GameError::MissingPlayerCount)?;
    let mut game = Game::new(n)?;
    for (key, value) in stored.values {
        let players: Vec<Player> = serde_json::from_str(&key).map_err(|_| GameError::InvalidKey(key.clone()))?;
        game.set_value(players, value)?;
    }
    Ok(game)
}

pub fn load_game_from_json(path: impl AsRef<Path>) -> Result<Game> {
    let path = path.as_ref();
    let game = load_game_from_json_str(&fs::read_to_string(path)?)?;
    debug!("Loaded a game of {} players from {}", game.number_of_players(), path.display());
    Ok(game)
}

pub fn save_game_to_json_string(game: &Game) -> Result<String> {
    let stored = StoredGame {
        n: Some(game.number_of_players()),
        values: set_values(game).map(|(c, v)| (players_key(c), v)).collect(),
    };
    Ok(serde_json::to_string_pretty(&stored)?)
}

pub fn save_game_to_json(game: &Game, path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, save_game_to_json_string(game)?)?;
    Ok(())
}

/// Reads rows `n<fs><count>` and `<players joined by cs><fs><value>`, in any order.
pub fn load_game_from_csv_str(csv: &str, format: &CsvFormat) -> Result<Game> {
    format.check()?;
    let mut number_of_players = None;
    let mut rows = Vec::new();
    for (index, line) in csv.lines().enumerate() {
        let line_number = index + 1;
        let malformed = |reason: &str| GameError::Malformed {
            line: line_number,
            reason: reason.to_string(),
        };
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split(format.field_separator);
        let (Some(first), Some(second), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(malformed("expected exactly two fields"));
        };
        let (first, second) = (first.trim(), second.trim());
        if first == "n" {
            number_of_players = Some(second.parse::<usize>().map_err(|e| malformed(&e.to_string()))?);
            continue;
        }
        let players = if first.is_empty() {
            Vec::new()
        } else {
            first
                .split(format.coalition_separator)
                .map(|p| p.trim().parse::<Player>().map_err(|e| malformed(&e.to_string())))
                .collect::<Result<Vec<_>>>()?
        };
        let value = second.parse::<Value>().map_err(|e| malformed(&e.to_string()))?;
        rows.push((players, value));
    }
    let mut game = Game::new(number_of_players.ok_or(GameError::MissingPlayerCount)?)?;
    game.set_values(rows)?;
    Ok(game)
}

pub fn load_game_from_csv(path: impl AsRef<Path>, format: &CsvFormat) -> Result<Game> {
    let path = path.as_ref();
    let game = load_game_from_csv_str(&fs::read_to_string(path)?, format)?;
    debug!("Loaded a game of {} players from {}", game.number_of_players(), path.display());
    Ok(game)
}

pub fn save_game_to_csv_string(game: &Game, format: &CsvFormat) -> Result<String> {
    format.check()?;
    let field = format.field_separator;
    let cs = format.coalition_separator.to_string();
    let mut csv = format!("n{field}{}\n", game.number_of_players());
    for (coalition, value) in set_values(game) {
        let players = coalition
            .players()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(cs.as_str());
        csv.push_str(&format!("{players}{field}{value}\n"));
    }
    Ok(csv)
}

pub fn save_game_to_csv(game: &Game, path: impl AsRef<Path>, format: &CsvFormat) -> Result<()> {
    fs::write(path, save_game_to_csv_string(game, format)?)?;
    Ok(())
}
