use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use log::{error, info};
use tugames::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Csv,
}

/// Analyse a coalitional game stored on disk
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Game file
    path: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Separates the coalition from its value in CSV files
    #[arg(long, default_value_t = ':')]
    field_separator: char,

    /// Separates players inside a coalition in CSV files
    #[arg(long, default_value_t = ',')]
    coalition_separator: char,

    /// Only report the values of this player
    #[arg(short, long)]
    player: Option<Player>,

    /// Value of unset coalitions, used without warning
    #[arg(short, long)]
    default_value: Option<Value>,

    /// Payoff vector to test for core membership, e.g. 0.5,0.5
    #[arg(long, value_delimiter = ',')]
    payoff: Option<Vec<Value>>,

    /// Enumerate the vertices of the core
    #[arg(long)]
    vertices: bool,
}

fn allocation_to_string(allocation: &Allocation) -> String {
    match allocation {
        Allocation::Player(value) => value.to_string(),
        Allocation::Game(values) => format!("{values:?}"),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let game = match cli.format {
        Format::Json => load_game_from_json(&cli.path)?,
        Format::Csv => {
            let format = CsvFormat::new(cli.field_separator, cli.coalition_separator)?;
            load_game_from_csv(&cli.path, &format)?
        }
    };
    let default = DefaultValue::from(cli.default_value);

    println!("players: {}", game.number_of_players());
    println!("class: {}", determine_class(&game));
    println!("shapley: {}", allocation_to_string(&shapley(&game, cli.player, default)?));
    println!("banzhaf: {}", allocation_to_string(&banzhaf(&game, cli.player, default)?));
    if let Some(payoff) = &cli.payoff {
        println!("in core: {}", solution_in_core(&game, payoff, default)?);
    }
    if cli.vertices {
        let vertices = core_vertices(&game, &ExactBackend, default)?;
        if vertices.is_empty() {
            println!("core: empty");
        }
        for vertex in vertices {
            println!("vertex: {vertex:?}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let now = Instant::now();
    let result = run(&cli);
    info!("Time: {} seconds", now.elapsed().as_secs_f64());
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
