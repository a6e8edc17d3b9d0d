use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

use race_pool::cache::{clear_cache, ReadCache};
use race_pool::config::{get_cache_path, load_config, validate_config};
use race_pool::model::RaceId;
use race_pool::output;
use race_pool::pool::RaceFields;
use race_pool::roster::load_roster;
use race_pool::scoring::ResultsInput;
use race_pool::store::JsonFileStore;
use race_pool::{PoolContext, PoolError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_STORAGE: i32 = 2;
const EXIT_CONFLICT: i32 = 3;
const EXIT_INVALID: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a config file interactively
    Init,
    /// List participants by name
    Participants,
    /// List drivers by car number
    Drivers,
    /// List races in season order (default if no subcommand)
    Races,
    /// Show one race with its rollover and results
    Race {
        race_id: RaceId,
    },
    /// Schedule a new race
    AddRace {
        /// Position in the season; rollover flows to the next number
        race_number: u32,
        name: String,
        /// Race date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Double the points awarded in this race
        #[arg(long)]
        special: bool,
        /// Free-text note about extra (non-pool) drivers
        #[arg(long)]
        extra_drivers: Option<String>,
    },
    /// Change a race's name, date, special flag or note
    UpdateRace {
        race_id: RaceId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        special: Option<bool>,
        #[arg(long)]
        extra_drivers: Option<String>,
    },
    /// Randomly deal the chartered drivers into teams for a race
    GenerateTeams {
        race_id: RaceId,
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the teams of a race, best first
    Teams {
        race_id: RaceId,
    },
    /// Record the winning car numbers of a race
    Results {
        race_id: RaceId,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        second: Option<String>,
        #[arg(long)]
        last: Option<String>,
        #[arg(long)]
        stage1: Option<String>,
        #[arg(long)]
        stage2: Option<String>,
    },
    /// Show season standings
    Standings {
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Load participants, drivers and races from a YAML roster
    ImportRoster {
        path: PathBuf,
    },
    /// Remove the read cache
    ClearCache,
}

#[derive(Parser, Debug)]
#[command(name = "race-pool")]
#[command(about = "Season-long racing fantasy pool", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/race-pool/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Bypass the read cache for this invocation
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn exit_code(err: &PoolError) -> i32 {
    match err {
        PoolError::Validation(_) => EXIT_INVALID,
        PoolError::Storage(_) => EXIT_STORAGE,
        _ if err.is_conflict() => EXIT_CONFLICT,
        _ => EXIT_STORAGE,
    }
}

fn main() {
    let cli = Cli::parse();
    race_pool::logging::init(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Races);
    let config_path = cli.config.map(PathBuf::from);

    // Handle init before loading config (config may not exist yet)
    if let Commands::Init = command {
        if let Err(e) = race_pool::config::init::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_INVALID);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    if let Commands::ClearCache = command {
        let cache_path = get_cache_path();
        match clear_cache(&cache_path) {
            Ok(()) => {
                println!("Cache cleared ({})", cache_path.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Failed to clear cache: {:#}", e);
                std::process::exit(EXIT_STORAGE);
            }
        }
    }

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_INVALID);
        }
    };

    if let Err(errors) = validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_INVALID);
    }

    let data_path = config.data_path();
    tracing::debug!(path = %data_path.display(), "using pool file");

    let cache = if cli.no_cache {
        ReadCache::disabled()
    } else {
        ReadCache::new(get_cache_path(), &config.cache)
    };
    let pool = PoolContext::new(JsonFileStore::new(data_path), cache);

    let use_colors = output::should_use_colors();
    match run(&pool, command, use_colors) {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_code(&e));
        }
    }
}

fn run(pool: &PoolContext, command: Commands, use_colors: bool) -> Result<(), PoolError> {
    match command {
        // Handled before the pool is opened
        Commands::Init | Commands::ClearCache => {}
        Commands::Participants => {
            println!("{}", output::format_participants(&pool.participants()?));
        }
        Commands::Drivers => {
            println!("{}", output::format_drivers(&pool.drivers()?, use_colors));
        }
        Commands::Races => {
            println!("{}", output::format_race_list(&pool.list_races()?, use_colors));
        }
        Commands::Race { race_id } => {
            println!("{}", output::format_race_detail(&pool.race_detail(race_id)?, use_colors));
        }
        Commands::AddRace {
            race_number,
            name,
            date,
            special,
            extra_drivers,
        } => {
            let race = pool.create_race(
                race_number,
                RaceFields {
                    name,
                    date,
                    special,
                    extra_drivers,
                },
            )?;
            println!("Created race #{} {} (id {})", race.race_number, race.name, race.id);
        }
        Commands::UpdateRace {
            race_id,
            name,
            date,
            special,
            extra_drivers,
        } => {
            let current = pool.race_detail(race_id)?.race;
            let race = pool.update_race(
                race_id,
                RaceFields {
                    name: name.unwrap_or(current.name),
                    date: date.or(current.date),
                    special: special.unwrap_or(current.special),
                    extra_drivers: extra_drivers.or(current.extra_drivers),
                },
            )?;
            println!("Updated race #{} {}", race.race_number, race.name);
        }
        Commands::GenerateTeams { race_id, seed } => {
            let teams = match seed {
                Some(seed) => pool.generate_teams(race_id, &mut ChaCha8Rng::seed_from_u64(seed))?,
                None => pool.generate_teams(race_id, &mut rand::rng())?,
            };
            println!("Generated {} teams for race {}", teams.len(), race_id);
            println!("{}", output::format_teams(&pool.race_teams(race_id)?, use_colors));
        }
        Commands::Teams { race_id } => {
            println!("{}", output::format_teams(&pool.race_teams(race_id)?, use_colors));
        }
        Commands::Results {
            race_id,
            first,
            second,
            last,
            stage1,
            stage2,
        } => {
            let input = ResultsInput {
                first_place: first,
                second_place: second,
                last_place: last,
                stage1_winner: stage1,
                stage2_winner: stage2,
            };
            let outcome = pool.submit_results(race_id, &input)?;
            println!("{}", output::format_submission(&outcome, use_colors));
        }
        Commands::Standings { tsv } => {
            let standings = pool.compute_standings()?;
            if tsv {
                println!("{}", output::format_standings_tsv(&standings));
            } else {
                println!("{}", output::format_standings(&standings, use_colors));
            }
        }
        Commands::ImportRoster { path } => {
            let roster =
                load_roster(&path).map_err(|e| PoolError::validation(format!("{:#}", e)))?;
            let summary = pool.import_roster(&roster)?;
            println!("{}", output::format_import_summary(&summary));
        }
    }
    Ok(())
}
