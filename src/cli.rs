//! Command-line interface for the commute model.

use crate::config::ConfigOverrides;
use lexopt::prelude::*;
use std::path::PathBuf;

/// Command-line arguments for the simulation.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub command: Command,
    pub preset: String,
    pub config_file: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    pub output_file: Option<PathBuf>,
    pub events_file: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run,
    Analyze { file: PathBuf },
    Sweep { config: PathBuf },
    Presets,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            command: Command::Run,
            preset: "default".to_string(),
            config_file: None,
            overrides: ConfigOverrides::default(),
            output_file: None,
            events_file: None,
            verbose: false,
            quiet: false,
        }
    }
}

pub fn parse_args() -> Result<CliArgs, lexopt::Error> {
    parse_from(lexopt::Parser::from_env())
}

/// Parse an explicit argument list (without the program name).
pub fn parse_from_iter<I>(args: I) -> Result<CliArgs, lexopt::Error>
where
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString>,
{
    parse_from(lexopt::Parser::from_args(args))
}

fn parse_from(mut args: lexopt::Parser) -> Result<CliArgs, lexopt::Error> {
    let mut cli_args = CliArgs::default();
    let mut subcommand: Option<String> = None;
    let mut file_arg: Option<PathBuf> = None;

    while let Some(arg) = args.next()? {
        match arg {
            Value(val) => {
                let val_str = val.string()?;
                if subcommand.is_none() {
                    subcommand = Some(val_str);
                } else if file_arg.is_none() {
                    file_arg = Some(PathBuf::from(val_str));
                } else {
                    return Err(lexopt::Error::from(format!(
                        "unexpected argument '{}'",
                        val_str
                    )));
                }
            }
            Long("preset") | Short('p') => {
                cli_args.preset = args.value()?.string()?;
            }
            Long("config-file") | Short('c') => {
                cli_args.config_file = Some(PathBuf::from(args.value()?.string()?));
            }
            Long("agents") | Short('n') => {
                cli_args.overrides.population = Some(args.value()?.parse()?);
            }
            Long("ticks") | Short('t') => {
                cli_args.overrides.ticks = Some(args.value()?.parse()?);
            }
            Long("seed") => {
                cli_args.overrides.random_seed = Some(args.value()?.parse()?);
            }
            Long("width") => {
                cli_args.overrides.width = Some(args.value()?.parse()?);
            }
            Long("height") => {
                cli_args.overrides.height = Some(args.value()?.parse()?);
            }
            Long("city") => {
                cli_args.overrides.city = Some(args.value()?.parse()?);
            }
            Long("initial-wealth") => {
                cli_args.overrides.initial_wealth = Some(args.value()?.parse()?);
            }
            Long("cost-per-distance") => {
                cli_args.overrides.cost_per_unit_distance = Some(args.value()?.parse()?);
            }
            Long("transit-cost") => {
                cli_args.overrides.transit_cost = Some(args.value()?.parse()?);
            }
            Long("move-cost") => {
                cli_args.overrides.cost_to_move = Some(args.value()?.parse()?);
            }
            Long("transit-availability") => {
                cli_args.overrides.transit_availability = Some(args.value()?.parse()?);
            }
            Long("torus") => cli_args.overrides.torus = Some(true),
            Long("output") | Short('o') => {
                cli_args.output_file = Some(PathBuf::from(args.value()?.string()?));
            }
            Long("events") => {
                cli_args.events_file = Some(PathBuf::from(args.value()?.string()?));
            }
            Long("verbose") | Short('v') => cli_args.verbose = true,
            Long("quiet") | Short('q') => cli_args.quiet = true,
            Long("help") | Short('h') => {
                print_help();
                std::process::exit(0);
            }
            _ => return Err(arg.unexpected()),
        }
    }

    cli_args.command = match subcommand.as_deref() {
        Some("run") | None => Command::Run,
        Some("presets") => Command::Presets,
        Some("analyze") => Command::Analyze {
            file: file_arg.unwrap_or_else(|| PathBuf::from("commute_run.json")),
        },
        Some("sweep") => match file_arg {
            Some(config) => Command::Sweep { config },
            None => {
                return Err(lexopt::Error::from(
                    "sweep command requires a YAML configuration file",
                ));
            }
        },
        Some(cmd) => {
            return Err(lexopt::Error::from(format!("unknown command: {}", cmd)));
        }
    };

    Ok(cli_args)
}

pub fn print_help() {
    println!("\nCommute Model - spatial inequality and commuting\n");
    println!("USAGE:");
    println!("    commute-model-sim [COMMAND] [OPTIONS]\n");

    println!("COMMANDS:");
    println!("    run              Run a simulation (default)");
    println!("    analyze [FILE]   Summarize a saved run report");
    println!("    sweep CONFIG     Run a parameter sweep from a YAML file");
    println!("    presets          List built-in configurations\n");

    println!("SIMULATION OPTIONS:");
    println!("    -p, --preset <NAME>           Built-in configuration (default: default)");
    println!("    -c, --config-file <FILE>      Load configuration from a JSON file");
    println!("    -n, --agents <N>              Number of commuting agents");
    println!("    -t, --ticks <N>               Number of ticks to run");
    println!("    --seed <N>                    Random seed for reproducible runs");
    println!("    --width <N>                   Grid width");
    println!("    --height <N>                  Grid height");
    println!("    --city <X,Y>                  City position");
    println!("    --initial-wealth <N>          Starting wealth of every agent");
    println!("    --cost-per-distance <N>       Car cost per unit of distance");
    println!("    --transit-cost <N>            Flat public transit fare");
    println!("    --move-cost <N>               Cost of relocating one cell");
    println!("    --transit-availability <N>    Public transit availability factor");
    println!("    --torus                       Wrap the grid at its edges\n");

    println!("OUTPUT OPTIONS:");
    println!("    -o, --output <FILE>           Write the run report as JSON");
    println!("    --events <FILE>               Record agent events and write them as JSON");
    println!("    -v, --verbose                 Log every tick");
    println!("    -q, --quiet                   Only log warnings and errors");
    println!("    -h, --help                    Print help information\n");

    println!("EXAMPLES:");
    println!("    commute-model-sim run --seed 7 -t 200 -o run.json");
    println!("    commute-model-sim analyze run.json");
    println!("    commute-model-sim sweep sweeps/transit.yaml");
}
