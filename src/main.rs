use commute_model::analysis::{RunReport, analyze_report, summarize};
use commute_model::cli::{self, CliArgs, Command};
use commute_model::config::{SimulationConfig, create_standard_configs, standard_config};
use commute_model::error::Result;
use commute_model::simulation::Simulation;
use commute_model::sweep::SweepBatch;
use log::{LevelFilter, error, info};
use std::path::Path;

fn main() {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            cli::print_help();
            std::process::exit(2);
        }
    };

    init_logging(&args);

    let result = match &args.command {
        Command::Run => run(&args),
        Command::Analyze { file } => analyze(file),
        Command::Sweep { config } => sweep(config, args.output_file.as_deref()),
        Command::Presets => {
            list_presets();
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &CliArgs) {
    let level = if args.quiet {
        LevelFilter::Warn
    } else if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn build_config(args: &CliArgs) -> Result<SimulationConfig> {
    let mut config = match &args.config_file {
        Some(path) => SimulationConfig::load_from_file(path)?,
        None => standard_config(&args.preset)?,
    };
    args.overrides.apply(&mut config);
    Ok(config)
}

fn run(args: &CliArgs) -> Result<()> {
    let config = build_config(args)?;
    if !args.quiet {
        println!("{}", config);
    }

    let mut sim = Simulation::new(config)?;
    if args.events_file.is_some() {
        sim.enable_events();
    }
    sim.run()?;

    let report = RunReport::from_simulation(&sim);
    if !args.quiet {
        println!("{}", summarize(&report));
    }

    if let Some(path) = &args.output_file {
        report.save_to_file(path)?;
        info!("Run report written to {}", path.display());
    }
    if let Some(path) = &args.events_file {
        sim.events().save_to_file(path)?;
        info!(
            "{} events written to {}",
            sim.events().get_events().len(),
            path.display()
        );
    }
    Ok(())
}

fn analyze(file: &Path) -> Result<()> {
    let summary = analyze_report(file)?;
    println!("{}", summary);
    Ok(())
}

fn sweep(config: &Path, output: Option<&Path>) -> Result<()> {
    let batch = SweepBatch::load_from_file(config)?;
    println!("Sweep: {}", batch.name);
    if !batch.description.is_empty() {
        println!("{}\n", batch.description);
    }

    let results = batch.run();
    for result in &results {
        println!("{}", result);
    }

    let failed = results.iter().filter(|r| !r.success).count();
    println!("\n{} runs, {} failed", results.len(), failed);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(path, json)?;
        info!("Sweep results written to {}", path.display());
    }
    Ok(())
}

fn list_presets() {
    let configs = create_standard_configs();
    let mut names: Vec<_> = configs.keys().collect();
    names.sort();
    for name in names {
        let config = &configs[name];
        println!("{:<16} {}", name, config.description);
    }
}
