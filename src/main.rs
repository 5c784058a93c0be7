use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use megafauna::demo::DemoHabitat;
use megafauna::instruction::InstructionFile;
use megafauna::SimDayOptions;
use megafauna_data::Date;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Standalone simulator for the megafauna herbivore model: runs the
/// engine against a simple logistic-grass vegetation model.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML instruction file with simulation settings, herbivore
    /// functional types and habitat parameters.
    instruction_file: PathBuf,

    /// Override the output directory from the instruction file.
    #[arg(short, long)]
    output_directory: Option<String>,

    /// Simulate the vegetation only, without herbivores.
    #[arg(long)]
    no_herbivores: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let text = fs::read_to_string(&args.instruction_file).with_context(|| {
        format!(
            "could not read instruction file {}",
            args.instruction_file.display()
        )
    })?;
    let mut instruction: InstructionFile =
        toml::from_str(&text).context("bad instruction file")?;
    if instruction.hfts.is_empty() {
        bail!("the instruction file defines no herbivore functional type");
    }
    if let Some(directory) = args.output_directory {
        instruction.parameters.output_text_tables.directory = directory;
    }

    let mut world = megafauna::build_world(instruction.parameters, instruction.hfts)
        .context("could not build the simulation world")?;
    for group in 0..instruction.simulation.habitat_groups {
        let aggregation_unit = format!("group{group}");
        for _ in 0..instruction.simulation.habitats_per_group {
            let habitat =
                DemoHabitat::new(instruction.habitat.clone(), aggregation_unit.clone())?;
            world.create_simulation_unit(Box::new(habitat));
        }
    }
    info!(
        years = instruction.simulation.years,
        habitats = world.sim_units().len(),
        "simulation starting"
    );

    let options = SimDayOptions {
        do_herbivores: !args.no_herbivores,
        ..SimDayOptions::default()
    };
    let total_days = u64::from(instruction.simulation.years) * 365;
    let progress = ProgressBar::new(total_days);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} days ({eta})")
            .expect("static template is valid"),
    );

    let mut date = Date::new(0, 0).expect("day 0 is valid");
    for _ in 0..total_days {
        world
            .simulate_day(date, &options)
            .with_context(|| format!("day {} of year {}", date.julian_day(), date.year()))?;
        date = date.next();
        progress.inc(1);
    }
    progress.finish();
    info!("simulation finished");
    Ok(())
}
