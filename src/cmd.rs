//! Command line interface

use std::error::Error;
use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};
use fxhash::FxHashSet;
use kdam::{tqdm, BarExt};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sclib::io::{read_library, write_library_file};
use sclib::library::stats::stats;
use sclib::npn::{canonize, TruthTable, DEFAULT_EXACT_LIMIT, MAX_EXACT_LIMIT};
use sclib::timing::{ArcCombination, InputTiming};
use sclib::{LibraryOptions, Rewiring, ScaleFactors};

type CmdResult = Result<(), Box<dyn Error>>;

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Show statistics about a cell library
    ///
    /// Will print statistics on the number of cells, functions and NPN classes in the library.
    #[clap()]
    Show(ShowArgs),

    /// Find the cells implementing a function
    ///
    /// The function is a truth table in hexadecimal or binary, most significant row first:
    /// a 2-input And is 8 or 1000. Each match shows how to connect the function inputs x0, x1, ...
    /// to the cell pins.
    #[clap()]
    Match(MatchArgs),

    /// Evaluate the delay and output slope of a cell
    #[clap()]
    Delay(DelayArgs),

    /// Scale the area and timing of a library
    ///
    /// Used to derive a library for another operating corner.
    #[clap()]
    Scale(ScaleArgs),

    /// Count the NPN classes of functions with a given number of inputs
    ///
    /// All functions are enumerated up to 4 inputs. Above, random functions are sampled.
    #[clap()]
    Npn(NpnArgs),
}

/// Command arguments for library informations
#[derive(Args)]
pub struct ShowArgs {
    /// Library to show
    file: PathBuf,

    /// List the cells
    #[arg(short = 'c', long)]
    cells: bool,

    /// Maximum number of inputs for exact NPN classification
    #[arg(long, default_value_t = DEFAULT_EXACT_LIMIT, value_parser = exact_limit_parser())]
    exact_limit: usize,
}

impl ShowArgs {
    pub fn run(&self) -> CmdResult {
        let lib = read_library(&self.file, &options(self.exact_limit))?;
        println!("Library {}:\n{}", lib.name(), stats(&lib));
        if self.cells {
            for id in lib.cell_ids() {
                let sizes = lib.sizes(id);
                print!("{}", lib.cell(id));
                if sizes.len() > 1 {
                    let names: Vec<&str> = sizes.iter().map(|s| lib.cell(*s).name()).collect();
                    print!(" sizes=[{}]", names.join(", "));
                }
                println!();
            }
        }
        Ok(())
    }
}

/// Command arguments for function matching
#[derive(Args)]
pub struct MatchArgs {
    /// Library to search
    file: PathBuf,

    /// Truth table of the function
    function: String,

    /// Number of inputs of the function
    #[arg(short = 'n', long)]
    num_inputs: usize,

    /// Only return cells that need no inverter
    #[arg(long)]
    no_inverters: bool,

    /// Maximum number of inputs for exact NPN classification
    #[arg(long, default_value_t = DEFAULT_EXACT_LIMIT, value_parser = exact_limit_parser())]
    exact_limit: usize,
}

impl MatchArgs {
    pub fn run(&self) -> CmdResult {
        let lib = read_library(&self.file, &options(self.exact_limit))?;
        let function = TruthTable::parse(self.num_inputs, &self.function).ok_or_else(|| {
            format!(
                "Cannot parse {} as a function of {} inputs",
                self.function, self.num_inputs
            )
        })?;
        let rewiring = if self.no_inverters {
            Rewiring::PermutationOnly
        } else {
            Rewiring::Npn
        };
        let matches = lib.matches_with(&function, rewiring);
        if matches.is_empty() {
            println!("No cell implements {}", function);
        }
        for m in &matches {
            let pins: Vec<String> = m
                .pin_binding()
                .into_iter()
                .enumerate()
                .map(|(pin, (i, neg))| {
                    format!(
                        "{}={}x{}",
                        m.cell.input(pin).name(),
                        if neg { "!" } else { "" },
                        i
                    )
                })
                .collect();
            println!(
                "{}{}.{}({}) area={}",
                if m.needs_output_inverter() { "!" } else { "" },
                m.cell.name(),
                m.cell.output(m.output).name(),
                pins.join(", "),
                m.cell.area()
            );
        }
        Ok(())
    }
}

/// Command arguments for delay evaluation
#[derive(Args)]
pub struct DelayArgs {
    /// Library of the cell
    file: PathBuf,

    /// Name of the cell
    cell: String,

    /// Transition time at the inputs
    #[arg(short = 's', long, default_value_t = 0.0)]
    slope: f64,

    /// Capacitive load on the output
    #[arg(short = 'l', long, default_value_t = 0.0)]
    load: f64,

    /// Fanout of the output, to add the default wire load to the capacitance
    #[arg(long)]
    fanout: Option<usize>,

    /// Average the arcs instead of taking the worst one
    #[arg(long)]
    mean: bool,
}

impl DelayArgs {
    pub fn run(&self) -> CmdResult {
        let lib = read_library(&self.file, &LibraryOptions::default())?;
        let id = lib
            .cell_id(&self.cell)
            .ok_or_else(|| format!("No cell named {} in the library", self.cell))?;
        let cell = lib.cell(id);
        let mut load = self.load;
        if let Some(fanout) = self.fanout {
            let w = lib
                .default_wire_load()
                .ok_or("The library has no default wire load model")?;
            load += w.capacitance(fanout);
        }
        let combine = if self.mean {
            ArcCombination::Mean
        } else {
            ArcCombination::Max
        };
        let inputs = vec![
            InputTiming {
                arrival: 0.0,
                slope: self.slope,
            };
            cell.nb_inputs()
        ];
        for (o, output) in cell.outputs().iter().enumerate() {
            for arc in output.arcs() {
                let t = lib.delay(id, o, arc.input(), self.slope, load)?;
                println!(
                    "{} -> {}: delay={} slope={}",
                    cell.input(arc.input()).name(),
                    output.name(),
                    t.delay,
                    t.slope
                );
            }
            let t = lib.output_timing(id, o, &inputs, load, combine)?;
            println!("{}: arrival={} slope={}", output.name(), t.arrival, t.slope);
        }
        Ok(())
    }
}

/// Command arguments for library scaling
#[derive(Args)]
pub struct ScaleArgs {
    /// Library to scale
    file: PathBuf,

    /// Output file for the scaled library
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Factor applied to the area
    #[arg(long, default_value_t = 1.0)]
    area: f64,

    /// Factor applied to the delays
    #[arg(long, default_value_t = 1.0)]
    delay: f64,

    /// Factor applied to the output slopes
    #[arg(long, default_value_t = 1.0)]
    slope: f64,
}

impl ScaleArgs {
    pub fn run(&self) -> CmdResult {
        let lib = read_library(&self.file, &LibraryOptions::default())?;
        let factors = ScaleFactors {
            area: self.area,
            delay: self.delay,
            slope: self.slope,
        };
        let scaled = lib.scaled(&factors)?;
        write_library_file(&self.output, &scaled.to_description())?;
        Ok(())
    }
}

/// Command arguments for NPN class counting
#[derive(Args)]
pub struct NpnArgs {
    /// Number of inputs of the functions
    num_inputs: usize,

    /// Number of random functions to sample instead of enumerating all of them
    #[arg(short = 'r', long)]
    random: Option<usize>,

    /// Seed for random sampling
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Maximum number of inputs for exact NPN classification
    #[arg(long, default_value_t = DEFAULT_EXACT_LIMIT, value_parser = exact_limit_parser())]
    exact_limit: usize,
}

impl NpnArgs {
    pub fn run(&self) -> CmdResult {
        let n = self.num_inputs;
        if n > sclib::npn::MAX_VARS {
            return Err(format!("At most {} inputs are supported", sclib::npn::MAX_VARS).into());
        }
        let nb_functions = match self.random {
            Some(nb) => nb,
            None if n <= 4 => 1 << (1 << n),
            None => return Err("Use --random to sample functions with more than 4 inputs".into()),
        };
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut classes = FxHashSet::default();
        let mut progress = tqdm!(total = nb_functions);
        progress.set_description("Functions classified");
        for i in 0..nb_functions {
            let f = if self.random.is_some() {
                TruthTable::from_fn(n, |_| rng.gen_bool(0.5))
            } else {
                TruthTable::from_fn(n, |m| (i >> m) & 1 != 0)
            };
            classes.insert(canonize(&f, self.exact_limit).key);
            progress.update(1)?;
        }
        progress.write(format!(
            "{} functions of {} inputs in {} classes{}",
            nb_functions,
            n,
            classes.len(),
            if n > self.exact_limit {
                " (approximate signature classes)"
            } else {
                ""
            }
        ))?;
        Ok(())
    }
}

fn exact_limit_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(0..=MAX_EXACT_LIMIT as u64)
}

fn options(exact_limit: usize) -> LibraryOptions {
    LibraryOptions { exact_limit }
}
