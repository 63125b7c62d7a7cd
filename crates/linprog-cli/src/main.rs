use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;

use linprog_solver::{
    construct_dual, normalize, objective_sensitivity, LinearProgram, Method, RawProblem, Solver,
    SolverResult, Status, DEFAULT_STEP,
};

#[derive(Parser)]
#[command(name = "linprog")]
#[command(about = "Tableau simplex solver for linear programs", long_about = None)]
struct Cli {
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and print the result
    Solve {
        /// JSON problem file, or - for stdin
        file: PathBuf,
        /// Override the method named in the file (simplex, big_m, two_phase, dual)
        #[arg(short, long)]
        method: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Also report objective-coefficient sensitivity
        #[arg(short, long)]
        sensitivity: bool,
        /// Maximum pivots across all phases
        #[arg(long, default_value_t = 1000)]
        max_iterations: usize,
        /// Tolerance for floating point comparisons
        #[arg(long, default_value_t = 1e-9)]
        tolerance: f64,
    },
    /// Validate a problem file without solving it
    Check {
        /// JSON problem file, or - for stdin
        file: PathBuf,
    },
    /// Print the dual of a max/<= problem as a new problem file
    Dual {
        /// JSON problem file, or - for stdin
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new().filter_level(level).parse_default_env().init();

    match cli.command {
        Commands::Solve {
            file,
            method,
            format,
            sensitivity,
            max_iterations,
            tolerance,
        } => {
            let mut raw = read_problem(&file)?;
            if let Some(method) = method {
                raw.method = method;
            }
            let (program, method) = normalize(&raw).context("Invalid problem")?;

            let solver = Solver::new()
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance);
            let result = solver.solve(&program, method).context("Invalid problem")?;
            let sensitivities = if sensitivity {
                Some(objective_sensitivity(&solver, &program, method, DEFAULT_STEP)?)
            } else {
                None
            };

            match format {
                Format::Json => {
                    let output = match &sensitivities {
                        Some(s) => serde_json::json!({ "solution": result, "sensitivity": s }),
                        None => serde_json::to_value(&result)?,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                Format::Pretty => print_pretty(&program, method, &result, sensitivities.as_ref()),
            }

            if result.status != Status::Optimal {
                std::process::exit(1);
            }
        }
        Commands::Check { file } => {
            let raw = read_problem(&file)?;
            match normalize(&raw) {
                Ok((program, method)) => {
                    println!("✓ {} is valid", file.display());
                    println!("  {} variables", program.num_variables());
                    println!("  {} constraints", program.num_constraints());
                    println!("  sense: {}", program.sense());
                    println!("  method: {method}");
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Dual { file } => {
            let raw = read_problem(&file)?;
            let (program, _) = normalize(&raw).context("Invalid problem")?;
            let dual = construct_dual(&program).context("Cannot build dual")?;
            let mut dual_raw = RawProblem::from(&dual);
            dual_raw.method = Method::TwoPhase.to_string();
            println!("{}", serde_json::to_string_pretty(&dual_raw)?);
        }
    }

    Ok(())
}

fn read_problem(file: &Path) -> Result<RawProblem> {
    let source = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Error reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Error reading {}", file.display()))?
    };
    serde_json::from_str(&source).with_context(|| format!("Error parsing {}", file.display()))
}

fn print_pretty(
    program: &LinearProgram,
    method: Method,
    result: &SolverResult,
    sensitivities: Option<&std::collections::BTreeMap<String, f64>>,
) {
    println!("Method: {method}");
    println!("Iterations: {}", result.iterations);
    println!();

    match result.status {
        Status::Optimal => {
            println!("Status: OPTIMAL");
            println!("Objective: {:.4}", result.objective_value);
            println!();
            println!("Variables:");
            for (name, value) in &result.variable_values {
                println!("  {:20} {:12.4}", name, value);
            }
            println!();

            println!("Dual prices:");
            for (i, price) in &result.dual_prices {
                let marker = if result.binding_constraints.contains(i) { "binding" } else { "" };
                println!("  constraint {:<9} {:12.4}  {}", i + 1, price, marker);
            }
            println!();

            println!("Reduced costs:");
            for (name, rc) in &result.reduced_costs {
                if rc.abs() > 0.001 {
                    println!("  {:20} {:12.4}", name, rc);
                }
            }

            if let Some(sensitivities) = sensitivities {
                println!();
                println!("Objective sensitivity (per unit coefficient change):");
                for name in program.variables() {
                    if let Some(s) = sensitivities.get(name) {
                        println!("  {:20} {:12.4}", name, s);
                    }
                }
            }
        }
        Status::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No solution exists that satisfies all constraints.");
        }
        Status::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("The problem has no finite optimal solution.");
        }
        Status::IterationLimitExceeded => {
            println!("Status: ITERATION LIMIT EXCEEDED");
            println!("Stopped after {} pivots without proving optimality.", result.iterations);
        }
    }
}
