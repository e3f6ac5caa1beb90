//! goap - plan over YAML domain files.
//!
//! - `goap plan <domain>` - ground, search and print the plan
//! - `goap check <domain>` - run every search mode and verify each plan
//! - `goap ground <domain>` - print the grounded atoms and actions

mod config;
mod domain;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use goap_core::Registry;
use goap_ground::GroundedProblem;
use goap_search::{Planner, SearchMode};
use goap_tools::{LogTraceSink, TraceSink};
use goap_verify::{cross_check, verify_plan};
use tracing_subscriber::{fmt, EnvFilter};

use config::PlannerConfig;
use domain::DomainFile;

#[derive(Parser)]
#[command(name = "goap")]
#[command(about = "Goal-oriented action planner", version)]
struct Cli {
    /// Planner configuration file
    #[arg(short, long, global = true, default_value = "goap.yaml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a plan for a domain file
    Plan {
        domain: PathBuf,

        /// forward, backward or bidirectional
        #[arg(short, long)]
        mode: Option<SearchMode>,

        /// Maximum node expansions
        #[arg(short, long)]
        budget: Option<usize>,

        /// Heuristic weight (0 = uniform cost)
        #[arg(long)]
        weight: Option<u32>,

        /// Print the explored search tree
        #[arg(long)]
        tree: bool,

        /// Emit every search event at trace level
        #[arg(long)]
        trace: bool,

        /// Print the verification receipt as JSON
        #[arg(long)]
        proof: bool,
    },

    /// Plan in every mode and verify the results
    Check { domain: PathBuf },

    /// Show the grounded problem
    Ground { domain: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let mut config = PlannerConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Plan {
            domain,
            mode,
            budget,
            weight,
            tree,
            trace,
            proof,
        } => {
            if let Some(mode) = mode {
                config.mode = mode;
            }
            if let Some(budget) = budget {
                config.max_expansions = budget;
            }
            if let Some(weight) = weight {
                config.heuristic_weight = weight;
            }
            run_plan(&domain, &config, tree, trace, proof)
        }
        Commands::Check { domain } => run_check(&domain, &config),
        Commands::Ground { domain } => run_ground(&domain),
    }
}

fn load(path: &Path) -> Result<GroundedProblem> {
    DomainFile::load(path)?.ground()
}

fn run_plan(
    path: &Path,
    config: &PlannerConfig,
    show_tree: bool,
    trace: bool,
    show_proof: bool,
) -> Result<()> {
    let problem = load(path)?;
    tracing::info!(
        domain = %path.display(),
        mode = %config.mode,
        atoms = problem.registry.atom_count(),
        actions = problem.registry.action_count(),
        "planning"
    );

    let planner = Planner::new(&problem.registry).with_config(config.search_config());
    let mut log_sink = LogTraceSink;
    let sink: Option<&mut dyn TraceSink> = if trace { Some(&mut log_sink) } else { None };
    let (result, tree) = planner.explore(
        &problem.start,
        &problem.goal,
        &config.cancellation(),
        sink,
    );

    if show_tree {
        print!("{}", tree.render(&problem.registry));
        println!();
    }
    let stats = tree.stats();
    println!(
        "expanded {} ({} forward, {} backward), generated {}",
        stats.expanded, stats.forward_expanded, stats.backward_expanded, stats.generated
    );

    let plan = result.context("Planning failed")?;
    print!("{}", plan.describe());

    if show_proof {
        let proof = verify_plan(&problem.registry, &problem.start, &problem.goal, &plan)
            .context("Plan failed verification")?;
        println!("{}", proof.to_json()?);
    }
    Ok(())
}

fn run_check(path: &Path, config: &PlannerConfig) -> Result<()> {
    let problem = load(path)?;
    let check = cross_check(
        &problem.registry,
        &problem.start,
        &problem.goal,
        config.search_config(),
    )
    .context("Cross-mode check failed")?;

    for (mode, verified) in &check.runs {
        println!(
            "{:<14} cost {:<4} steps {:<3} {}",
            mode.as_str(),
            verified.plan.total_cost,
            verified.plan.len(),
            verified.proof.plan_hash.get(..12).unwrap_or_default()
        );
    }
    if check.costs_agree() {
        println!("all modes agree");
    } else {
        println!("modes disagree on cost");
    }
    Ok(())
}

fn run_ground(path: &Path) -> Result<()> {
    let problem = load(path)?;
    print!("{}", ground_report(&problem));
    Ok(())
}

fn ground_report(problem: &GroundedProblem) -> String {
    let registry: &Registry = &problem.registry;
    let mut out = format!("atoms ({}):\n", registry.atom_count());
    for (i, atom) in registry.atoms().iter().enumerate() {
        out.push_str(&format!("  {i:>2} {atom}\n"));
    }
    out.push_str(&format!("actions ({}):\n", registry.action_count()));
    for i in 0..registry.action_count() {
        if let Some(line) = registry.describe_action(i) {
            out.push_str(&format!("  {i:>2} {line}\n"));
        }
    }
    out.push_str(&format!("start: {}\n", registry.describe(&problem.start)));
    out.push_str(&format!("goal: {}\n", registry.describe(&problem.goal)));
    for diagnostic in &problem.diagnostics {
        out.push_str(&format!("warning: {diagnostic}\n"));
    }
    out
}
