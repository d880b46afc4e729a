use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use rule_equiv::ir::{Condition, Expr};
use rule_equiv::scenarios::{ChainScenario, OverlapScenario, TicketScenario};
use rule_equiv::semantics::{
    check_overlap, check_reachability, EquivalenceQuery, EquivalenceResult, OverlapResult,
    ReachabilityResult, SymbolicState, Workflow,
};
use rule_equiv::solver::{SessionConfig, SolverSession};
use rule_equiv::validation::SamplingConfig;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "rule-equiv")]
#[command(about = "rule-equiv - bounded equivalence checking for business-rule workflows")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Solver timeout in seconds (0 disables the timeout)
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the old and new ticket workflows
    Equiv {
        /// Number of distinct counterexamples to enumerate
        #[arg(long, default_value = "1")]
        count: usize,
        /// Replay this many random initial states before calling the solver
        #[arg(long)]
        sample: Option<usize>,
        /// Random seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
        /// Compare only these fields of the final state
        #[arg(long, value_delimiter = ',')]
        observe: Vec<String>,
    },
    /// Search for initial values that drive the two-rule chain into a goal
    Reach {
        /// Goal on the final state, as FIELD=VALUE
        #[arg(long, default_value = "a=17")]
        target: String,
    },
    /// Check whether two rules' conditions can hold on the same state
    Overlap,
}

fn session_config(timeout: u64) -> SessionConfig {
    if timeout == 0 {
        SessionConfig::no_timeout()
    } else {
        SessionConfig::with_timeout(Duration::from_secs(timeout))
    }
}

/// Parse `FIELD=VALUE` into `FIELD == VALUE`
fn parse_target(target: &str) -> Result<Condition, Box<dyn std::error::Error>> {
    let (field, value) = target
        .split_once('=')
        .ok_or_else(|| format!("target `{}` is not of the form FIELD=VALUE", target))?;
    let value: i64 = value.trim().parse()?;
    Ok(Expr::field(field.trim()).eq(value.into()))
}

// --- Command Handlers ---

fn run_equiv(
    config: SessionConfig,
    count: usize,
    sample: Option<usize>,
    seed: Option<u64>,
    observe: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = TicketScenario::new()?;
    let mut session = SolverSession::new(config)?;

    let initial = SymbolicState::shared_initial(&scenario.schema, session.vocabulary_mut())?;
    let old = Workflow::build(
        &scenario.schema,
        "old",
        &initial,
        scenario.old_steps(),
        session.vocabulary_mut(),
    )?;
    let new = Workflow::build(
        &scenario.schema,
        "new",
        &initial,
        scenario.new_steps(),
        session.vocabulary_mut(),
    )?;
    println!("Schema: {}", scenario.schema);
    println!("Old workflow: {}", old);
    println!("New workflow: {}", new);

    let mut query = EquivalenceQuery::new(&old, &new)?;
    if !observe.is_empty() {
        query = query.with_observed_fields(observe)?;
    }

    if let Some(count) = sample {
        let sampling = SamplingConfig { count, seed };
        match query.sample_divergence(&sampling)? {
            Some(divergence) => println!(
                "Sampling found a divergence at {} on [{}]",
                divergence.initial,
                divergence.differing.join(", ")
            ),
            None => println!("Sampling found no divergence"),
        }
    }

    if count <= 1 {
        match query.check(&mut session)? {
            EquivalenceResult::Equivalent { horizon } => {
                println!("Equivalent within {} steps", horizon)
            }
            EquivalenceResult::NotEquivalent(cex) => {
                println!("Not equivalent. Counterexample:");
                println!("{}", cex);
            }
            EquivalenceResult::Unknown(reason) => println!("Unknown: {}", reason),
        }
        return Ok(());
    }

    let set = query.counterexamples(&mut session, Some(count))?;
    if set.counterexamples.is_empty() {
        println!("No counterexamples ({})", set.stop);
    }
    for (i, cex) in set.counterexamples.iter().enumerate() {
        println!("Counterexample {}:", i + 1);
        println!("{}", cex);
    }
    println!(
        "Found {} counterexample(s); stopped: {}",
        set.counterexamples.len(),
        set.stop
    );
    Ok(())
}

fn run_reach(config: SessionConfig, target: &str) -> Result<(), Box<dyn std::error::Error>> {
    let goal = parse_target(target)?;
    let scenario = ChainScenario::new()?;
    let mut session = SolverSession::new(config)?;

    let initial = SymbolicState::shared_initial(&scenario.schema, session.vocabulary_mut())?;
    let workflow = Workflow::build(
        &scenario.schema,
        "chain",
        &initial,
        scenario.steps(),
        session.vocabulary_mut(),
    )?;
    println!("Workflow: {}", workflow);
    println!("Goal: {}", goal);

    match check_reachability(&mut session, &workflow, &goal)? {
        ReachabilityResult::Reachable(trace) => {
            println!("Reachable:");
            for (t, state) in trace.states.iter().enumerate() {
                println!("  t={} {}", t, state);
            }
        }
        ReachabilityResult::Unreachable { horizon } => {
            println!("Unreachable within {} steps", horizon)
        }
        ReachabilityResult::Unknown(reason) => println!("Unknown: {}", reason),
    }
    Ok(())
}

fn run_overlap(config: SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = OverlapScenario::new()?;
    let mut session = SolverSession::new(config)?;
    println!("{}", scenario.first);
    println!("{}", scenario.second);

    match check_overlap(&mut session, &scenario.schema, &scenario.first, &scenario.second)? {
        OverlapResult::Overlapping(state) => println!("Overlapping, e.g. at {}", state),
        OverlapResult::Disjoint => println!("Disjoint"),
        OverlapResult::Unknown(reason) => println!("Unknown: {}", reason),
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = session_config(args.timeout);
    let result = match args.command {
        Commands::Equiv {
            count,
            sample,
            seed,
            observe,
        } => run_equiv(config, count, sample, seed, observe),
        Commands::Reach { target } => run_reach(config, &target),
        Commands::Overlap => run_overlap(config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
