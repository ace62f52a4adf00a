use anyhow::{Context, Result};
use breadplan_cli::cli::{Cli, Commands, SolveArgs, ValidateArgs};
use breadplan_cli::output::PlanOutputView;
use breadplan_cli::problem::{load_problem, LoadedProblem};
use breadplan_solver::{
    build_model, extract_solution, solve_rolling_horizon, PlanError, PlanOutput, PlanningInputs, RollingHorizonConfig,
};
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing::{info, warn};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(4)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Solve(args) => run_solve(args),
        Commands::Validate(args) => run_validate(args),
    }
}

fn run_validate(args: ValidateArgs) -> Result<ExitCode> {
    let problem = load_problem(&args.problem)?;
    let inputs = planning_inputs(&problem);
    match build_model(&inputs) {
        Ok(built) => {
            for warning in &built.context.warnings {
                warn!("{warning}");
            }
            println!("ok: problem is valid ({} warnings)", built.context.warnings.len());
            Ok(ExitCode::from(0))
        }
        Err(err) => {
            eprintln!("invalid: {err}");
            Ok(exit_code_for_error(&err))
        }
    }
}

fn run_solve(args: SolveArgs) -> Result<ExitCode> {
    let mut problem = load_problem(&args.problem)?;
    if let Some(limit) = args.time_limit_seconds {
        problem.solver_config.time_limit_seconds = limit;
    }
    if let Some(gap) = args.mip_gap {
        problem.solver_config.mip_gap = gap;
    }

    let rolling_config = if args.rolling {
        Some(RollingHorizonConfig {
            window_days: args.window_days,
            overlap_days: args.overlap_days,
        })
    } else {
        problem.rolling_horizon_config.clone()
    };

    info!(problem = %args.problem.display(), "loaded problem");

    let result = if let Some(rolling_config) = rolling_config {
        solve_rolling_horizon(
            &problem.network,
            &problem.trucks,
            &problem.labor,
            &problem.forecast,
            &problem.costs,
            &problem.products,
            problem.horizon,
            &rolling_config,
            &problem.planning_config,
            &problem.solver_config,
        )
    } else {
        solve_monolithic(&problem)
    };

    let output = match result {
        Ok(output) => output,
        Err(err) => {
            eprintln!("solve failed: {err}");
            return Ok(exit_code_for_error(&err));
        }
    };

    let exit_code = exit_code_for_status(&output);
    write_output(&output, &args)?;
    Ok(exit_code)
}

fn solve_monolithic(problem: &LoadedProblem) -> Result<PlanOutput, PlanError> {
    let inputs = planning_inputs(problem);
    let built = build_model(&inputs)?;
    let (report, context) = built.solve(&problem.solver_config)?;
    Ok(extract_solution(&report.solution, &context, &problem.costs, &report))
}

fn planning_inputs(problem: &LoadedProblem) -> PlanningInputs<'_> {
    PlanningInputs {
        network: &problem.network,
        trucks: &problem.trucks,
        labor: &problem.labor,
        forecast: &problem.forecast,
        costs: &problem.costs,
        products: &problem.products,
        horizon: problem.horizon,
        initial_inventory: &problem.initial_inventory,
        config: &problem.planning_config,
    }
}

fn write_output(output: &PlanOutput, args: &SolveArgs) -> Result<()> {
    let view = PlanOutputView::from_output(output);
    let json = serde_json::to_string_pretty(&view).context("serializing plan output")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing output to {}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{json}").context("writing output to stdout")?;
        }
    }
    Ok(())
}

/// Maps a terminal solve result to the exit codes of spec §6: 0 optimal, 1
/// feasible with gap.
fn exit_code_for_status(output: &PlanOutput) -> ExitCode {
    match output.solver_status.termination {
        breadplan_solver::TerminationStatus::Optimal => ExitCode::from(0),
        breadplan_solver::TerminationStatus::FeasibleWithGap { .. } => ExitCode::from(1),
    }
}

/// Maps a fatal [`PlanError`] to the remaining exit codes of spec §6: 2 time
/// limit with no solution, 3 infeasible, 4 invalid input, 5 solver
/// unavailable.
fn exit_code_for_error(err: &PlanError) -> ExitCode {
    match err {
        PlanError::TimeLimitWithoutSolution => ExitCode::from(2),
        PlanError::Infeasible { .. } => ExitCode::from(3),
        PlanError::InputValidation(_) | PlanError::NetworkInfeasibility(_) | PlanError::ModelBuild(_) => {
            ExitCode::from(4)
        }
        PlanError::Solver(_) => ExitCode::from(5),
    }
}
