use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;

use copa::solver::reference;
use copa::{Problem, Solver, runtime};

enum RunMode {
    Solve {
        input: PathBuf,
        workers: Option<usize>,
    },
    Verify {
        input: PathBuf,
        workers: Option<usize>,
    },
}

fn usage() -> ! {
    eprintln!("usage: copa <instance> [workers]\n       copa --verify <instance> [workers]");
    std::process::exit(1);
}

fn parse_args() -> Result<RunMode> {
    let mut args = env::args().skip(1);
    let first = args.next().unwrap_or_else(|| usage());
    let (verify, input) = if first == "--verify" {
        (true, args.next().unwrap_or_else(|| usage()))
    } else {
        (false, first)
    };

    let input = PathBuf::from(input);
    if !input.exists() {
        bail!("input {:?} does not exist", input);
    }

    let workers = match args.next() {
        Some(raw) => Some(
            raw.parse::<usize>()
                .with_context(|| format!("bad worker count {:?}", raw))?,
        ),
        None => None,
    };

    Ok(if verify {
        RunMode::Verify { input, workers }
    } else {
        RunMode::Solve { input, workers }
    })
}

fn run_pipeline(input: &PathBuf, workers: Option<usize>) -> Result<Solver> {
    let problem = Problem::from_path(input)?;
    let workers = workers.unwrap_or_else(runtime::default_worker_count);
    eprintln!(
        "[solve] {} items, capacity {}, grid of {} workers",
        problem.len(),
        problem.capacity(),
        workers
    );
    let mut solver = Solver::new(problem, workers)?;
    solver.solve()?;
    Ok(solver)
}

fn report(solver: &Solver) -> Result<()> {
    let solution = solver
        .solution()
        .context("solver finished without a solution")?;
    let (weight, value) = solver.problem().aggregate(solution.mask);
    if value != solution.value {
        bail!(
            "reported value {} disagrees with the selection's aggregate {}",
            solution.value,
            value
        );
    }
    println!("value   {}", solution.value);
    println!("weight  {} / {}", weight, solver.problem().capacity());
    println!("items   {:?}", solution.selected());
    if let Some(elapsed) = solver.elapsed() {
        println!("elapsed {:.3}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn run_verify(input: &PathBuf, workers: Option<usize>) -> Result<()> {
    let solver = run_pipeline(input, workers)?;
    let solution = solver
        .solution()
        .context("solver finished without a solution")?;
    let expected = reference::exhaustive_best(solver.problem())?;
    if solution.value != expected.value {
        bail!(
            "pipeline found {} but the exhaustive reference found {}",
            solution.value,
            expected.value
        );
    }
    let (weight, _) = solver.problem().aggregate(solution.mask);
    if weight > solver.problem().capacity() {
        bail!("selection weighs {} over capacity", weight);
    }
    report(&solver)?;
    println!("verify  ok (exhaustive reference agrees)");
    Ok(())
}

fn main() -> Result<()> {
    runtime::configure_thread_pool();

    match parse_args()? {
        RunMode::Solve { input, workers } => {
            let solver = run_pipeline(&input, workers)?;
            report(&solver)
        }
        RunMode::Verify { input, workers } => run_verify(&input, workers),
    }
}
