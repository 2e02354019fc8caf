use super::AnyResult;
use indicatif::{ProgressBar, ProgressStyle};
use sla::{config, opt, Corner, Schema, SuspensionState, TargetCurve};
use std::{ffi::OsStr, path::PathBuf, time::Instant};

#[derive(clap::Args)]
pub(super) struct OptArgs {
    /// Suspension configuration file with bounds (in CSV format)
    config: PathBuf,
    /// Target camber curve, rows of displacement and camber (in CSV format)
    target: PathBuf,
    /// The corner fitted to the target
    #[clap(long, value_enum, default_value_t = Corner::Front)]
    corner: Corner,
    /// Number of restarts
    #[clap(short, long, default_value_t = 5)]
    restarts: usize,
    /// Tolerance of the local search
    #[clap(long, default_value_t = opt::OptCfg::default().tol)]
    tol: f64,
    /// Maximum iterations of each restart
    #[clap(long, default_value_t = opt::OptCfg::default().max_iters)]
    max_iters: u64,
    /// Fix the seed to get a determined result, default to random
    #[clap(short, long)]
    seed: Option<u64>,
    /// Disable parallel computing
    #[clap(long)]
    no_parallel: bool,
    /// Keep the tire contact patches out of the parameters
    #[clap(long)]
    fixed_contact_patch: bool,
    /// Output folder, default to the folder of the configuration file
    #[clap(short, long)]
    out: Option<PathBuf>,
}

#[derive(serde::Serialize)]
struct Report<'a> {
    corner: Corner,
    cost: f64,
    seed: u64,
    restarts: Vec<TrialReport>,
    state: &'a SuspensionState,
}

#[derive(serde::Serialize)]
struct TrialReport {
    restart: usize,
    cost: f64,
    iterations: u64,
    converged: bool,
}

pub(super) fn opt(args: OptArgs) -> AnyResult {
    let OptArgs {
        config,
        target,
        corner,
        restarts,
        tol,
        max_iters,
        seed,
        no_parallel,
        fixed_contact_patch,
        out,
    } = args;
    println!(
        "corner={corner}, restarts={restarts}, tol={tol}, max_iters={max_iters}, parallel={}",
        !no_parallel
    );
    let cfg = config::read_config(&config)?;
    cfg.state.validate()?;
    let schema = if fixed_contact_patch {
        Schema::without_contact_patches()
    } else {
        Schema::full()
    };
    let guess = cfg.initial_guess(&schema);
    let bounds = cfg.bounds(&schema)?;
    for i in bounds.out_of_bounds(&guess) {
        let [lo, hi] = bounds.as_slice()[i];
        let name = match schema.locate(i) {
            Some((key, c)) if key.arity() > 1 => format!("{key}[{}]", ["x", "y", "z"][c]),
            Some((key, _)) => key.to_string(),
            None => i.to_string(),
        };
        eprintln!("warning: initial guess of {name} = {} is outside [{lo}, {hi}]", guess[i]);
    }
    println!("free={}/{}", bounds.free_indices().len(), bounds.len());
    let tar = TargetCurve::read(&target)?;
    let opt_cfg = opt::OptCfg {
        corner,
        schema,
        base: cfg.state.clone(),
        tol,
        max_iters,
        seed,
        parallel: !no_parallel,
    };
    const STYLE: &str = "{elapsed_precise} {wide_bar} {pos}/{len} {msg}";
    let pb = ProgressBar::new(restarts as u64);
    pb.set_style(ProgressStyle::with_template(STYLE)?);
    let t0 = Instant::now();
    let s = opt::optimize_with(&tar, &guess, &bounds, restarts, &opt_cfg, |_| pb.inc(1))?;
    let spent_time = t0.elapsed();
    pb.finish_with_message(format!("| cost: {:.6}", s.cost));
    for t in s.unconverged() {
        eprintln!(
            "warning: restart {} did not converge in {} iterations (cost={:.6})",
            t.restart, t.iterations, t.cost
        );
    }
    println!("cost={}, seed={}, time={spent_time:?}", s.cost, s.seed);
    // Outputs
    let dir = super::out_dir(out, &config)?;
    let stem = config.file_stem().and_then(OsStr::to_str).unwrap_or("sla");
    {
        let path = dir.join(format!("{stem}_result.csv"));
        std::fs::write(&path, config::dump_config(&s.state, Some(&cfg.table))?)?;
        println!("Write to: {}", path.display());
    }
    {
        let restarts = s
            .trials
            .iter()
            .map(|t| TrialReport {
                restart: t.restart,
                cost: t.cost,
                iterations: t.iterations,
                converged: t.converged,
            })
            .collect();
        let report = Report { corner, cost: s.cost, seed: s.seed, restarts, state: &s.state };
        let path = dir.join(format!("{stem}_result.ron"));
        std::fs::write(&path, ron::ser::to_string_pretty(&report, Default::default())?)?;
        println!("Write to: {}", path.display());
    }
    let step = 0.05;
    let range = tar.displacement.iter().fold(3f64, |r, d| r.max(d.abs()));
    for (corner, e) in super::write_curves(&dir, &s.state, step, range)? {
        eprintln!("warning: no curves of the {corner} corner: {e}");
    }
    Ok(())
}
