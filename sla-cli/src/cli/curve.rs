use super::AnyResult;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct CurveArgs {
    /// Suspension configuration file (in CSV format)
    config: PathBuf,
    /// Displacement step
    #[clap(long, default_value_t = 0.05)]
    step: f64,
    /// Displacement range on both sides of the static state
    #[clap(long, default_value_t = 3.)]
    range: f64,
    /// Output folder, default to the folder of the configuration file
    #[clap(short, long)]
    out: Option<PathBuf>,
}

pub(super) fn curve(args: CurveArgs) -> AnyResult {
    let CurveArgs { config, step, range, out } = args;
    println!("config={}, step={step}, range={range}", config.display());
    let cfg = sla::read_config(&config)?;
    cfg.state.validate()?;
    let dir = super::out_dir(out, &config)?;
    let failed = super::write_curves(&dir, &cfg.state, step, range)?;
    match failed.into_iter().next() {
        Some((corner, e)) => Err(format!("{corner} corner: {e}").into()),
        None => Ok(()),
    }
}
