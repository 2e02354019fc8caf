use std::path::{Path, PathBuf};

mod curve;
mod opt;

const APP_NAME: &str = env!("CARGO_BIN_NAME");

type AnyResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(clap::Parser)]
#[clap(name = APP_NAME, version, author, about)]
pub(crate) struct Entry {
    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(clap::Subcommand)]
enum Cmd {
    /// Compute the camber and roll-center curves of both corners
    Curve(curve::CurveArgs),
    /// Fit the hardpoints to a target camber curve
    Opt(opt::OptArgs),
}

impl Entry {
    pub(crate) fn main() {
        let entry = <Self as clap::Parser>::parse_from(wild::args());
        register_panic_hook();
        let res = match entry.cmd {
            Cmd::Curve(args) => curve::curve(args),
            Cmd::Opt(args) => opt::opt(args),
        };
        if let Err(e) = res {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn register_panic_hook() {
    // Print panic messages without stack trace
    std::panic::set_hook(Box::new(|info| {
        match info.payload().downcast_ref::<&str>() {
            Some(s) => eprintln!("{s}"),
            None => eprintln!("{info}"),
        }
        std::process::exit(1);
    }));
}

// Output directory, default to the folder of the input file
fn out_dir(out: Option<PathBuf>, input: &Path) -> AnyResult<PathBuf> {
    let dir = match out {
        Some(dir) => dir,
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

// Write the curves of both corners, the failed corners are returned
fn write_curves(
    dir: &Path,
    state: &sla::SuspensionState,
    step: f64,
    range: f64,
) -> AnyResult<Vec<(sla::Corner, sla::Error)>> {
    let mut failed = Vec::new();
    for corner in sla::Corner::ALL {
        match sla::compute_curve(state, corner, step, range) {
            Ok(curve) => {
                let path = dir.join(format!("{}_curves.csv", corner.name_uppercase()));
                std::fs::write(&path, curve.to_csv()?)?;
                let [c_min, c_max] = min_max(&curve.camber);
                let [r_min, r_max] = min_max(&curve.roll_center);
                println!(
                    "corner={corner}, samples={}, camber=[{c_min:.4}, {c_max:.4}], rch=[{r_min:.4}, {r_max:.4}]",
                    curve.len()
                );
                println!("Write to: {}", path.display());
            }
            Err(e) => failed.push((corner, e)),
        }
    }
    Ok(failed)
}

fn min_max(v: &[f64]) -> [f64; 2] {
    v.iter()
        .fold([f64::INFINITY, f64::NEG_INFINITY], |[a, b], &x| [a.min(x), b.max(x)])
}
