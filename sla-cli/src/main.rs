//! SLA command line interface.
mod cli;

fn main() {
    cli::Entry::main();
}
