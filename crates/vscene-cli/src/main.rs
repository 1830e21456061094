mod cli;
mod commands;
mod error;
mod script;

use cli::{args, Command};

fn main() -> anyhow::Result<()> {
    let args = args().run();

    if args.verbose {
        tracing_subscriber::fmt::init();
    }

    match args.command {
        Command::Build { script, out } => commands::build::run(&script, &out),
        Command::Inspect { script } => commands::inspect::run(&script),
        Command::Roundtrip { script, archive_dir } => commands::roundtrip::run(&script, &archive_dir),
    }
}
