use clap::{Parser, Subcommand};

use self::train::TrainArg;

mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train the deterioration model and export the rule configuration
    Train(#[clap(flatten)] TrainArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or_else(|| Mode::Train(TrainArg::default())) {
        Mode::Train(arg) => train::run(&arg)?,
    }
    Ok(())
}
