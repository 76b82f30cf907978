use clap::{Args, Subcommand};

mod recalculate;

#[derive(Debug, Args)]
pub(crate) struct ScoresCommand {
    #[command(subcommand)]
    command: ScoresSubcommand,
}

#[derive(Debug, Subcommand)]
enum ScoresSubcommand {
    /// Recompute every account's score from the cards it owns
    Recalculate(recalculate::RecalculateArgs),
}

pub(crate) async fn run(command: ScoresCommand) -> Result<(), String> {
    match command.command {
        ScoresSubcommand::Recalculate(args) => recalculate::run(args).await,
    }
}
