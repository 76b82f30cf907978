use clap::{Parser, Subcommand};

mod coupons;
mod migrate;
mod scores;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate(migrate::MigrateArgs),
    Scores(scores::ScoresCommand),
    Coupons(coupons::CouponsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Migrate(args) => migrate::run(args).await,
            Commands::Scores(command) => scores::run(command).await,
            Commands::Coupons(command) => coupons::run(command).await,
        }
    }
}
