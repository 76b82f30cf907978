use clap::{Args, Subcommand};

mod create;

#[derive(Debug, Args)]
pub(crate) struct CouponsCommand {
    #[command(subcommand)]
    command: CouponsSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponsSubcommand {
    Create(create::CreateCouponArgs),
}

pub(crate) async fn run(command: CouponsCommand) -> Result<(), String> {
    match command.command {
        CouponsSubcommand::Create(args) => create::run(args).await,
    }
}
