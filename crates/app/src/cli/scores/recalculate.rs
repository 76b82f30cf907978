use clap::Args;
use storefront_app::{
    database::{self, Db},
    domain::accounts::{AccountsService, PgAccountsService},
};

#[derive(Debug, Args)]
pub(crate) struct RecalculateArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: RecalculateArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgAccountsService::new(Db::new(pool));

    let accounts = service
        .list_account_ids()
        .await
        .map_err(|error| format!("failed to list accounts: {error}"))?;

    let mut failed = 0_usize;

    for account in &accounts {
        match service.recalculate_score(*account).await {
            Ok(score) => println!("{account}: {score}"),
            Err(error) => {
                failed += 1;
                eprintln!("{account}: failed to recalculate score: {error}");
            }
        }
    }

    println!("recalculated {} of {} accounts", accounts.len() - failed, accounts.len());

    if failed > 0 {
        return Err(format!("{failed} accounts could not be recalculated"));
    }

    Ok(())
}
