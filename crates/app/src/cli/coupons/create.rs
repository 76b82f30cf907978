use clap::Args;
use jiff::Timestamp;
use storefront_app::{
    database::{self, Db},
    domain::coupons::{CouponsService, PgCouponsService, models::NewCoupon},
};

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Coupon code; stored upper-cased
    #[arg(long)]
    code: String,

    /// Discount percentage, 0 to 100
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    percentage: u8,

    /// Minimum order amount in minor units
    #[arg(long, default_value_t = 0)]
    minimum: u64,

    /// Number of orders that may redeem the coupon
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    max_usage: u32,

    /// Expiry timestamp (RFC 3339)
    #[arg(long)]
    expires_at: String,

    #[arg(long)]
    description: Option<String>,
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let expires_at = args
        .expires_at
        .parse::<Timestamp>()
        .map_err(|error| format!("invalid expires-at timestamp: {error}"))?;

    if expires_at <= Timestamp::now() {
        return Err("expires-at must be in the future".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCouponsService::new(Db::new(pool));

    let coupon = service
        .create_coupon(NewCoupon {
            code: args.code,
            discount_percentage: args.percentage,
            minimum_amount: args.minimum,
            max_usage: args.max_usage,
            expires_at,
            description: args.description,
        })
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", coupon.uuid);
    println!("code: {}", coupon.code);
    println!("discount_percentage: {}", coupon.discount_percentage);
    println!("expires_at: {}", coupon.expires_at);

    Ok(())
}
