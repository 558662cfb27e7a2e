//! Seed or rotate an admin account from the command line.

use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(name = "create-admin", about = "Create or update an admin account")]
struct Args {
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    email: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let config = atrium_api::config::AppConfig::from_env();
    let pool = atrium_api::database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    atrium_api::database::migrate(&pool)
        .await
        .context("failed to run migrations")?;

    let hash = atrium_api::auth::hash_password(&args.password)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;

    sqlx::query(
        "INSERT INTO admins (username, password_hash, email) VALUES ($1, $2, $3) \
         ON CONFLICT (username) DO UPDATE \
         SET password_hash = EXCLUDED.password_hash, email = EXCLUDED.email",
    )
    .bind(&args.username)
    .bind(&hash)
    .bind(&args.email)
    .execute(&pool)
    .await
    .context("failed to upsert admin")?;

    println!("admin '{}' ready", args.username);
    Ok(())
}
