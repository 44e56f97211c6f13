use anyhow::Result;
use footy_bots::config::Config;
use footy_bots::database::connection::DatabaseManager;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn run_migrations() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    println!("Connecting to {}", config.database_url);
    let db = DatabaseManager::new(&config.database_url).await?;
    db.run_migrations().await?;
    println!("Migrations applied");
    Ok(())
}

async fn check_database() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let db = DatabaseManager::new(&config.database_url).await?;
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&db.pool)
        .await?;
    println!("Database reachable at {}", config.database_url);
    Ok(())
}

fn print_help() {
    println!("Usage: migrate [COMMAND]");
    println!();
    println!("Commands:");
    println!("  migrate, up   Apply pending migrations (default)");
    println!("  check         Verify the database is reachable");
    println!("  help          Show this message");
}
