use anyhow::Result;
use clap::{Parser, Subcommand};
use ipay_engine::{SqliteDatabase, SQLITE_DB_URL};
use log::info;

mod accounts;
mod seed;

use accounts::{create_employee, print_password_hash, CreateEmployeeParams, HashPasswordParams};
use seed::{print_seed_summary, seed_database};

#[derive(Parser, Debug)]
#[command(version, about = "Administrative tools for the international payments portal")]
pub struct Arguments {
    /// The database to operate on
    #[arg(short = 'd', long, env = "IPAY_DATABASE_URL", default_value = SQLITE_DB_URL, global = true)]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new employee account. You are prompted for the password if it is not provided.
    CreateEmployee(CreateEmployeeParams),
    /// Insert demo employees, customers and transactions. Does nothing if any user already exists.
    ///
    /// Seeding is not atomic. If it fails partway, delete the database and run it again.
    Seed,
    /// Print the bcrypt hash of a password
    HashPassword(HashPasswordParams),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Arguments) -> Result<()> {
    match cli.command {
        Command::HashPassword(params) => print_password_hash(params).await,
        Command::CreateEmployee(params) => {
            let db = open_database(&cli.database_url).await?;
            let result = create_employee(&db, params).await;
            db.close().await;
            let user = result?;
            println!("Employee account created. id: {}, username: {}", user.id, user.username);
            Ok(())
        },
        Command::Seed => {
            let db = open_database(&cli.database_url).await?;
            let result = seed_database(&db).await;
            db.close().await;
            match result? {
                Some(summary) => print_seed_summary(&summary),
                None => println!("The database already has users. Skipping seed."),
            }
            Ok(())
        },
    }
}

async fn open_database(url: &str) -> Result<SqliteDatabase> {
    let db = SqliteDatabase::new_with_url(url, 1).await?;
    db.migrate().await?;
    info!("🗃️ Connected to {url}");
    Ok(db)
}
