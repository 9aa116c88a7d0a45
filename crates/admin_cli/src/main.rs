use std::error::Error;

use chrono::{Duration, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use engine::{Engine, TenantId};
use jsonwebtoken::{EncodingKey, Header, encode};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "marcenaria_admin")]
#[command(about = "Admin utilities for Marcenaria (development tokens, budget numbering)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./marcenaria.db?mode=rwc"
    )]
    database_url: String,

    /// Timezone that decides the budget year.
    #[arg(
        long,
        env = "MARCENARIA__COMPANY__TIMEZONE",
        default_value = "America/Sao_Paulo"
    )]
    timezone: Tz,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Token(Token),
    Budget(Budget),
}

#[derive(Args, Debug)]
struct Token {
    #[command(subcommand)]
    command: TokenCommand,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Prints an HS256 bearer token for a tenant.
    Issue(TokenIssueArgs),
}

#[derive(Args, Debug)]
struct TokenIssueArgs {
    #[arg(long)]
    tenant: String,
    /// Shared secret the server verifies with (`auth.secret`).
    #[arg(long, env = "MARCENARIA__AUTH__SECRET")]
    secret: String,
    #[arg(long, default_value_t = 3600)]
    ttl_secs: i64,
    #[arg(long)]
    issuer: Option<String>,
    #[arg(long, default_value = "authenticated")]
    audience: String,
}

#[derive(Args, Debug)]
struct Budget {
    #[command(subcommand)]
    command: BudgetCommand,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Lists a tenant's budgets, newest first.
    List(TenantArgs),
    /// Shows the number the next budget of a tenant would get.
    NextNumber(TenantArgs),
}

#[derive(Args, Debug)]
struct TenantArgs {
    #[arg(long)]
    tenant: String,
}

#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    iat: i64,
    exp: i64,
    aud: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    iss: Option<&'a str>,
}

fn issue_token(args: &TokenIssueArgs) -> Result<String, Box<dyn Error + Send + Sync>> {
    let tenant = TenantId::new(&args.tenant)?;
    if args.ttl_secs <= 0 {
        return Err("ttl must be positive".into());
    }

    let now = Utc::now();
    let claims = Claims {
        sub: tenant.as_str(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(args.ttl_secs)).timestamp(),
        aud: &args.audience,
        iss: args.issuer.as_deref(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(args.secret.as_bytes()),
    )?;
    Ok(token)
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn engine(database_url: &str, timezone: Tz) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    let db = connect_db(database_url).await?;
    Ok(Engine::builder()
        .database(db)
        .timezone(timezone)
        .build()
        .await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Token(Token {
            command: TokenCommand::Issue(args),
        }) => {
            println!("{}", issue_token(&args)?);
        }
        Command::Budget(Budget {
            command: BudgetCommand::List(args),
        }) => {
            let tenant = TenantId::new(args.tenant)?;
            let engine = engine(&cli.database_url, cli.timezone).await?;
            let budgets = engine.list_budgets(&tenant).await?;
            if budgets.is_empty() {
                println!("no budgets for tenant {tenant}");
            }
            for budget in budgets {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    budget.number,
                    budget.created_at.format("%Y-%m-%d"),
                    budget.status.as_str(),
                    budget.final_amount,
                    budget.title
                );
            }
        }
        Command::Budget(Budget {
            command: BudgetCommand::NextNumber(args),
        }) => {
            let tenant = TenantId::new(args.tenant)?;
            let engine = engine(&cli.database_url, cli.timezone).await?;
            println!("{}", engine.next_budget_number(&tenant).await?);
        }
    }

    Ok(())
}
