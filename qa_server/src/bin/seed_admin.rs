//! Create the initial admin account.
//!
//! Reads the same `.env`/environment as the server for the database settings.

use anyhow::{Context, Error, bail};
use pico_args::Arguments;
use qa_server::{
    logging,
    seed::{AdminAccount, SeedOutcome, seed_admin},
};
use qcall_admin::{
    AuthManager,
    db::{Database, DatabaseConfig, MongoRepository},
};

const HELP: &str = "\
Create the QCall admin account

USAGE:
  seed_admin --email EMAIL --password PASSWORD [OPTIONS]

OPTIONS:
  --email       EMAIL     Login email of the admin
  --password    PASSWORD  Plain-text password, stored as an Argon2id hash
  --first-name  NAME      [default: Super]
  --last-name   NAME      [default: Admin]
  --db-uri      URI       MongoDB connection string [default: env DB_URI]

FLAGS:
  --reset                 Replace the password if the account already exists
  -h, --help              Print help information
";

struct Args {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    db_uri: Option<String>,
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        reset: pargs.contains("--reset"),
        email: pargs.value_from_str("--email").context("--email is required")?,
        password: pargs
            .value_from_str("--password")
            .context("--password is required")?,
        first_name: pargs
            .opt_value_from_str("--first-name")?
            .unwrap_or_else(|| "Super".to_string()),
        last_name: pargs
            .opt_value_from_str("--last-name")?
            .unwrap_or_else(|| "Admin".to_string()),
        db_uri: pargs.opt_value_from_str("--db-uri")?,
    };

    logging::init();

    if args.email.trim().is_empty() || args.password.is_empty() {
        bail!("Email and password must not be empty");
    }

    let db_uri = args
        .db_uri
        .or_else(|| std::env::var("DB_URI").ok())
        .context("DB_URI is not set and --db-uri was not given")?;
    let db_name = std::env::var("DB_NAME").unwrap_or_else(|_| "qcall_db".to_string());

    let db = Database::connect(&DatabaseConfig::new(db_uri, db_name))
        .await
        .context("Failed to connect to database")?;
    let users = MongoRepository::new(&db);

    let password_hash = AuthManager::hash_password(&args.password)?;

    let account = AdminAccount {
        email: args.email.clone(),
        first_name: args.first_name,
        last_name: args.last_name,
        password_hash,
    };
    let outcome = seed_admin(&users, account, args.reset).await;
    db.shutdown().await;

    match outcome? {
        SeedOutcome::Created(id) => tracing::info!(email = %args.email, %id, "Admin created"),
        SeedOutcome::PasswordReset => tracing::info!(email = %args.email, "Admin password reset"),
        SeedOutcome::AlreadyExists => tracing::warn!(
            email = %args.email,
            "Admin already exists, pass --reset to replace the password"
        ),
        SeedOutcome::NotAdmin { role } => {
            bail!("{} belongs to a non-admin account (role {role}), left unchanged", args.email)
        }
    }

    Ok(())
}