use clap::{Parser, Subcommand};
use contacts_api::{
    config::AppConfig,
    db,
    models::UserSignup,
    repositories::SqliteUserRepository,
    services::UserService,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "contacts-cli")]
#[command(about = "CLI tool for managing Contacts API users", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Username (5-16 characters)
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,

        /// Mark email as confirmed
        #[arg(long)]
        confirmed: bool,
    },

    /// List all users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Delete a user and all of their contacts
    Delete {
        /// Email address of the user to delete
        #[arg(short, long)]
        email: String,
    },

    /// Confirm a user's email
    Confirm {
        /// Email address of the user to confirm
        #[arg(short, long)]
        email: String,
    },
}

fn get_password(prompt: &str) -> anyhow::Result<String> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn fail(message: String) -> ! {
    eprintln!("❌ {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    // Connect to database
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let user_service = UserService::new(user_repository);

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                username,
                email,
                password,
                confirmed,
            } => {
                let password = match password {
                    Some(pw) => pw,
                    None => {
                        let password = get_password("Password")?;
                        if password != get_password("Confirm password")? {
                            fail("Passwords do not match".to_string());
                        }
                        password
                    }
                };

                let signup = UserSignup {
                    username,
                    email,
                    password,
                };

                match user_service
                    .create_user_with_status(signup, confirmed)
                    .await
                {
                    Ok(user) => {
                        println!("✅ User created successfully!");
                        println!("  ID: {}", user.id);
                        println!("  Username: {}", user.username);
                        println!("  Email: {}", user.email);
                        println!("  Confirmed: {}", user.confirmed);
                    }
                    Err(err) => fail(format!("Failed to create user: {}", err)),
                }
            }

            UserCommands::List { limit, offset } => {
                match user_service.list_users(Some(limit), Some(offset)).await {
                    Ok(users) if users.is_empty() => println!("No users found."),
                    Ok(users) => {
                        println!(
                            "{:<5} {:<16} {:<32} {:<10} {:<20}",
                            "ID", "Username", "Email", "Confirmed", "Created"
                        );
                        println!("{}", "-".repeat(86));
                        for user in users {
                            println!(
                                "{:<5} {:<16} {:<32} {:<10} {:<20}",
                                user.id,
                                user.username,
                                user.email,
                                if user.confirmed { "Yes" } else { "No" },
                                user.created_at
                            );
                        }
                    }
                    Err(err) => fail(format!("Failed to list users: {}", err)),
                }
            }

            UserCommands::Delete { email } => match user_service.find_user_by_email(&email).await {
                Ok(Some(user)) => match user_service.delete_user(user.id).await {
                    Ok(()) => println!("✅ User '{}' deleted successfully!", email),
                    Err(err) => fail(format!("Failed to delete user: {}", err)),
                },
                Ok(None) => fail(format!("User '{}' not found", email)),
                Err(err) => fail(format!("Failed to find user: {}", err)),
            },

            UserCommands::Confirm { email } => match user_service.find_user_by_email(&email).await {
                Ok(Some(user)) if user.confirmed => {
                    println!("ℹ️  User '{}' is already confirmed", email);
                }
                Ok(Some(_)) => match user_service.confirm_email(&email).await {
                    Ok(()) => println!("✅ User '{}' email confirmed successfully!", email),
                    Err(err) => fail(format!("Failed to confirm user: {}", err)),
                },
                Ok(None) => fail(format!("User '{}' not found", email)),
                Err(err) => fail(format!("Failed to find user: {}", err)),
            },
        },
    }

    pool.close().await;
    Ok(())
}
