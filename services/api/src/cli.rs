use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::io::BufRead;
use talent_ats::auth::hash_password;
use talent_ats::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Talent ATS",
    about = "Run the recruitment intake service or walk an application through the intake steps",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk a sample candidate through every intake step and submit the application
    Demo(DemoArgs),
    /// Print an ADMIN_PASSWORD_HASH value for the given password
    HashPassword(HashPasswordArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct HashPasswordArgs {
    /// Password to hash; read from the first line of stdin when omitted
    #[arg(long)]
    pub(crate) password: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
        Command::HashPassword(args) => run_hash_password(args),
    }
}

fn run_hash_password(args: HashPasswordArgs) -> Result<(), AppError> {
    let password = match args.password {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    println!("{}", encode_password(&password)?);
    Ok(())
}

fn encode_password(password: &str) -> Result<String, AppError> {
    if password.is_empty() {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "password must not be empty",
        )));
    }
    Ok(hash_password(password)?)
}
