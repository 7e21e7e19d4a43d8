use clap::{Parser, Subcommand};
use jobboard::commands::{self, CommandContext};
use jobboard::components::job_store::StatusFilter;
use jobboard::startup;

#[derive(Parser)]
#[command(name = "jobboard", version, about = "Daily job board backed by Google Calendar")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a day's jobs
    List {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// "all" or an exact status
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// Case-insensitive text matched against title, location, notes and tech
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show a single job
    Show {
        event_id: String,
        /// Day the job is on (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Print the calendar event as JSON
        #[arg(long)]
        raw: bool,
    },
    /// Set a job's status
    Status { event_id: String, status: String },
    /// Assign a technician (empty string to clear)
    Assign { event_id: String, tech: String },
    /// Authorize read access to Google Calendar
    SignIn,
    /// Revoke and forget the stored authorization
    SignOut,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let cli = Cli::parse();

    // Load configuration
    let config = startup::load_config()?;
    let mut ctx = CommandContext::new(config)?;

    let output = match cli.command {
        Command::List {
            date,
            status,
            search,
        } => commands::jobs::list(&mut ctx, date.as_deref(), status, &search).await?,
        Command::Show {
            event_id,
            date,
            raw,
        } => commands::jobs::show(&mut ctx, &event_id, date.as_deref(), raw).await?,
        Command::Status { event_id, status } => {
            commands::jobs::set_status(&ctx, &event_id, &status).await?
        }
        Command::Assign { event_id, tech } => {
            commands::jobs::assign(&ctx, &event_id, &tech).await?
        }
        Command::SignIn => commands::auth::sign_in(&mut ctx).await?,
        Command::SignOut => commands::auth::sign_out(&mut ctx).await?,
    };

    print!("{}", output);
    Ok(())
}
