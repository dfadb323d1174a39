use clap::{Parser, Subcommand};
use guard_portal::prelude::*;
use guard_portal::screens::Notifier;
use std::path::PathBuf;
use std::sync::Arc;

/// Session file used when none is configured, so logins survive between runs
const DEFAULT_SESSION_FILE: &str = ".guard-portal-session.json";

#[derive(Parser, Debug)]
#[clap(name = "guard-portal", version)]
#[clap(about = "Security guard portal client", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Backend base URL. Defaults to GUARD_PORTAL_URL or http://localhost:5000
    #[clap(long)]
    url: Option<String>,

    /// Session file. Defaults to GUARD_PORTAL_SESSION_FILE or ./.guard-portal-session.json
    #[clap(long)]
    session_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in as a guard
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in guard
    Profile,
    /// List entry permissions
    Entries {
        /// Only show entries matching this term
        #[clap(long)]
        search: Option<String>,
        /// Also report permissions that are about to expire
        #[clap(long)]
        expiring: bool,
    },
    /// List service entries, or check one in or out
    ServiceEntries {
        #[clap(long)]
        search: Option<String>,
        /// Check in the service entry with this id
        #[clap(long, conflicts_with = "check_out")]
        check_in: Option<String>,
        /// Check out the service entry with this id
        #[clap(long)]
        check_out: Option<String>,
    },
    /// List or search resident vehicles
    Vehicles {
        /// Server-side search by flat, owner, vehicle name or plate
        #[clap(long)]
        search: Option<String>,
    },
}

fn print_notices(queue: &NoticeQueue) {
    for notice in queue.drain() {
        eprintln!("[{:?}] {}", notice.level, notice);
    }
}

fn ensure_shown(effect: Effect) -> Result<(), Error> {
    match effect {
        Effect::Stay => Ok(()),
        Effect::Navigate(Route::Login) => Err(Error::config(
            "Not logged in. Run `guard-portal login` first.",
        )),
        Effect::Navigate(route) => Err(Error::config(format!("Redirected to {}", route))),
    }
}

async fn run(cli: Cli, notices: &NoticeQueue) -> Result<(), Error> {
    let mut options = ClientOptions::from_env()?;
    if let Some(url) = &cli.url {
        options = options.with_base_url(url);
    }
    let session_file = cli
        .session_file
        .or_else(|| options.session_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));
    options = options.with_session_path(session_file);

    let notifier: Arc<dyn Notifier> = Arc::new(notices.clone());
    let portal = GuardPortal::new_with_notifier(options, notifier)?;

    match cli.command {
        Commands::Login { email, password } => {
            let mut screen = portal.login_screen();
            screen.credentials = Credentials { email, password };
            let _ = screen.submit().await?;
            if let Some(session) = portal.session().get() {
                println!("Logged in as {}", session.account_email);
            }
        }
        Commands::Logout => {
            portal.auth().logout()?;
            println!("Logged out");
        }
        Commands::Profile => {
            let mut screen = portal.profile_screen();
            ensure_shown(screen.load().await)?;
            if let Some(profile) = screen.profile() {
                println!("Email:   {}", profile.email);
                if let Some(role) = &profile.role {
                    println!("Role:    {}", role);
                }
                if let Some(society) = &profile.society {
                    println!("Society: {}", society.name);
                }
            }
        }
        Commands::Entries { search, expiring } => {
            let mut screen = portal.entry_permission_screen();
            ensure_shown(screen.load().await)?;
            if let Some(term) = search {
                screen.set_search_term(term);
            }
            for entry in screen.visible() {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    entry.id,
                    entry.name,
                    entry.flat_number,
                    entry.visitor_type,
                    entry.status
                );
            }
            if expiring {
                screen.check_expiring().await;
            }
        }
        Commands::ServiceEntries {
            search,
            check_in,
            check_out,
        } => {
            let mut screen = portal.service_entry_screen();
            ensure_shown(screen.load().await)?;
            if let Some(id) = check_in {
                ensure_shown(screen.check_in(&id).await?)?;
            }
            if let Some(id) = check_out {
                ensure_shown(screen.check_out(&id).await?)?;
            }
            if let Some(term) = search {
                screen.set_search_term(term);
            }
            for entry in screen.visible() {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    entry.id, entry.name, entry.phone_number, entry.visitor_type, entry.status
                );
            }
        }
        Commands::Vehicles { search } => {
            let mut screen = portal.vehicle_screen();
            let effect = match search {
                Some(term) => {
                    let ticket = screen.search_input(term);
                    screen.apply_search(ticket).await
                }
                None => screen.load().await,
            };
            ensure_shown(effect)?;
            for vehicle in screen.records() {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    vehicle.id,
                    vehicle.owner_name,
                    vehicle.flat_number,
                    vehicle.vehicle_type.as_str(),
                    vehicle.vehicle_name,
                    vehicle.number_plate
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();
    let notices = NoticeQueue::new();
    let result = run(cli, &notices).await;
    print_notices(&notices);

    if let Err(err) = result {
        eprintln!("Error: {}", err.user_message());
        std::process::exit(1);
    }
}
