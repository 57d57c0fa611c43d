use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use likeboost::admin::{
    AutoLikeAdmin, LimitsForm, NewAutoLikeForm, NewUserForm, UserAdmin, UserQuery, UserSort,
};
use likeboost::client::{CredentialSession, DEFAULT_SESSION, FileAuthStore, current_profile};
use likeboost::config::{Config, DEFAULT_CONFIG_FILE, PartialConfig};
use likeboost::display;
use likeboost::history::{AutoLikeHistoryView, HistoryKind, HistoryTabs};
use likeboost::orchestrator::RequestOrchestrator;
use likeboost::quota::QuotaTracker;
use likeboost::routes::Route;
use likeboost_common::error::{AuthError, ClientError};
use miette::Result;
use tracing_subscriber::EnvFilter;

type Session = CredentialSession<FileAuthStore, reqwest::Client>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Request likes and manage the likeboost backend")]
struct Args {
    /// Path to KDL config file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Backend base URL (overrides SUPABASE_URL and the config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Project anon key (overrides SUPABASE_ANON_KEY and the config file)
    #[arg(long)]
    anon_key: Option<String>,

    /// Send demo UIDs to the backend like any other
    #[arg(long)]
    no_demo: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(long, env = "LIKEBOOST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Show requests remaining today
    Quota,
    /// Request likes for a game UID
    Request { uid: String },
    /// Browse request history
    History {
        /// Show automated runs instead of manual requests
        #[arg(long)]
        auto: bool,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Browse automated run history
    AutoLikeHistory {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Manage scheduled auto-likes
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Manage users and their limits
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    /// Open the view behind a path such as `/history`
    Open { path: String },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    List,
    Add { uid: String },
    Toggle { id: String },
    Delete {
        id: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List {
        /// Case-insensitive email filter
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = SortArg::CreatedAt)]
        sort: SortArg,
    },
    Create {
        email: String,
        #[arg(long, env = "LIKEBOOST_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Set a user's daily and extra allowance
    Limits {
        user_id: String,
        #[arg(long)]
        daily: Option<String>,
        #[arg(long)]
        extra: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    CreatedAt,
    Email,
}

impl From<SortArg> for UserSort {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::CreatedAt => UserSort::CreatedAt,
            SortArg::Email => UserSort::Email,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "likeboost=debug,info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args).await?;
    tracing::debug!(backend = %config.backend_url, session_file = ?config.session_file, "config loaded");

    let session = Arc::new(CredentialSession::new(
        Arc::new(FileAuthStore::new(&config.session_file)),
        Arc::new(reqwest::Client::new()),
        config.backend_url.clone(),
        config.anon_key.clone(),
    ));

    if !matches!(args.command, Command::Login { .. }) {
        match session.restore(DEFAULT_SESSION).await {
            Ok(_) => {}
            Err(ClientError::Auth(AuthError::NotAuthenticated)) => {
                tracing::debug!("no stored session, continuing signed out")
            }
            Err(e) => return Err(e.into()),
        }
    }

    run(args.command, &session, &config).await
}

async fn load_config(args: &Args) -> Result<Config> {
    let from_file = PartialConfig::from_file(&args.config, true).await?;
    let from_flags = PartialConfig {
        backend_url: args.backend_url.clone(),
        anon_key: args.anon_key.as_deref().map(Into::into),
        demo_enabled: args.no_demo.then_some(false),
        ..Default::default()
    };
    Ok(from_file
        .merge(PartialConfig::from_env())
        .merge(from_flags)
        .resolve()?)
}

async fn run(command: Command, session: &Arc<Session>, config: &Config) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let signed_in = session.login(&email, &password, None).await?;
            println!(
                "signed in as {}",
                signed_in.email.as_deref().unwrap_or(&signed_in.user_id)
            );
        }
        Command::Logout => {
            session.logout().await?;
            println!("signed out");
        }
        Command::Whoami => match current_profile(&**session).await? {
            Some(profile) => println!(
                "{} ({}){}",
                profile.email.as_deref().unwrap_or("no email"),
                profile.id,
                if profile.is_admin { " [admin]" } else { "" }
            ),
            None => println!("not signed in"),
        },
        Command::Quota => {
            let (_, rx) = tokio::sync::watch::channel(0);
            let mut quota = QuotaTracker::new(rx);
            println!("{}", display::remaining(quota.sync(&**session).await));
        }
        Command::Request { uid } => request(session, config, &uid).await?,
        Command::History { auto, page } => {
            let mut tabs = HistoryTabs::new();
            if auto {
                tabs.select(HistoryKind::Automated);
            }
            tabs.load(&**session).await?;
            if page != 1 && !tabs.go_to(&**session, page).await? {
                println!("page {page} out of range, showing page 1");
            }
            match tabs.active() {
                HistoryKind::Manual => {
                    println!("{}", display::like_history(tabs.manual.rows()));
                    println!(
                        "{}",
                        display::page_bar(&tabs.manual.page_numbers(), tabs.current_page())
                    );
                }
                HistoryKind::Automated => {
                    println!("{}", display::auto_like_history(tabs.automated.rows()));
                    println!(
                        "{}",
                        display::page_bar(&tabs.automated.page_numbers(), tabs.current_page())
                    );
                }
            }
        }
        Command::AutoLikeHistory { page } => {
            let mut view = AutoLikeHistoryView::new();
            view.load(&**session).await?;
            if page != 1 && !view.go_to(&**session, page).await? {
                println!("page {page} out of range, showing page 1");
            }
            println!("{}", display::auto_like_history(view.rows()));
            println!("{}", display::page_bar(&view.page_numbers(), view.current_page()));
        }
        Command::Admin { command } => admin(&**session, command).await?,
        Command::Users { command } => users(&**session, command).await?,
        Command::Open { path } => {
            let route = Route::from_path(&path);
            tracing::debug!(%route, "dispatching");
            let command = match route {
                Route::Home => Command::Quota,
                Route::History => Command::History {
                    auto: false,
                    page: 1,
                },
                Route::AutoLikeHistory => Command::AutoLikeHistory { page: 1 },
                Route::Admin => Command::Admin {
                    command: AdminCommand::List,
                },
                Route::UserManagement => Command::Users {
                    command: UsersCommand::List {
                        search: String::new(),
                        sort: SortArg::CreatedAt,
                    },
                },
            };
            Box::pin(run(command, session, config)).await?;
        }
    }
    Ok(())
}

async fn request(session: &Arc<Session>, config: &Config, uid: &str) -> Result<()> {
    let orchestrator = RequestOrchestrator::new(session.clone(), config.demo);
    let mut quota = QuotaTracker::new(orchestrator.subscribe());
    let remaining = quota.sync(&**session).await;

    let outcome = orchestrator.submit(uid, remaining).await;
    orchestrator.acknowledge().await;
    let outcome = outcome?;
    println!("{}", display::outcome(&outcome));

    if outcome.is_success() {
        println!("{}", display::remaining(quota.sync(&**session).await));
    }
    Ok(())
}

async fn admin(session: &Session, command: AdminCommand) -> Result<()> {
    let mut view = AutoLikeAdmin::open(session).await?;
    match command {
        AdminCommand::List => {}
        AdminCommand::Add { uid } => {
            view.add(&NewAutoLikeForm::new(uid), chrono::Utc::now())
                .await?;
        }
        AdminCommand::Toggle { id } => {
            let active = view.toggle(&id).await?;
            println!("{id} is now {}", if active { "active" } else { "paused" });
        }
        AdminCommand::Delete { id, yes } => {
            if !view.delete(&id, yes).await? {
                return Err(miette::miette!(
                    help = "re-run with --yes to confirm",
                    "not deleting {id} without confirmation"
                ));
            }
        }
    }
    println!("{}", display::auto_likes(view.auto_likes()));
    Ok(())
}

async fn users(session: &Session, command: UsersCommand) -> Result<()> {
    let mut view = UserAdmin::open(session).await?;
    match command {
        UsersCommand::List { search, sort } => {
            let query = UserQuery {
                search,
                sort: sort.into(),
            };
            println!("{}", display::users(&query.apply(view.users())));
        }
        UsersCommand::Create { email, password } => {
            let out = view.create_user(&NewUserForm { email, password }).await?;
            println!("{}", out.message.as_deref().unwrap_or("User created"));
        }
        UsersCommand::Limits {
            user_id,
            daily,
            extra,
        } => {
            let user = view
                .find(&user_id)
                .ok_or_else(|| miette::miette!("no user with id {user_id}"))?;
            let form = LimitsForm::override_for(user, daily, extra)?;
            view.update_limits(&form).await?;
            let updated = view.find(&user_id).into_iter().collect::<Vec<_>>();
            println!("{}", display::users(&updated));
        }
    }
    Ok(())
}
