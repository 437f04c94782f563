//! Punchcard CLI
//!
//! Command-line front end for the time-tracking backend:
//! - Choose who you are (login / logout / whoami)
//! - Start and end work sessions, or watch the live timer
//! - Show the team dashboard

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use punchcard::analytics::{format_minutes, format_number, WeekComparison};
use punchcard::config::{generate_default_config, normalize_base_url, LoggingConfig};
use punchcard::dashboard::DashboardView;
use punchcard::login::LoginView;
use punchcard::timer::{ActionOutcome, SessionTimer, TimerView};
use punchcard::{AuthState, Config, LocalStore, TimeTrackerClient, User};

#[derive(Parser)]
#[command(name = "punchcard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Team time tracking from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir, then ./punchcard.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overrides config and environment
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the user directory
    Users,

    /// Log in as a user
    Login {
        /// User id or name (case-insensitive); lists the choices when omitted
        user: Option<String>,
        /// Replace the current login
        #[arg(long)]
        switch: bool,
    },

    /// Forget the logged-in user
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Show timer status once
    Status,

    /// Start a work session
    Start,

    /// End the active work session
    End,

    /// Show the live timer until Ctrl-C
    Watch,

    /// Show the team dashboard
    Dashboard {
        /// Only list leaderboard rows whose name contains this text
        #[arg(long, default_value = "")]
        filter: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("punchcard={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Everything a command needs
struct App {
    config: Config,
    api: Arc<TimeTrackerClient>,
    auth: AuthState,
    format: OutputFormat,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut config, skipped) = Config::load_default(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = normalize_base_url(url);
    }
    init_tracing(&config.logging);
    for e in &skipped {
        tracing::warn!("Skipped config file: {}", e);
    }
    tracing::debug!(base_url = %config.api.base_url, "Punchcard v{}", env!("CARGO_PKG_VERSION"));

    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_ref());
    }

    let api = Arc::new(TimeTrackerClient::new(&config.api)?);
    let auth = AuthState::load(LocalStore::in_dir(&config.data_dir()));
    let mut app = App {
        config,
        api,
        auth,
        format: cli.format,
    };

    match cli.command {
        Commands::Users => list_users(&app).await,
        Commands::Login { user, switch } => login(&mut app, user, switch).await,
        Commands::Logout => {
            app.auth.logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => {
            let user = app.auth.require_user()?;
            match app.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(user)?),
                OutputFormat::Table => println!("{}", describe(user)),
            }
            Ok(())
        }
        Commands::Status => status(&app).await,
        Commands::Start => start(&app).await,
        Commands::End => end(&app).await,
        Commands::Watch => watch(&app).await,
        Commands::Dashboard { filter } => dashboard(&app, filter).await,
        Commands::Config { .. } => Ok(()),
    }
}

fn write_default_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }
    Ok(())
}

fn describe(user: &User) -> String {
    format!("{} (id {})", user.name, user.id)
}

// ============================================
// Login
// ============================================

async fn list_users(app: &App) -> anyhow::Result<()> {
    let mut view = LoginView::mount(Arc::clone(&app.api));
    view.ready().await;
    let login = view.snapshot().await;

    if let Some(error) = login.error() {
        bail!("{}", error);
    }

    let options = login.options();
    match app.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&options)?),
        OutputFormat::Table => {
            if options.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            println!("{:<12} {}", "ID", "Name");
            println!("{}", "-".repeat(40));
            for option in options {
                println!("{:<12} {}", option.value, option.label);
            }
        }
    }
    Ok(())
}

async fn login(app: &mut App, query: Option<String>, switch: bool) -> anyhow::Result<()> {
    if let (Some(user), false) = (app.auth.user(), switch) {
        println!("Already logged in as {}", describe(user));
        println!("Use `punchcard login --switch <USER>` to change.");
        return Ok(());
    }

    let Some(query) = query else {
        list_users(app).await?;
        println!();
        println!("Choose your name with:");
        println!("  punchcard login <ID or NAME>");
        return Ok(());
    };

    let mut view = LoginView::mount(Arc::clone(&app.api));
    view.ready().await;
    if let Some(error) = view.snapshot().await.error() {
        bail!("{}", error);
    }

    if !view.select_matching(&query).await {
        bail!("No user matches '{}'. Run `punchcard users` to see the choices", query);
    }

    match view.submit(&mut app.auth).await? {
        Some(user) => {
            println!("Logged in as {}", describe(&user));
            Ok(())
        }
        None => bail!("Could not log in as '{}'", query),
    }
}

// ============================================
// Timer
// ============================================

async fn mount_timer(app: &App) -> anyhow::Result<TimerView<TimeTrackerClient>> {
    let user = app.auth.require_user()?.clone();
    let mut view = TimerView::mount(Arc::clone(&app.api), user, app.config.timer.tick_interval());
    view.ready().await;
    Ok(view)
}

fn timer_json(timer: &SessionTimer) -> serde_json::Value {
    let now = chrono::Utc::now();
    serde_json::json!({
        "status": timer.status(),
        "elapsed_seconds": timer.elapsed_seconds(now),
        "display": timer.display(now),
        "session": timer.active_session(),
        "message": timer.message(),
    })
}

fn print_timer(app: &App, timer: &SessionTimer) -> anyhow::Result<()> {
    match app.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&timer_json(timer))?),
        OutputFormat::Table => {
            println!("{:<8} {}", timer.status().to_string(), timer.display(chrono::Utc::now()));
            if let Some(message) = timer.message() {
                println!("{}", message);
            }
        }
    }
    Ok(())
}

async fn status(app: &App) -> anyhow::Result<()> {
    let view = mount_timer(app).await?;
    let timer = view.snapshot().await;
    print_timer(app, &timer)?;

    if timer.active_session().is_none() && timer.message().is_some() {
        bail!("Could not load the active session");
    }
    Ok(())
}

async fn start(app: &App) -> anyhow::Result<()> {
    let view = mount_timer(app).await?;

    match view.start().await {
        ActionOutcome::Applied => print_timer(app, &view.snapshot().await),
        ActionOutcome::Rejected => bail!("A work session is already running"),
        ActionOutcome::Failed | ActionOutcome::Discarded => {
            let timer = view.snapshot().await;
            bail!("{}", timer.message().unwrap_or("Failed to start work"))
        }
    }
}

async fn end(app: &App) -> anyhow::Result<()> {
    let view = mount_timer(app).await?;

    match view.end().await {
        ActionOutcome::Applied => print_timer(app, &view.snapshot().await),
        ActionOutcome::Rejected => bail!("No active work session"),
        ActionOutcome::Failed | ActionOutcome::Discarded => {
            let timer = view.snapshot().await;
            bail!("{}", timer.message().unwrap_or("Failed to end work"))
        }
    }
}

async fn watch(app: &App) -> anyhow::Result<()> {
    let view = mount_timer(app).await?;
    let mut ticks = view.ticks();
    let mut stdout = std::io::stdout();

    println!("{} - press Ctrl-C to stop", describe(view.user()));
    if let Some(message) = view.snapshot().await.message() {
        println!("{}", message);
    }

    loop {
        let state = view.snapshot().await.status().to_string();
        let elapsed = view.display().await;
        write!(stdout, "\r{:<8} {}", state, elapsed)?;
        stdout.flush()?;

        tokio::select! {
            changed = ticks.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!();
    view.unmount();
    Ok(())
}

// ============================================
// Dashboard
// ============================================

async fn dashboard(app: &App, filter: String) -> anyhow::Result<()> {
    app.auth.require_user()?;

    let mut view = DashboardView::mount(Arc::clone(&app.api));
    view.set_filter(filter);
    view.ready().await;

    if let Some(error) = view.error().await {
        bail!("{}", error);
    }
    let snapshot = view.snapshot().await;

    if app.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "Today: {}    All time: {}",
        format_minutes(snapshot.totals.today_minutes),
        format_minutes(snapshot.totals.all_time_minutes)
    );
    match &snapshot.leader {
        Some(leader) => println!(
            "Leader of the day: {} ({})",
            leader.name,
            format_minutes(leader.today_minutes)
        ),
        None => println!("Leader of the day: nobody yet"),
    }

    println!();
    println!("{:<5} {:<24} {:>10} {:>10} {:>10}", "Rank", "Name", "Today", "7 days", "All time");
    println!("{}", "-".repeat(63));
    if snapshot.filtered.is_empty() {
        println!("No matching users");
    }
    for row in &snapshot.filtered {
        println!(
            "{:<5} {:<24} {:>10} {:>10} {:>10}",
            row.rank_today,
            row.name,
            format_number(row.today_minutes),
            format_number(row.week_minutes),
            format_number(row.all_time_minutes)
        );
    }

    println!();
    println!("Last 7 days");
    if snapshot.weekly_by_day.is_empty() {
        println!("  No data");
    }
    for day in &snapshot.weekly_by_day {
        println!("  {:<8} {}", day.label, format_minutes(day.minutes));
    }

    println!();
    println!("Today by hour");
    for hour in snapshot.today_by_hour.iter().filter(|h| h.minutes > 0.0) {
        println!("  {}:00    {}", hour.hour, format_minutes(hour.minutes));
    }
    if snapshot.today_by_hour.iter().all(|h| h.minutes <= 0.0) {
        println!("  No time logged today");
    }

    println!();
    println!("Week comparison");
    match &snapshot.week_comparison {
        WeekComparison::NoData { message } => println!("  {}", message),
        WeekComparison::Bars { bars } => {
            for bar in bars {
                println!("  {:<24} {}", bar.name, format_minutes(bar.minutes));
            }
        }
    }

    Ok(())
}
