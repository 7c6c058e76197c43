//! `staffdesk` command-line client.
//!
//! Drives the same stores a UI would. The session is kept in the storage
//! file between invocations, so `login` once and the other commands reuse it.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use staffdesk_auth::Credentials;
use staffdesk_client::{AppState, ClientConfig, ClientError, EmployeeFilter, RouteTarget};
use staffdesk_core::EmployeeId;

#[derive(Parser)]
#[command(name = "staffdesk")]
#[command(about = "Employee directory client", long_about = None)]
struct Cli {
    /// Base URL of the employee API (overrides STAFFDESK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and keep the session for later commands
    Login {
        email: String,

        /// Password; read from STAFFDESK_PASSWORD when omitted
        #[arg(long, env = "STAFFDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List employees
    Employees {
        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        manager: Option<String>,

        #[arg(long)]
        active: Option<bool>,
    },

    /// Show one employee
    Employee { id: String },

    /// List the departments among the listed employees
    Departments,

    /// Resolve a path through the route guards
    Open { path: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    staffdesk_observability::init(config.log_format);

    let app = AppState::from_config(&config)?;

    match cli.command {
        Command::Login { email, password } => {
            let credentials = Credentials::new(email, password);
            credentials.validate()?;
            let response = app
                .session
                .login(&credentials)
                .await
                .map_err(report)?;
            println!(
                "logged in as {} ({})",
                response.user.display_name(),
                response.user.role
            );
        }
        Command::Logout => {
            app.session.logout();
            println!("logged out");
        }
        Command::Whoami => match app.session.user() {
            Some(user) => println!("{} ({})", user.display_name(), user.role),
            None => println!("not logged in"),
        },
        Command::Employees {
            department,
            manager,
            active,
        } => {
            require_session(&app)?;
            let mut filter = EmployeeFilter::new();
            filter.department = department;
            filter.manager_id = manager.map(|m| m.parse::<EmployeeId>()).transpose()?;
            filter.active = active;

            let employees = app
                .employees
                .fetch_employees(&filter)
                .await
                .map_err(report)?;
            for employee in &employees {
                println!(
                    "{}\t{}\t{}\t{}",
                    employee.id,
                    employee.full_name().unwrap_or_default(),
                    employee.department,
                    if employee.active { "active" } else { "inactive" }
                );
            }
        }
        Command::Employee { id } => {
            require_session(&app)?;
            let employee = app
                .employees
                .fetch_employee(&id.parse::<EmployeeId>()?)
                .await
                .map_err(report)?;
            println!("{}", serde_json::to_string_pretty(&employee)?);
        }
        Command::Departments => {
            require_session(&app)?;
            app.employees
                .fetch_employees(&EmployeeFilter::new())
                .await
                .map_err(report)?;
            let mut departments = app.employees.departments();
            departments.sort();
            for department in departments {
                println!("{department}");
            }
        }
        Command::Open { path } => {
            let route = app
                .start(RouteTarget::path(path))
                .context("navigation failed")?;
            println!("{}", route.full_path);
        }
    }

    Ok(())
}

fn require_session(app: &AppState) -> anyhow::Result<()> {
    if !app.session.is_authenticated() {
        bail!("not logged in; run `staffdesk login <email>` first");
    }
    Ok(())
}

fn report(err: ClientError) -> anyhow::Error {
    if err.is_authorization_expired() {
        anyhow::Error::new(err).context("session expired; log in again")
    } else {
        anyhow::Error::new(err)
    }
}
