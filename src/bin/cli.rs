use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input};
use dotenvy::dotenv;
use toolbox::cli::{apply_defaults, create_role, grant_all, issue_token};
use toolbox::state::init_app_state;
use toolbox_config::JwtConfig;
use toolbox_models::RoleId;

#[derive(Parser)]
#[command(name = "toolbox-cli")]
#[command(about = "Toolbox CLI - Administrative tools for roles and screen permissions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new role
    CreateRole {
        /// Role name (prompted if not provided)
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Optional description
        #[arg(short = 'd', long)]
        description: Option<String>,
    },
    /// Grant read and write on screens to a role
    GrantAll {
        /// Name of the role to grant
        #[arg(short = 'r', long)]
        role: String,

        /// Screens to grant (defaults to the whole catalog)
        #[arg(short = 's', long = "screen")]
        screens: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Apply the catalog's default permissions to existing roles
    ApplyDefaults,
    /// Mint an access token for development use
    IssueToken {
        /// Token subject
        #[arg(short = 'u', long)]
        username: String,

        /// Role IDs carried by the token
        #[arg(short = 'r', long = "role-id")]
        role_ids: Vec<RoleId>,

        /// Authorities such as ADMIN or USER
        #[arg(short = 'a', long = "authority", default_value = "USER")]
        authorities: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::IssueToken {
            username,
            role_ids,
            authorities,
        } => {
            let token = issue_token(&JwtConfig::from_env(), &username, &role_ids, &authorities)?;
            println!("{}", token);
        }
        Commands::CreateRole { name, description } => {
            let name = match name {
                Some(name) => name,
                None => Input::new()
                    .with_prompt("Role name")
                    .interact_text()
                    .context("Failed to read role name")?,
            };

            let state = init_app_state().await?;
            let role = create_role(&state, &name, description).await?;
            println!("Role created: {} (id {})", role.name, role.id);
        }
        Commands::GrantAll { role, screens, yes } => {
            let scope = if screens.is_empty() {
                "every screen".to_string()
            } else {
                screens.join(", ")
            };
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Grant read and write on {} to {}?", scope, role))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
                if !confirmed {
                    println!("Aborted");
                    return Ok(());
                }
            }

            let state = init_app_state().await?;
            let screens = (!screens.is_empty()).then_some(screens);
            let report = grant_all(&state, &role, screens).await?;

            println!("Granted {} screen(s) to {}", report.granted.len(), role);
            for failure in &report.failed {
                eprintln!("  failed: {} ({})", failure.screen_name, failure.error);
            }
            if !report.is_complete() {
                std::process::exit(2);
            }
        }
        Commands::ApplyDefaults => {
            let state = init_app_state().await?;
            let report = apply_defaults(&state).await?;
            println!("Applied {} default permission(s)", report.applied);
            for (screen, role) in &report.invalid {
                eprintln!("  skipped invalid default: {} / {}", screen, role);
            }
            for role in &report.missing_roles {
                eprintln!("  unknown role: {}", role);
            }
        }
    }

    Ok(())
}
