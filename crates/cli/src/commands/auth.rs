//! Account commands: register, login, logout, profile.

use clap::Subcommand;

use clementine_client::App;
use clementine_core::{Email, ProfileUpdate, UserRole};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account and sign in
    Register {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long)]
        last_name: String,
    },
    /// Sign in with email and password
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Sign in to the admin console
        #[arg(long)]
        admin: bool,
    },
    /// Sign out and forget the stored login
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Update profile fields
    Update {
        /// New first name
        #[arg(long)]
        first_name: Option<String>,

        /// New last name
        #[arg(long)]
        last_name: Option<String>,

        /// New email address
        #[arg(long)]
        email: Option<String>,
    },
}

pub async fn run(app: &App, action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            let user = app
                .auth()
                .register(&email, &password, &first_name, &last_name, None)
                .await?;
            tracing::info!("Registered and signed in as {} <{}>", user.full_name(), user.email);
        }
        AuthAction::Login {
            email,
            password,
            admin,
        } => {
            let role = admin.then_some(UserRole::Admin);
            let user = app.auth().login(&email, &password, role).await?;
            tracing::info!("Signed in as {} <{}>", user.full_name(), user.email);
        }
        AuthAction::Logout => {
            app.auth().logout();
        }
        AuthAction::Whoami => match app.auth().current_user() {
            Some(user) => {
                tracing::info!(
                    "{} <{}> (role: {}, id: {})",
                    user.full_name(),
                    user.email,
                    user.role,
                    user.id
                );
            }
            None => tracing::info!("Not signed in"),
        },
        AuthAction::Update {
            first_name,
            last_name,
            email,
        } => {
            let email = email.map(|raw| Email::parse(&raw)).transpose()?;
            let update = ProfileUpdate {
                email,
                first_name,
                last_name,
            };
            let user = app.auth().update_profile(update).await?;
            tracing::info!("Profile is now {} <{}>", user.full_name(), user.email);
        }
    }
    Ok(())
}
