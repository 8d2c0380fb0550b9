use clap::{Args, Subcommand};
use serde::Deserialize;
use serde_json::json;
use std::io::Write;

use crate::config::Config;
use crate::remote::http::normalize_base_url;
use crate::session::{Session, SessionStore};

/// Register, log in, or log out of a sync server
#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Create an account on the sync server
    Register {
        /// Email address (prompted if omitted)
        #[arg(long, short)]
        email: Option<String>,
    },

    /// Log in to the sync server
    Login {
        /// Email address (prompted if omitted)
        #[arg(long, short)]
        email: Option<String>,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the current session
    Status,
}

#[derive(Deserialize)]
struct AuthResponse {
    user_id: String,
    api_key: String,
}

#[derive(Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    message: String,
}

impl AuthCommand {
    pub async fn run(
        &self,
        config: &Config,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AuthSubcommand::Register { email } => {
                self.authenticate("register", email, config, session).await
            }
            AuthSubcommand::Login { email } => {
                self.authenticate("login", email, config, session).await
            }
            AuthSubcommand::Logout => {
                session.clear()?;
                println!("Logged out.");
                Ok(())
            }
            AuthSubcommand::Status => {
                match session.load() {
                    Some(s) => println!("Logged in as {} ({})", s.email, s.user_id),
                    None => println!("Not logged in."),
                }
                Ok(())
            }
        }
    }

    async fn authenticate(
        &self,
        action: &str,
        email: &Option<String>,
        config: &Config,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let server_url = config
            .sync
            .server_url
            .as_deref()
            .ok_or("No sync server configured. Set sync.server_url in the config file or WELLTRACK_SYNC_URL.")?;

        let email = match email {
            Some(e) => e.clone(),
            None => prompt("Email: ")?,
        };
        let password = prompt("Password: ")?;

        let url = format!("{}/auth/{}", normalize_base_url(server_url), action);
        let response = reqwest::Client::new()
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<AuthErrorBody>()
                .await
                .map(|b| b.message)
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(format!("{} failed ({}): {}", action, status.as_u16(), message).into());
        }

        let auth: AuthResponse = response.json().await?;
        session.save(&Session {
            user_id: auth.user_id.clone(),
            email: email.clone(),
            api_key: auth.api_key,
        })?;

        println!("Logged in as {} ({})", email, auth.user_id);
        Ok(())
    }
}

fn prompt(label: &str) -> Result<String, std::io::Error> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
