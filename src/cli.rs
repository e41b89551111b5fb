//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI arguments for recovery-api
#[derive(Parser, Debug)]
#[command(name = "recovery-api")]
#[command(author, version, about = "Authenticated API access with automatic session recovery")]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", default_value = "./config.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from RECOVERY_PASSWORD when omitted
        #[arg(long, env = "RECOVERY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// GET a path (or absolute URL) and print the body
    Get {
        path: String,
    },
    /// Stream a text reply from an endpoint as it arrives
    Stream {
        path: String,
        /// JSON request body; the request is sent as POST when given
        #[arg(long, value_name = "JSON")]
        body: Option<String>,
        /// Unwrap a JSON envelope around the complete reply
        #[arg(long)]
        envelope: bool,
    },
    /// Print the configuration JSON schema and exit
    Schema,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_command_parses_body_and_envelope() {
        let cli = Cli::try_parse_from([
            "recovery-api",
            "--config",
            "alt.yaml",
            "stream",
            "/api/chat",
            "--body",
            r#"{"message":"hi"}"#,
            "--envelope",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("alt.yaml"));
        match cli.command {
            Command::Stream {
                path,
                body,
                envelope,
            } => {
                assert_eq!(path, "/api/chat");
                assert_eq!(body.as_deref(), Some(r#"{"message":"hi"}"#));
                assert!(envelope);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_login_accepts_password_flag() {
        let cli = Cli::try_parse_from([
            "recovery-api",
            "login",
            "--email",
            "ada@example.com",
            "--password",
            "secret",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("./config.yaml"));
        assert!(matches!(
            cli.command,
            Command::Login { ref email, ref password }
                if email == "ada@example.com" && password == "secret"
        ));
    }
}
