//! Command-line interface definition for SurveyFlow
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the edge proxy, sign-in, survey data and the
//! local theme preference.

use clap::{Args, Parser, Subcommand};

/// SurveyFlow - survey authoring client and edge proxy
#[derive(Parser, Debug, Clone)]
#[command(name = "surveyflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the backend API base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Email/password pair, read from flags or the environment
#[derive(Args, Debug, Clone, Default)]
pub struct CredentialArgs {
    /// Account email
    #[arg(long, env = "SURVEYFLOW_EMAIL")]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "SURVEYFLOW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Available commands for SurveyFlow
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the edge proxy (`/api/proxy/*path` -> backend)
    Serve {
        /// Listen address, e.g. 0.0.0.0:3001
        #[arg(short, long)]
        listen: Option<String>,

        /// Upstream timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Sign in (or register) and report the session
    Login {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// Create an account instead of signing in
        #[arg(long)]
        register: bool,

        /// Password confirmation (register only)
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Show response analytics for every survey
    Dashboard {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Inspect surveys and responses
    Surveys {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// Survey subcommand
        #[command(subcommand)]
        command: SurveyCommand,
    },

    /// Show or change the theme preference
    Theme {
        /// Theme subcommand
        #[command(subcommand)]
        command: ThemeCommand,
    },

    /// Check credentials against the sign-in rules without contacting the
    /// backend
    Validate {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,

        /// Password confirmation; enables the registration rules
        #[arg(long)]
        confirm: Option<String>,
    },
}

/// Survey subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SurveyCommand {
    /// List surveys
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a survey and its questions
    Show {
        /// Survey id
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List collected responses of a survey
    Responses {
        /// Survey id
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the public response link of a survey
    Link {
        /// Survey id
        id: String,
    },
}

/// Theme subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ThemeCommand {
    /// Print the stored preference
    Show,

    /// Switch between light and dark
    Toggle,

    /// Set the preference explicitly (light or dark)
    Set {
        /// Theme name
        theme: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            api_url: None,
            command: Commands::Theme {
                command: ThemeCommand::Show,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(cli.api_url.is_none());
        assert!(matches!(
            cli.command,
            Commands::Theme {
                command: ThemeCommand::Show
            }
        ));
    }

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::try_parse_from(["surveyflow", "serve", "--listen", "0.0.0.0:8080", "-t", "5"])
            .unwrap();
        if let Commands::Serve { listen, timeout } = cli.command {
            assert_eq!(listen.as_deref(), Some("0.0.0.0:8080"));
            assert_eq!(timeout, Some(5));
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    #[serial]
    fn test_cli_parse_login_with_flags() {
        let cli = Cli::try_parse_from([
            "surveyflow",
            "login",
            "--email",
            "a@b.co",
            "--password",
            "Secret1!",
            "--register",
            "--confirm",
            "Secret1!",
        ])
        .unwrap();
        if let Commands::Login {
            credentials,
            register,
            confirm,
        } = cli.command
        {
            assert_eq!(credentials.email.as_deref(), Some("a@b.co"));
            assert_eq!(credentials.password.as_deref(), Some("Secret1!"));
            assert!(register);
            assert_eq!(confirm.as_deref(), Some("Secret1!"));
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    #[serial]
    fn test_cli_credentials_from_env() {
        std::env::set_var("SURVEYFLOW_EMAIL", "env@b.co");
        let cli = Cli::try_parse_from(["surveyflow", "dashboard", "--json"]).unwrap();
        std::env::remove_var("SURVEYFLOW_EMAIL");

        if let Commands::Dashboard { credentials, json } = cli.command {
            assert_eq!(credentials.email.as_deref(), Some("env@b.co"));
            assert!(json);
        } else {
            panic!("Expected Dashboard command");
        }
    }

    #[test]
    fn test_cli_parse_surveys_show() {
        let cli = Cli::try_parse_from(["surveyflow", "surveys", "show", "abc", "--json"]).unwrap();
        if let Commands::Surveys { command, .. } = cli.command {
            assert!(matches!(command, SurveyCommand::Show { ref id, json: true } if id == "abc"));
        } else {
            panic!("Expected Surveys command");
        }
    }

    #[test]
    fn test_cli_parse_theme_toggle() {
        let cli = Cli::try_parse_from(["surveyflow", "theme", "toggle"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Theme {
                command: ThemeCommand::Toggle
            }
        ));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "surveyflow",
            "--api-url",
            "http://api.test",
            "--json-logs",
            "-v",
            "theme",
            "show",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://api.test"));
        assert!(cli.json_logs);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_validate_requires_email() {
        let result = Cli::try_parse_from(["surveyflow", "validate", "--password", "x"]);
        assert!(result.is_err());
    }
}
