use super::Parser;
use crate::domain_model::{Language, TwoFactorMethod};
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(name = "activitymaster", about = "TheActivityMaster API client")]
pub struct Cli {
    #[arg(long, global = true)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print this device's application-id fingerprint
    Fingerprint,
    Login {
        #[arg(long)]
        ident: String,
        #[arg(long)]
        password: String,
        /// Keep the username and password for the next login
        #[arg(long)]
        remember: bool,
    },
    #[command(name = "verify-2fa")]
    Verify2fa {
        #[arg(long)]
        security_token: String,
        #[arg(long)]
        code: String,
        #[arg(long = "method", value_enum, required = true)]
        methods: Vec<TwoFactorMethod>,
    },
    /// Show the logged-in user's profile
    Me,
    Logout,
    ForgotPassword {
        #[arg(long)]
        ident: String,
    },
    Terms {
        #[arg(long, value_enum, default_value = "en")]
        lang: Language,
    },
    ClearStorage,
}
