use activitymaster_client::app::App;
use activitymaster_client::domain_model::{LoginOutcome, SecurityToken};
use activitymaster_client::logger::*;
use activitymaster_client::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let app = App::try_new(&project_settings)?;

    match cli.command {
        Command::Fingerprint => {
            println!("{}", app.fingerprinter.fingerprint().await?);
        }
        Command::Login {
            ident,
            password,
            remember,
        } => {
            let outcome = app.auth_service.login(&ident, &password).await?;
            if remember {
                app.session_service
                    .remember_credentials(&ident, &password)
                    .await?;
            }
            match outcome {
                LoginOutcome::Authenticated(_) => println!("logged in"),
                LoginOutcome::TwoFactorRequired(challenge) => {
                    println!("{}", serde_json::to_string_pretty(&challenge)?);
                }
            }
        }
        Command::Verify2fa {
            security_token,
            code,
            methods,
        } => {
            app.auth_service
                .verify_2fa(&SecurityToken(security_token), &code, &methods)
                .await?;
            println!("logged in");
        }
        Command::Me => {
            let profile = app.user_service.me().await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::Logout => {
            app.auth_service.logout().await?;
            println!("logged out");
        }
        Command::ForgotPassword { ident } => {
            app.auth_service.forgot_password(&ident).await?;
            println!("password reset mail requested");
        }
        Command::Terms { lang } => {
            println!("{}", app.terms_service.terms(lang).await?);
        }
        Command::ClearStorage => {
            app.session_service.clear_all_storage().await?;
            println!("storage cleared");
        }
    }

    Ok(())
}
