use crate::api;
use crate::auth::config::AuthConfig;
use crate::cli::actions::Action;
use anyhow::Result;
use secrecy::SecretString;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, dsn, secret } => {
            let config = AuthConfig::new(secret.map(SecretString::from));

            api::new(port, dsn, config).await?;
        }
    }

    Ok(())
}
