use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! bearer_token {
    ($name:ident) => {
        #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        // Tokens end up in spans and error chains; never print the secret.
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(***)", stringify!($name))
            }
        }
    };
}

bearer_token!(AccessToken);
bearer_token!(RefreshToken);
bearer_token!(SecurityToken);

/// Credentials issued by login, 2FA verification, or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: AccessToken(access_token.into()),
            refresh_token: RefreshToken(refresh_token.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_token_value() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let rendered = format!("{:?}", pair);
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(rendered.contains("AccessToken(***)"));
    }

    #[test]
    fn token_pair_uses_server_field_names() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#).unwrap();
        assert_eq!(pair.access_token.as_str(), "a");
        assert_eq!(pair.refresh_token.as_str(), "r");
    }
}
