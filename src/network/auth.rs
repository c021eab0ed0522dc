use std::collections::HashMap;

use tokio_tungstenite::tungstenite::handshake::server::Request;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;

use crate::errors::{LobbyError, LobbyResult};
use crate::lobby::identity::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingCredentials,
    InvalidToken,
    Anonymous,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingCredentials => "missing credentials",
            RejectReason::InvalidToken => "invalid token",
            RejectReason::Anonymous => "anonymous identity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Identity),
    Rejected(RejectReason),
}

impl AuthOutcome {
    pub fn identity(self) -> Option<Identity> {
        match self {
            AuthOutcome::Authenticated(identity) => Some(identity),
            AuthOutcome::Rejected(_) => None,
        }
    }
}

/// Resolves the upgrade request of an incoming connection to a user.
/// Consulted exactly once per connection, during the handshake.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, request: &Request) -> AuthOutcome;
}

/// Bearer-token authenticator backed by a fixed token table.
///
/// The token is taken from the `token` query parameter, falling back to an
/// `Authorization: Bearer` header.
#[derive(Debug, Default)]
pub struct TokenAuthenticator {
    tokens: HashMap<String, Identity>,
}

impl TokenAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    pub fn from_entries<I>(entries: I) -> LobbyResult<Self>
    where
        I: IntoIterator<Item = (String, Identity)>,
    {
        let mut tokens = HashMap::new();
        for (token, identity) in entries {
            if token.trim().is_empty() {
                return Err(LobbyError::ConfigError {
                    message: format!("empty token for user {}", identity.user_id),
                });
            }
            if identity.is_anonymous() {
                return Err(LobbyError::ConfigError {
                    message: format!("user {} has no usable username", identity.user_id),
                });
            }
            if tokens.insert(token, identity.clone()).is_some() {
                return Err(LobbyError::ConfigError {
                    message: format!("duplicate token for user {}", identity.user_id),
                });
            }
        }
        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn token_from(request: &Request) -> Option<String> {
        let from_query = request.uri().query().and_then(|query| {
            query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == "token")
                .map(|(_, value)| value.to_string())
        });

        from_query.or_else(|| {
            request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
        })
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, request: &Request) -> AuthOutcome {
        let Some(token) = Self::token_from(request).filter(|token| !token.is_empty()) else {
            return AuthOutcome::Rejected(RejectReason::MissingCredentials);
        };

        match self.tokens.get(&token) {
            Some(identity) if identity.is_anonymous() => {
                AuthOutcome::Rejected(RejectReason::Anonymous)
            }
            Some(identity) => AuthOutcome::Authenticated(identity.clone()),
            None => AuthOutcome::Rejected(RejectReason::InvalidToken),
        }
    }
}
