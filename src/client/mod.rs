//! Bot client for one wiki account
//!
//! [`WikiClient`] owns an authenticated [`Session`] and exposes the read
//! and write operations. Mutations follow the same sequence: acquire a
//! fresh token for the subject, run local checks, POST the action, then
//! interpret the reply.

mod edit;
pub mod exclusion;
mod pages;
mod read;
mod upload;
mod users;

use crate::{
    Error, Result,
    config::BotProfile,
    error::FailureKind,
    session::{HttpTransport, LoginPolicy, Session, Transport, acquire_token},
    types::{ActionKind, ActionToken, ApiParams, AuthState},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Client over the default HTTP transport
pub type WikiClient = WikiClientGeneric<HttpTransport>;

/// Client generic over its transport so tests can script the server
#[derive(Debug)]
pub struct WikiClientGeneric<T: Transport> {
    profile: BotProfile,
    session: Session<T>,
}

impl WikiClient {
    /// Build the HTTP transport for `profile` and log in
    pub async fn connect(profile: BotProfile) -> Result<Self> {
        let transport = HttpTransport::new(&profile)?;
        let mut client = Self::with_transport(profile, transport);
        client.login().await?;
        Ok(client)
    }
}

impl<T: Transport> WikiClientGeneric<T> {
    /// Client that is not logged in yet
    pub fn with_transport(profile: BotProfile, transport: T) -> Self {
        let policy = LoginPolicy {
            max_attempts: profile.login_attempts,
            backoff: profile.login_backoff,
        };
        let session = Session::new(transport, profile.user.clone(), policy);
        Self { profile, session }
    }

    /// Run the login handshake with the profile's credentials
    pub async fn login(&mut self) -> Result<()> {
        let password = self.profile.password.clone();
        self.session.login(&password).await
    }

    pub async fn logout(&mut self) {
        self.session.logout().await;
    }

    /// Log out and release the client
    pub async fn close(mut self) {
        self.session.logout().await;
    }

    pub fn auth_state(&self) -> AuthState {
        self.session.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn user(&self) -> &str {
        self.session.user()
    }

    pub fn profile(&self) -> &BotProfile {
        &self.profile
    }

    pub fn transport(&self) -> &T {
        self.session.transport()
    }

    /// Fresh token for one action on one subject
    async fn token(&self, action: ActionKind, subject: &str) -> Result<ActionToken> {
        self.session.require_login()?;
        acquire_token(self.transport(), action, subject).await
    }

    /// Read request; remote errors become [`Error::Api`]
    async fn read(&self, params: ApiParams) -> Result<Value> {
        self.session.require_login()?;
        self.transport().get(&params).await?.into_result()
    }

    /// Mutation request; remote errors are classified into the action family
    async fn submit(&self, action: ActionKind, params: ApiParams) -> Result<Value> {
        self.transport()
            .post(&params)
            .await?
            .into_action_result(action)
    }
}

/// Typed payload under `key` in a mutation reply
fn outcome<O: DeserializeOwned>(action: ActionKind, reply: &Value, key: &str) -> Result<O> {
    let body = reply.get(key).ok_or_else(|| {
        Error::action(
            action,
            FailureKind::Generic,
            format!("reply has no '{key}' result: {reply}"),
        )
    })?;
    Ok(serde_json::from_value(body.clone())?)
}

/// `User:` page of an account name
fn user_page(name: &str) -> String {
    if name.starts_with("User:") {
        name.to_string()
    } else {
        format!("User:{name}")
    }
}
