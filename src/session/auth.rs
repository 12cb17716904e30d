//! Login handshake and session state
//!
//! The legacy login is a two step exchange: the first `action=login` POST
//! answers `NeedToken` with a login token, the second POST repeats the
//! credentials together with that token. The server may ask the client to
//! wait (throttling or replication lag); such replies are retried a bounded
//! number of times with a fixed pause in between.

use super::transport::Transport;
use crate::{
    Error, Result,
    types::{ApiParams, ApiReply, AuthState},
};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Retry bounds for the login handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(10),
        }
    }
}

/// Interpretation of one `action=login` reply
#[derive(Debug, Clone, PartialEq)]
enum LoginReply {
    Success,
    NeedToken(String),
    /// Server asked the client to come back later
    Wait,
    Rejected { reason: String, payload: Value },
}

impl LoginReply {
    fn classify(reply: ApiReply) -> Self {
        match reply {
            ApiReply::Failure(err) if err.code == "maxlag" => LoginReply::Wait,
            ApiReply::Failure(err) => LoginReply::Rejected {
                reason: err.code,
                payload: err.payload,
            },
            ApiReply::Success(value) => {
                let login = value.get("login").cloned().unwrap_or(Value::Null);
                let result = login.get("result").and_then(Value::as_str).unwrap_or("");
                match result {
                    "Success" => LoginReply::Success,
                    "NeedToken" => match login.get("token").and_then(Value::as_str) {
                        Some(token) => LoginReply::NeedToken(token.to_string()),
                        None => LoginReply::Rejected {
                            reason: "NeedToken without token".to_string(),
                            payload: value,
                        },
                    },
                    _ if login.get("wait").is_some() || result == "Throttled" => LoginReply::Wait,
                    "" => LoginReply::Rejected {
                        reason: "no login result".to_string(),
                        payload: value,
                    },
                    other => LoginReply::Rejected {
                        reason: other.to_string(),
                        payload: value,
                    },
                }
            }
        }
    }
}

/// Outcome of one complete handshake
enum Handshake {
    Done,
    Wait,
}

/// Authenticated channel to one wiki for one user
///
/// Owns the transport. Every mutation checks [`Session::require_login`]
/// before it touches the network.
#[derive(Debug)]
pub struct Session<T: Transport> {
    transport: T,
    user: String,
    policy: LoginPolicy,
    state: AuthState,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, user: impl Into<String>, policy: LoginPolicy) -> Self {
        Self {
            transport,
            user: user.into(),
            policy,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// Fail with [`Error::NotAuthenticated`] unless logged in
    pub fn require_login(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(Error::NotAuthenticated)
        }
    }

    /// Run the login handshake, retrying while the server asks to wait
    pub async fn login(&mut self, password: &str) -> Result<()> {
        let attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=attempts {
            debug!("Login attempt {}/{} for {}", attempt, attempts, self.user);
            match self.handshake(password).await {
                Ok(Handshake::Done) => {
                    self.state = AuthState::Authenticated;
                    info!("Logged in as {}", self.user);
                    return Ok(());
                }
                Ok(Handshake::Wait) => {
                    if attempt < attempts {
                        warn!(
                            "Server asked to wait before login, retrying in {:?}",
                            self.policy.backoff
                        );
                        tokio::time::sleep(self.policy.backoff).await;
                    }
                }
                Err(e) => {
                    self.state = AuthState::LoginFailed;
                    error!("Login failed for {}: {}", self.user, e);
                    return Err(e);
                }
            }
        }

        self.state = AuthState::LoginFailed;
        error!("Login for {} gave up after {} attempts", self.user, attempts);
        Err(Error::LoginRetriesExhausted { attempts })
    }

    async fn handshake(&mut self, password: &str) -> Result<Handshake> {
        self.state = AuthState::Unauthenticated;
        let first = self.transport.post(&self.login_params(password, None)).await?;

        let second = match LoginReply::classify(first) {
            LoginReply::Success => return Ok(Handshake::Done),
            LoginReply::NeedToken(token) => {
                self.state = AuthState::TokenRequested;
                let reply = self
                    .transport
                    .post(&self.login_params(password, Some(&token)))
                    .await?;
                LoginReply::classify(reply)
            }
            other => other,
        };

        match second {
            LoginReply::Success => Ok(Handshake::Done),
            LoginReply::Wait => Ok(Handshake::Wait),
            LoginReply::NeedToken(_) => Err(Error::login_failed(
                "server asked for a token twice",
                Value::Null,
            )),
            LoginReply::Rejected { reason, payload } => Err(Error::login_failed(reason, payload)),
        }
    }

    fn login_params(&self, password: &str, token: Option<&str>) -> ApiParams {
        ApiParams::action("login")
            .set("lgname", self.user.as_str())
            .set("lgpassword", password)
            .opt("lgtoken", token)
    }

    /// Best-effort logout; failures are only logged
    pub async fn logout(&mut self) {
        if !self.is_authenticated() {
            return;
        }
        if let Err(e) = self.transport.post(&ApiParams::action("logout")).await {
            debug!("Logout request failed: {}", e);
        }
        self.state = AuthState::Unauthenticated;
        info!("Logged out {}", self.user);
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if self.is_authenticated() {
            warn!("Session for {} dropped while still logged in", self.user);
        }
    }
}
