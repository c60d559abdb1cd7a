//! Operator authorization.
//!
//! Who may log in is decided by an injected [`AuthorizationPolicy`]; the
//! credential check itself belongs to an external [`IdentityProvider`].
//! [`PolicyGate`] composes the two so a provider is never asked to
//! authenticate an address the policy does not permit.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use staysync_feeds::BoxFuture;
use thiserror::Error;

/// Authorization and login failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0} is not permitted to sign in")]
    NotPermitted(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("identity provider error: {0}")]
    Provider(String),
}

/// An authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub display_name: Option<String>,
}

/// Decides which email addresses may sign in.
pub trait AuthorizationPolicy: Send + Sync {
    fn permits(&self, email: &str) -> bool;
}

/// Permits a fixed set of addresses, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowListPolicy {
    emails: BTreeSet<String>,
}

impl AllowListPolicy {
    /// Builds the policy, rejecting entries that are not email addresses.
    pub fn new<I, S>(emails: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for email in emails {
            let email = normalize(email.as_ref());
            if !looks_like_email(&email) {
                return Err(AuthError::Provider(format!(
                    "invalid allow-list entry {:?}",
                    email
                )));
            }
            set.insert(email);
        }
        Ok(Self { emails: set })
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

impl AuthorizationPolicy for AllowListPolicy {
    fn permits(&self, email: &str) -> bool {
        self.emails.contains(&normalize(email))
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

/// Verifies credentials against an external identity service.
pub trait IdentityProvider: Send + Sync {
    fn login<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<User, AuthError>>;
}

/// Checks the policy before delegating to the identity provider.
pub struct PolicyGate<I, P> {
    provider: I,
    policy: P,
}

impl<I, P> PolicyGate<I, P>
where
    I: IdentityProvider,
    P: AuthorizationPolicy,
{
    pub fn new(provider: I, policy: P) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<I, P> IdentityProvider for PolicyGate<I, P>
where
    I: IdentityProvider,
    P: AuthorizationPolicy,
{
    fn login<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<User, AuthError>> {
        Box::pin(async move {
            if !self.policy.permits(email) {
                tracing::warn!(email, "Login refused by policy");
                return Err(AuthError::NotPermitted(email.trim().to_string()));
            }
            self.provider.login(email, password).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        password: &'static str,
        calls: AtomicUsize,
    }

    impl IdentityProvider for FixedProvider {
        fn login<'a>(
            &'a self,
            email: &'a str,
            password: &'a str,
        ) -> BoxFuture<'a, Result<User, AuthError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if password == self.password {
                    Ok(User {
                        email: email.to_string(),
                        display_name: None,
                    })
                } else {
                    Err(AuthError::InvalidCredentials)
                }
            })
        }
    }

    fn gate() -> PolicyGate<FixedProvider, AllowListPolicy> {
        PolicyGate::new(
            FixedProvider {
                password: "hunter2",
                calls: AtomicUsize::new(0),
            },
            AllowListPolicy::new(["Owner@Example.com"]).unwrap(),
        )
    }

    #[test]
    fn allow_list_is_case_insensitive() {
        let policy = AllowListPolicy::new(["Owner@Example.com", " staff@example.com "]).unwrap();
        assert_eq!(policy.len(), 2);
        assert!(policy.permits("owner@example.com"));
        assert!(policy.permits("STAFF@EXAMPLE.COM"));
        assert!(!policy.permits("guest@example.com"));
    }

    #[test]
    fn invalid_entries_are_rejected() {
        assert!(AllowListPolicy::new(["not-an-email"]).is_err());
        assert!(AllowListPolicy::new(["@example.com"]).is_err());
        assert!(AllowListPolicy::new(Vec::<String>::new()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn unlisted_email_never_reaches_the_provider() {
        let gate = gate();
        let err = gate.login("intruder@example.com", "hunter2").await.unwrap_err();
        assert_eq!(err, AuthError::NotPermitted("intruder@example.com".to_string()));
        assert_eq!(gate.provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn listed_email_is_delegated() {
        let gate = gate();
        let user = gate.login("owner@example.com", "hunter2").await.unwrap();
        assert_eq!(user.email, "owner@example.com");
        assert_eq!(
            gate.login("owner@example.com", "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }
}
