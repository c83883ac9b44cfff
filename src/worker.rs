//! Background-context subscription bookkeeping: a registration owns a
//! set of `(name, url)` change subscriptions, handed out through
//! [`CookieStoreManager`] handles. No cookie I/O happens here.

use std::fmt::Display;
use std::sync::{Arc, RwLock, Weak};

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::errors::CookieStoreError;

/// A unique identifier for a registration, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RegistrationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One change-interest entry: an optional name filter plus a URL
/// resolved inside the owning registration's scope. Membership is by
/// `(name, url)` value equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSubscription {
    pub name: Option<String>,
    pub url: Url,
}

/// Input form for `subscribe` / `unsubscribe`: the URL is still
/// unresolved and may be relative to the registration scope.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionRequest {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug)]
struct RegistrationState {
    scope: Url,
    subscriptions: RwLock<Vec<CookieSubscription>>,
}

/// Stand-in for the worker registration that owns subscriptions, and
/// the sanctioned factory for manager handles.
#[derive(Debug)]
pub struct Registration {
    id: RegistrationId,
    state: Arc<RegistrationState>,
}

impl Registration {
    pub fn new(scope: Url) -> Self {
        Self {
            id: RegistrationId::new(),
            state: Arc::new(RegistrationState {
                scope,
                subscriptions: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn scope(&self) -> &Url {
        &self.state.scope
    }

    pub fn cookie_store_manager(&self) -> CookieStoreManager {
        CookieStoreManager {
            registration: Arc::downgrade(&self.state),
        }
    }
}

/// Handle to a registration's subscription set. Holds only a weak link:
/// a handle that outlives its registration fails every operation with
/// `IllegalInvocation`.
#[derive(Debug, Clone)]
pub struct CookieStoreManager {
    registration: Weak<RegistrationState>,
}

impl CookieStoreManager {
    fn owner(&self) -> Result<Arc<RegistrationState>, CookieStoreError> {
        self.registration
            .upgrade()
            .ok_or(CookieStoreError::IllegalInvocation)
    }

    /// Add subscriptions, skipping any `(name, url)` pair already
    /// present.
    pub async fn subscribe(
        &self,
        requests: Vec<SubscriptionRequest>,
    ) -> Result<(), CookieStoreError> {
        let owner = self.owner()?;
        let mut subscriptions = owner.subscriptions.write().unwrap();
        for request in requests {
            let subscription = resolve(&owner.scope, request)?;
            if !subscriptions.contains(&subscription) {
                subscriptions.push(subscription);
            }
        }
        Ok(())
    }

    /// A shallow copy of the current subscription set.
    pub async fn get_subscriptions(&self) -> Result<Vec<CookieSubscription>, CookieStoreError> {
        let owner = self.owner()?;
        let subscriptions = owner.subscriptions.read().unwrap();
        Ok(subscriptions.clone())
    }

    /// Remove entries exactly matching the resolved `(name, url)` pairs.
    pub async fn unsubscribe(
        &self,
        requests: Vec<SubscriptionRequest>,
    ) -> Result<(), CookieStoreError> {
        let owner = self.owner()?;
        let mut removals = Vec::with_capacity(requests.len());
        for request in requests {
            removals.push(resolve(&owner.scope, request)?);
        }
        let mut subscriptions = owner.subscriptions.write().unwrap();
        subscriptions.retain(|s| !removals.contains(s));
        Ok(())
    }
}

fn resolve(
    scope: &Url,
    request: SubscriptionRequest,
) -> Result<CookieSubscription, CookieStoreError> {
    let url = match &request.url {
        Some(raw) => scope
            .join(raw)
            .map_err(|e| CookieStoreError::invalid(format!("invalid subscription URL: {e}")))?,
        None => scope.clone(),
    };
    Ok(CookieSubscription {
        name: request.name,
        url,
    })
}
