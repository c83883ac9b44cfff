pub mod channel;
pub mod codec;
pub mod document;
pub mod errors;
pub mod event;
pub mod store;
pub mod worker;

pub use channel::{InMemoryChannel, JsonWireChannel, WireChannel};
pub use codec::{CookieAttributes, CookieRecord, Expires, SameSite};
pub use document::DocumentContext;
pub use errors::CookieStoreError;
pub use event::{ChangeSubscription, CookieChangeEvent, DeletedCookie};
pub use store::{CookieInit, CookieStore, CookieStoreDeleteOptions, CookieStoreGetOptions};
pub use worker::{
    CookieStoreManager, CookieSubscription, Registration, RegistrationId, SubscriptionRequest,
};
