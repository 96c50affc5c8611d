//! Identity-provider integration for the Strata headless CMS
//!
//! Exposes OAuth client registrations stored as CMS content through the
//! [`store::ClientRegistrationStore`] lookup interface: `None` for an
//! unknown client id, a projected [`store::ClientRegistration`] otherwise.

pub mod store;

pub use store::{ClientRegistration, ClientRegistrationStore, CmsClientStore};
