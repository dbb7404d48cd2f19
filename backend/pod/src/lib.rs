//! # Pod
//!
//! Everything that talks to a Solid pod on behalf of the contacts app.
//!
//! ## Pipeline
//! - [`auth`]: log in through the user's OIDC issuer, hand out an authenticated [`PodClient`]
//! - [`root`]: find the storage root above the user's WebID
//! - [`dataset`]: read/write the Turtle contacts resource
//! - [`contact`]: map vCard Things to the contacts shown in the UI
//!
//! ## Contacts Resource
//! Stored at `<storage root>/vCardContacts/example.ttl`, one Thing per contact.
//!
//! ```turtle
//! <#6f1c...> <http://www.w3.org/2006/vcard/ns#fn> "Bob" ;
//!     <http://www.w3.org/2006/vcard/ns#hasEmail> <mailto:bob@example.org> ;
//!     <http://www.w3.org/2006/vcard/ns#hasTelephone> <tel:5550100> .
//! ```
pub mod auth;
pub mod client;
pub mod contact;
pub mod dataset;
pub mod error;
pub mod link;
pub mod root;
pub mod vocab;

pub use auth::{LoginOptions, Session, SessionInfo};
pub use client::PodClient;
pub use contact::{Contact, contacts_from_dataset};
pub use dataset::{Dataset, Thing, ThingBuilder};
pub use error::{PodError, Result};
pub use reqwest::Url;
pub use root::{get_pod_root, get_pod_url};
