//! # Vocabulary
//!
//! IRIs the contacts app reads and writes.
//!
//! - `pim` marks storage roots, either as a `Link: <..#Storage>; rel="type"`
//!   header on the container or as a `pim:storage` triple on a WebID profile
//! - `vcard` describes each contact Thing
//! - Phone numbers and emails are stored as `tel:` and `mailto:` IRIs, not literals

pub const PIM_STORAGE_TYPE: &str = "http://www.w3.org/ns/pim/space#Storage";
pub const PIM_STORAGE: &str = "http://www.w3.org/ns/pim/space#storage";

pub const VCARD_FN: &str = "http://www.w3.org/2006/vcard/ns#fn";
pub const VCARD_ORGANIZATION_NAME: &str = "http://www.w3.org/2006/vcard/ns#organization-name";
pub const VCARD_TITLE: &str = "http://www.w3.org/2006/vcard/ns#title";
pub const VCARD_HAS_TELEPHONE: &str = "http://www.w3.org/2006/vcard/ns#hasTelephone";
pub const VCARD_HAS_EMAIL: &str = "http://www.w3.org/2006/vcard/ns#hasEmail";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

pub const TEL_SCHEME: &str = "tel:";
pub const MAILTO_SCHEME: &str = "mailto:";

pub const TEXT_TURTLE: &str = "text/turtle";
