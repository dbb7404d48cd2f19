//! # Contacts
//!
//! One contact is one Thing in the contacts resource.
//!
//! | Field       | Predicate                 | Stored as      |
//! |-------------|---------------------------|----------------|
//! | name        | `vcard:fn`                | string         |
//! | company     | `vcard:organization-name` | string         |
//! | jobTitle    | `vcard:title`             | string         |
//! | phoneNumber | `vcard:hasTelephone`      | `tel:` IRI     |
//! | email       | `vcard:hasEmail`          | `mailto:` IRI  |
//!
//! The Thing URL doubles as the contact id. Images are not stored yet.
//! Phone numbers and emails are percent-encoded inside their IRIs, so
//! `+1 555 0100` is stored as `<tel:+1%20555%200100>`.
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::{
    dataset::{Dataset, Thing, ThingBuilder},
    vocab::{
        MAILTO_SCHEME, TEL_SCHEME, VCARD_FN, VCARD_HAS_EMAIL, VCARD_HAS_TELEPHONE,
        VCARD_ORGANIZATION_NAME, VCARD_TITLE,
    },
};

/// Characters that may not appear in an IRI, plus `%` itself.
const IRI_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub id: String,
    pub image_url: Option<String>,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub company: String,
    pub job_title: String,
}

impl Contact {
    pub fn empty() -> Self {
        Self {
            image_url: Some(String::new()),
            ..Self::default()
        }
    }

    /// Missing values read as empty strings.
    pub fn from_thing(thing: &Thing) -> Self {
        let string = |predicate| thing.string_no_locale(predicate).unwrap_or_default().to_string();
        let url = |predicate, scheme: &str| {
            let value = thing.url_value(predicate).unwrap_or_default();
            let value = value.strip_prefix(scheme).unwrap_or(value);
            percent_decode_str(value).decode_utf8_lossy().into_owned()
        };

        Self {
            id: thing.url().to_string(),
            image_url: None,
            name: string(VCARD_FN),
            phone_number: url(VCARD_HAS_TELEPHONE, TEL_SCHEME),
            email: url(VCARD_HAS_EMAIL, MAILTO_SCHEME),
            company: string(VCARD_ORGANIZATION_NAME),
            job_title: string(VCARD_TITLE),
        }
    }

    /// The contact's `id` is ignored, the Thing lives at `url`.
    pub fn to_thing(&self, url: &str) -> Thing {
        ThingBuilder::new(url)
            .add_string_no_locale(VCARD_FN, &self.name)
            .add_string_no_locale(VCARD_ORGANIZATION_NAME, &self.company)
            .add_string_no_locale(VCARD_TITLE, &self.job_title)
            .add_url(VCARD_HAS_TELEPHONE, scheme_iri(TEL_SCHEME, &self.phone_number))
            .add_url(VCARD_HAS_EMAIL, scheme_iri(MAILTO_SCHEME, &self.email))
            .build()
    }
}

fn scheme_iri(scheme: &str, value: &str) -> String {
    format!("{scheme}{}", utf8_percent_encode(value, IRI_ESCAPE))
}

pub fn contacts_from_dataset(dataset: &Dataset) -> Vec<Contact> {
    dataset.things().map(Contact::from_thing).collect()
}

#[cfg(test)]
mod tests {
    use super::{Contact, contacts_from_dataset};
    use crate::{
        dataset::{Dataset, ThingBuilder},
        vocab::{VCARD_FN, VCARD_HAS_EMAIL, VCARD_HAS_TELEPHONE},
    };

    const URL: &str = "https://alice.example/vCardContacts/example.ttl#1";

    fn bob() -> Contact {
        Contact {
            id: String::new(),
            image_url: None,
            name: "Bob".to_string(),
            phone_number: "+1 555 0100".to_string(),
            email: "bob@example.org".to_string(),
            company: "Example Inc".to_string(),
            job_title: "Engineer".to_string(),
        }
    }

    #[test]
    fn test_thing_uses_schemes() {
        let thing = bob().to_thing(URL);

        assert_eq!(thing.url(), URL);
        assert_eq!(thing.url_value(VCARD_HAS_TELEPHONE), Some("tel:+1%20555%200100"));
        assert_eq!(thing.url_value(VCARD_HAS_EMAIL), Some("mailto:bob@example.org"));
        assert_eq!(thing.string_no_locale(VCARD_FN), Some("Bob"));
    }

    #[test]
    fn test_contact_from_thing() {
        let contact = Contact::from_thing(&bob().to_thing(URL));

        assert_eq!(
            contact,
            Contact {
                id: URL.to_string(),
                ..bob()
            }
        );
    }

    #[test]
    fn test_spaced_phone_survives_turtle() {
        let mut dataset = Dataset::new();
        dataset.set_thing(bob().to_thing(URL));

        let turtle = dataset.to_turtle().unwrap();
        let parsed = Dataset::from_turtle(&turtle, URL).unwrap();

        assert_eq!(
            contacts_from_dataset(&parsed),
            vec![Contact {
                id: URL.to_string(),
                ..bob()
            }]
        );
    }

    #[test]
    fn test_literal_percent_is_kept() {
        let contact = Contact {
            email: "100%real@example.org".to_string(),
            ..bob()
        };
        let thing = contact.to_thing(URL);

        assert_eq!(
            thing.url_value(VCARD_HAS_EMAIL),
            Some("mailto:100%25real@example.org")
        );
        assert_eq!(Contact::from_thing(&thing).email, "100%real@example.org");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let thing = ThingBuilder::new(URL)
            .add_url(VCARD_HAS_EMAIL, "carol@example.org")
            .build();
        let contact = Contact::from_thing(&thing);

        assert_eq!(contact.name, "");
        assert_eq!(contact.phone_number, "");
        assert_eq!(contact.email, "carol@example.org");
    }

    #[test]
    fn test_empty_contact() {
        let contact = Contact::empty();

        assert_eq!(contact.id, "");
        assert_eq!(contact.image_url.as_deref(), Some(""));
        assert_eq!(contact.name, "");
    }

    #[test]
    fn test_contacts_from_dataset() {
        let mut dataset = Dataset::new();
        dataset.set_thing(bob().to_thing(URL));
        dataset.set_thing(bob().to_thing("https://alice.example/vCardContacts/example.ttl#2"));

        let contacts = contacts_from_dataset(&dataset);

        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].id, URL);
    }

    #[test]
    fn test_camel_case_json() {
        let json = serde_json::to_value(Contact::empty()).unwrap();

        assert_eq!(json["phoneNumber"], "");
        assert_eq!(json["jobTitle"], "");
        assert_eq!(json["imageUrl"], "");
    }
}
