//! # Datasets
//!
//! In-memory view of a single Turtle resource.
//!
//! ## Model
//! - A `Dataset` is every triple of one resource, grouped by subject in the
//!   order subjects first appear
//! - A `Thing` is one subject and its predicate/object pairs, in document order
//! - Blank-node subjects are kept so a round trip does not lose data, but
//!   `things()` only yields named subjects
//!
//! ## Writes
//! - `set_thing` replaces every triple of the subject
//! - The whole dataset is serialized on save, there is no changelog/patch
use indexmap::IndexMap;
use rio_api::{
    formatter::TriplesFormatter,
    model::{BlankNode, Literal, NamedNode, Subject, Triple},
    parser::TriplesParser,
};
use rio_turtle::{TurtleFormatter, TurtleParser};

use crate::{
    error::{PodError, Result},
    vocab::XSD_STRING,
};

const BLANK_PREFIX: &str = "_:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    pub fn string(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    fn from_rio(term: rio_api::model::Term<'_>) -> Option<Self> {
        match term {
            rio_api::model::Term::NamedNode(node) => Some(Term::Iri(node.iri.to_string())),
            rio_api::model::Term::BlankNode(node) => Some(Term::Blank(node.id.to_string())),
            rio_api::model::Term::Literal(literal) => Some(match literal {
                Literal::Simple { value } => Term::string(value),
                Literal::LanguageTaggedString { value, language } => Term::Literal {
                    value: value.to_string(),
                    datatype: None,
                    language: Some(language.to_string()),
                },
                Literal::Typed { value, datatype } => Term::Literal {
                    value: value.to_string(),
                    datatype: Some(datatype.iri.to_string()),
                    language: None,
                },
            }),
            _ => None,
        }
    }

    fn to_rio(&self) -> rio_api::model::Term<'_> {
        match self {
            Term::Iri(iri) => rio_api::model::Term::NamedNode(NamedNode { iri: iri.as_str() }),
            Term::Blank(id) => rio_api::model::Term::BlankNode(BlankNode { id: id.as_str() }),
            Term::Literal {
                value,
                language: Some(language),
                ..
            } => rio_api::model::Term::Literal(Literal::LanguageTaggedString {
                value: value.as_str(),
                language: language.as_str(),
            }),
            Term::Literal {
                value,
                datatype: Some(datatype),
                ..
            } if datatype != XSD_STRING => rio_api::model::Term::Literal(Literal::Typed {
                value: value.as_str(),
                datatype: NamedNode {
                    iri: datatype.as_str(),
                },
            }),
            Term::Literal { value, .. } => rio_api::model::Term::Literal(Literal::Simple {
                value: value.as_str(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thing {
    url: String,
    predicates: Vec<(String, Vec<Term>)>,
}

impl Thing {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            predicates: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_blank(&self) -> bool {
        self.url.starts_with(BLANK_PREFIX)
    }

    pub fn values(&self, predicate: &str) -> &[Term] {
        self.predicates
            .iter()
            .find(|(key, _)| key == predicate)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    /// First plain string (no language tag, `xsd:string` or untyped).
    pub fn string_no_locale(&self, predicate: &str) -> Option<&str> {
        self.values(predicate).iter().find_map(|term| match term {
            Term::Literal {
                value,
                datatype,
                language: None,
            } if datatype.as_deref().is_none_or(|dt| dt == XSD_STRING) => Some(value.as_str()),
            _ => None,
        })
    }

    /// First IRI object.
    pub fn url_value(&self, predicate: &str) -> Option<&str> {
        self.values(predicate).iter().find_map(|term| match term {
            Term::Iri(iri) => Some(iri.as_str()),
            _ => None,
        })
    }

    pub fn add(&mut self, predicate: &str, term: Term) {
        match self.predicates.iter_mut().find(|(key, _)| key == predicate) {
            Some((_, values)) => values.push(term),
            None => self.predicates.push((predicate.to_string(), vec![term])),
        }
    }

    fn to_rio_subject(&self) -> Subject<'_> {
        match self.url.strip_prefix(BLANK_PREFIX) {
            Some(id) => Subject::BlankNode(BlankNode { id }),
            None => Subject::NamedNode(NamedNode {
                iri: self.url.as_str(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.predicates.iter().map(|(_, values)| values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct ThingBuilder {
    thing: Thing,
}

impl ThingBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            thing: Thing::new(url),
        }
    }

    pub fn add_string_no_locale(mut self, predicate: &str, value: impl Into<String>) -> Self {
        self.thing.add(predicate, Term::string(value));
        self
    }

    pub fn add_url(mut self, predicate: &str, url: impl Into<String>) -> Self {
        self.thing.add(predicate, Term::Iri(url.into()));
        self
    }

    pub fn build(self) -> Thing {
        self.thing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    things: IndexMap<String, Thing>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative IRIs in `body` resolve against `base`.
    pub fn from_turtle(body: &[u8], base: &str) -> Result<Self> {
        let base = oxiri::Iri::parse(base.to_string())?;
        let mut dataset = Dataset::new();

        TurtleParser::new(body, Some(base)).parse_all(&mut |triple: Triple<'_>| -> Result<()> {
            let subject = match triple.subject {
                Subject::NamedNode(node) => node.iri.to_string(),
                Subject::BlankNode(node) => format!("{BLANK_PREFIX}{}", node.id),
                _ => return Ok(()),
            };

            if let Some(object) = Term::from_rio(triple.object) {
                dataset
                    .things
                    .entry(subject.clone())
                    .or_insert_with(|| Thing::new(subject))
                    .add(triple.predicate.iri, object);
            }

            Ok(())
        })?;

        Ok(dataset)
    }

    pub fn to_turtle(&self) -> Result<Vec<u8>> {
        let mut formatter = TurtleFormatter::new(Vec::new());

        for thing in self.things.values() {
            for (predicate, values) in &thing.predicates {
                for value in values {
                    formatter.format(&Triple {
                        subject: thing.to_rio_subject(),
                        predicate: NamedNode {
                            iri: predicate.as_str(),
                        },
                        object: value.to_rio(),
                    })?;
                }
            }
        }

        formatter.finish().map_err(PodError::from)
    }

    pub fn thing(&self, url: &str) -> Option<&Thing> {
        self.things.get(url)
    }

    /// Named things only.
    pub fn things(&self) -> impl Iterator<Item = &Thing> {
        self.things.values().filter(|thing| !thing.is_blank())
    }

    /// Replaces `thing` in place, new subjects go last.
    pub fn set_thing(&mut self, thing: Thing) {
        self.things.insert(thing.url.clone(), thing);
    }

    pub fn remove_thing(&mut self, url: &str) -> Option<Thing> {
        self.things.shift_remove(url)
    }

    pub fn len(&self) -> usize {
        self.things.len()
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }
}
