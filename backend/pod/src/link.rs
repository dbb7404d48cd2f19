//! # Link Headers
//!
//! Minimal RFC 8288 parsing for the storage probe.
//!
//! ```text
//! Link: <http://www.w3.org/ns/pim/space#Storage>; rel="type", <.acl>; rel="acl"
//! ```
//!
//! - Each `<uri>` starts a new reference, parameters follow after `;`
//! - `rel="a b"` expands into one reference per relation type
//! - Anything that does not look like a reference is skipped
use std::sync::LazyLock;

use regex::Regex;

use crate::vocab::PIM_STORAGE_TYPE;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<([^>]*)>((?:\s*;\s*[A-Za-z0-9!#$&+\-.^_`|~*]+\s*(?:=\s*(?:"(?:[^"\\]|\\.)*"|[^;,\s]*))?)*)"#,
    )
    .expect("link pattern compiles")
});

static PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#";\s*([A-Za-z0-9!#$&+\-.^_`|~*]+)\s*(?:=\s*(?:"((?:[^"\\]|\\.)*)"|([^;,\s]*)))?"#,
    )
    .expect("param pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    pub uri: String,
    pub rel: String,
    pub params: Vec<(String, String)>,
}

impl LinkRef {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub fn parse(header: &str) -> Vec<LinkRef> {
    let mut refs = Vec::new();

    for link in LINK_RE.captures_iter(header) {
        let uri = link[1].trim().to_string();
        let mut rels = Vec::new();
        let mut params = Vec::new();

        for param in PARAM_RE.captures_iter(&link[2]) {
            let key = param[1].to_ascii_lowercase();
            let value = param
                .get(2)
                .map(|quoted| unescape(quoted.as_str()))
                .or_else(|| param.get(3).map(|bare| bare.as_str().to_string()))
                .unwrap_or_default();

            if key == "rel" {
                // only the first rel counts
                if rels.is_empty() {
                    rels.extend(value.split_whitespace().map(str::to_ascii_lowercase));
                }
            } else {
                params.push((key, value));
            }
        }

        for rel in rels {
            refs.push(LinkRef {
                uri: uri.clone(),
                rel,
                params: params.clone(),
            });
        }
    }

    refs
}

pub fn has_storage_type(refs: &[LinkRef]) -> bool {
    refs.iter()
        .any(|link| link.rel == "type" && link.uri == PIM_STORAGE_TYPE)
}

fn unescape(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }

    out
}
