use serde::{Deserialize, Serialize};

/// Contact role of a column, derived from its header name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderKind {
    Email,
    Phone,
    Other,
}

/// Case-insensitive substring test. "email" wins over "phone" when a header
/// contains both tokens.
pub fn classify_header(name: &str) -> HeaderKind {
    let lower = name.to_lowercase();
    if lower.contains("email") {
        HeaderKind::Email
    } else if lower.contains("phone") {
        HeaderKind::Phone
    } else {
        HeaderKind::Other
    }
}

/// Classification of every header of one run, in header order
#[derive(Debug, Clone, Default)]
pub struct HeaderClassification {
    entries: Vec<(String, HeaderKind)>,
}

impl HeaderClassification {
    pub fn new(headers: &[String]) -> Self {
        let entries = headers
            .iter()
            .map(|header| (header.clone(), classify_header(header)))
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, HeaderKind)> {
        self.entries
            .iter()
            .map(|(header, kind)| (header.as_str(), *kind))
    }

}
