//! Word composition helpers for the attribute (`=`) and query (`?`) sigils.

/// Formats an attribute word: `=name=value`.
pub fn attribute_word(name: &str, value: &str) -> String {
    format!("={name}={value}")
}

/// The five query predicate forms a [`crate::query::Query`] can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPredicate {
    /// `?name` — the property is present.
    Has,
    /// `?-name` — the property is absent.
    HasNot,
    /// `?=name=value` — the property equals `value`.
    Equal,
    /// `?<name=value` — the property is less than `value`.
    Lower,
    /// `?>name=value` — the property is greater than `value`.
    Greater,
}

impl QueryPredicate {
    /// Formats this predicate against `name` (and `value`, for the
    /// comparison forms) as the literal query word sent on the wire.
    pub fn word(self, name: &str, value: Option<&str>) -> String {
        match (self, value) {
            (QueryPredicate::Has, _) => format!("?{name}"),
            (QueryPredicate::HasNot, _) => format!("?-{name}"),
            (QueryPredicate::Equal, Some(v)) => format!("?={name}={v}"),
            (QueryPredicate::Lower, Some(v)) => format!("?<{name}={v}"),
            (QueryPredicate::Greater, Some(v)) => format!("?>{name}={v}"),
            (_, None) => unreachable!("comparison predicates always carry a value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_attribute_word() {
        assert_eq!(attribute_word("name", "ether1"), "=name=ether1");
    }

    #[test]
    fn formats_query_predicates() {
        assert_eq!(QueryPredicate::Has.word("disabled", None), "?disabled");
        assert_eq!(QueryPredicate::HasNot.word("disabled", None), "?-disabled");
        assert_eq!(
            QueryPredicate::Equal.word("name", Some("ether1")),
            "?=name=ether1"
        );
        assert_eq!(
            QueryPredicate::Lower.word("mtu", Some("1500")),
            "?<mtu=1500"
        );
        assert_eq!(
            QueryPredicate::Greater.word("mtu", Some("1500")),
            "?>mtu=1500"
        );
    }
}
