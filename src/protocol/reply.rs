//! Reply-sentence classification and attribute-word parsing.

use std::fmt;

/// The four reply words the device can lead a sentence with.
///
/// Using a closed enum here instead of comparing raw strings at every call
/// site keeps the match exhaustive: adding a fifth reply word (should the
/// protocol ever grow one) becomes a compile error at every place that
/// matters instead of a silently-ignored string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// `!re` — one row of a response.
    Reply,
    /// `!done` — the response is complete.
    Done,
    /// `!trap` — a recoverable, application-level error.
    Trap,
    /// `!fatal` — the device is terminating the connection.
    Fatal,
}

impl fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReplyKind::Reply => "!re",
            ReplyKind::Done => "!done",
            ReplyKind::Trap => "!trap",
            ReplyKind::Fatal => "!fatal",
        })
    }
}

impl ReplyKind {
    /// Classifies the leading word of a reply sentence.
    ///
    /// Returns `None` for anything that isn't one of the four known reply
    /// words; the caller decides whether an unrecognized leading word is an
    /// error.
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "!re" => Some(ReplyKind::Reply),
            "!done" => Some(ReplyKind::Done),
            "!trap" => Some(ReplyKind::Trap),
            "!fatal" => Some(ReplyKind::Fatal),
            _ => None,
        }
    }
}

/// Parses an attribute word of the form `=name=value` into its `(name,
/// value)` pair.
///
/// Only the first `=` after the sigil is treated as the separator, so a
/// value containing `=` (e.g. `=comment=a=b`) round-trips correctly. Words
/// that don't start with `=`, or that have no second `=`, return `None`.
pub fn parse_attribute_word(word: &str) -> Option<(&str, &str)> {
    let rest = word.strip_prefix('=')?;
    rest.split_once('=')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_reply_words() {
        assert_eq!(ReplyKind::parse("!re"), Some(ReplyKind::Reply));
        assert_eq!(ReplyKind::parse("!done"), Some(ReplyKind::Done));
        assert_eq!(ReplyKind::parse("!trap"), Some(ReplyKind::Trap));
        assert_eq!(ReplyKind::parse("!fatal"), Some(ReplyKind::Fatal));
        assert_eq!(ReplyKind::parse("!unknown"), None);
        assert_eq!(ReplyKind::parse("/ip/address/print"), None);
    }

    #[test]
    fn parses_attribute_words() {
        assert_eq!(parse_attribute_word("=name=ether1"), Some(("name", "ether1")));
        assert_eq!(
            parse_attribute_word("=comment=a=b=c"),
            Some(("comment", "a=b=c"))
        );
        assert_eq!(parse_attribute_word("=comment="), Some(("comment", "")));
        // No second `=` at all: not a well-formed `key=value` attribute word.
        assert_eq!(parse_attribute_word("=flag"), None);
        assert_eq!(parse_attribute_word("name=ether1"), None);
    }
}
