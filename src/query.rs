//! Query predicate composition on top of [`Session::call_positional`].

use crate::error::Result;
use crate::protocol::word::QueryPredicate;
use crate::session::{AttributeMap, Session};
use crate::transport::Transport;

/// A query against `command`, built one predicate call at a time.
///
/// Each predicate method (`has`, `hasnot`, `equal`, `lower`, `greater`)
/// performs exactly one round trip and returns its result directly — this
/// is not a deferred builder that accumulates predicates before sending.
/// Borrowing `&mut Session` for the lifetime of the `Query` still prevents
/// any other call from interleaving with a multi-predicate query, which is
/// the property that matters: the device sees one `print` per predicate
/// call, each independently filtered.
pub struct Query<'a, T: Transport> {
    session: &'a mut Session<T>,
    command: String,
}

impl<'a, T: Transport> Query<'a, T> {
    pub(crate) fn new(session: &'a mut Session<T>, command: String) -> Self {
        Self { session, command }
    }

    /// `?name1`, `?name2`, ... — rows where every name in `names` is
    /// present, in the order given.
    pub fn has(&mut self, names: &[&str]) -> Result<Vec<AttributeMap>> {
        let pairs: Vec<(&str, Option<&str>)> = names.iter().map(|name| (*name, None)).collect();
        self.session
            .run_query(&self.command, QueryPredicate::Has, &pairs)
    }

    /// `?-name1`, `?-name2`, ... — rows where every name in `names` is
    /// absent, in the order given.
    pub fn hasnot(&mut self, names: &[&str]) -> Result<Vec<AttributeMap>> {
        let pairs: Vec<(&str, Option<&str>)> = names.iter().map(|name| (*name, None)).collect();
        self.session
            .run_query(&self.command, QueryPredicate::HasNot, &pairs)
    }

    /// `?=name=value` per pair — rows where every named property equals its
    /// paired value, in the order given.
    pub fn equal(&mut self, pairs: &[(&str, &str)]) -> Result<Vec<AttributeMap>> {
        self.run(QueryPredicate::Equal, pairs)
    }

    /// `?<name=value` per pair — rows where every named property is lower
    /// than its paired value, in the order given.
    pub fn lower(&mut self, pairs: &[(&str, &str)]) -> Result<Vec<AttributeMap>> {
        self.run(QueryPredicate::Lower, pairs)
    }

    /// `?>name=value` per pair — rows where every named property is greater
    /// than its paired value, in the order given.
    pub fn greater(&mut self, pairs: &[(&str, &str)]) -> Result<Vec<AttributeMap>> {
        self.run(QueryPredicate::Greater, pairs)
    }

    fn run(
        &mut self,
        predicate: QueryPredicate,
        pairs: &[(&str, &str)],
    ) -> Result<Vec<AttributeMap>> {
        let pairs: Vec<(&str, Option<&str>)> =
            pairs.iter().map(|(name, value)| (*name, Some(*value))).collect();
        self.session.run_query(&self.command, predicate, &pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::Framing;
    use crate::protocol::codec::{encode_sentence, Encoding};
    use crate::transport::fake::FakeTransport;

    fn session_with_sentences(sentences: &[&[&str]]) -> Session<FakeTransport> {
        let mut bytes = Vec::new();
        for sentence in sentences {
            bytes.extend(encode_sentence(Encoding::Ascii, sentence).unwrap());
        }
        let framing = Framing::new(FakeTransport::with_script(&bytes), Encoding::Ascii);
        Session::new(framing)
    }

    #[test]
    fn equal_sends_the_comparison_word() {
        let mut session = session_with_sentences(&[&["!done"]]);
        session
            .query("/interface/print")
            .equal(&[("name", "ether1")])
            .unwrap();
        let written = session_written(&mut session);
        assert_eq!(written, vec!["/interface/print", "?=name=ether1"]);
    }

    #[test]
    fn equal_sends_one_word_per_pair_in_order() {
        let mut session = session_with_sentences(&[&["!done"]]);
        session
            .query("/ip/pool/print")
            .equal(&[("foo", "bar"), ("bar", "foo")])
            .unwrap();
        let written = session_written(&mut session);
        assert_eq!(
            written,
            vec!["/ip/pool/print", "?=foo=bar", "?=bar=foo"]
        );
    }

    #[test]
    fn hasnot_sends_the_minus_prefixed_word() {
        let mut session = session_with_sentences(&[&["!done"]]);
        session
            .query("/ip/address/print")
            .hasnot(&["disabled"])
            .unwrap();
        let written = session_written(&mut session);
        assert_eq!(written, vec!["/ip/address/print", "?-disabled"]);
    }

    fn session_written(session: &mut Session<FakeTransport>) -> Vec<String> {
        let written = session.framing.transport.written.clone();
        let body = &written[..written.len() - 1];
        crate::protocol::codec::decode_sentence(Encoding::Ascii, body).unwrap()
    }
}
