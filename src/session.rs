//! The `Session` type: a logged-in connection to a RouterOS device.

use std::collections::HashMap;

use crate::error::{ConnectionError, Error, FatalError, Result, TrapError};
use crate::framing::Framing;
use crate::protocol::reply::{parse_attribute_word, ReplyKind};
use crate::protocol::word::QueryPredicate;
use crate::query::Query;
use crate::transport::Transport;

/// The attributes of a single response row (one `!re` sentence), or of a
/// single `!trap` sentence.
///
/// Last write wins if a sentence repeats an attribute name, matching how
/// the device's own `set`-style commands behave on duplicate keys.
pub type AttributeMap = HashMap<String, String>;

/// A logged-in connection to a RouterOS device.
///
/// `Session` is strictly sequential: a call to `call_positional`,
/// `call_attrs`, or any `Query` method blocks until its full response (every
/// row through `!done`) has been read, and `&mut self` on every such method
/// makes concurrent use a compile error rather than a runtime hazard. There
/// is no tag-based multiplexing of multiple in-flight commands.
///
/// Build one with [`crate::login`].
pub struct Session<T: Transport> {
    pub(crate) framing: Framing<T>,
    closed: bool,
}

impl<T: Transport> Session<T> {
    pub(crate) fn new(framing: Framing<T>) -> Self {
        Self {
            framing,
            closed: false,
        }
    }

    /// Runs `command` with plain positional words (e.g. `/cancel`'s tag
    /// argument, or a query command's raw `?`-prefixed predicate words),
    /// returning every `!re` row's attributes.
    pub fn call_positional(&mut self, command: &str, words: &[&str]) -> Result<Vec<AttributeMap>> {
        let mut sentence = Vec::with_capacity(words.len() + 1);
        sentence.push(command);
        sentence.extend_from_slice(words);
        self.call(&sentence)
    }

    /// Runs `command` with `name=value` attributes, returning every `!re`
    /// row's attributes.
    pub fn call_attrs(&mut self, command: &str, attrs: &[(&str, &str)]) -> Result<Vec<AttributeMap>> {
        let owned: Vec<String> = attrs
            .iter()
            .map(|(name, value)| format!("={name}={value}"))
            .collect();
        let borrowed: Vec<&str> = owned.iter().map(String::as_str).collect();
        let mut sentence = Vec::with_capacity(borrowed.len() + 1);
        sentence.push(command);
        sentence.extend_from_slice(&borrowed);
        self.call(&sentence)
    }

    /// Begins building a query against `command` (typically a `print`
    /// command). See [`Query`] for the available predicates.
    pub fn query<'a>(&'a mut self, command: &str) -> Query<'a, T> {
        Query::new(self, command.to_string())
    }

    pub(crate) fn run_query(
        &mut self,
        command: &str,
        predicate: QueryPredicate,
        pairs: &[(&str, Option<&str>)],
    ) -> Result<Vec<AttributeMap>> {
        let words: Vec<String> = pairs
            .iter()
            .map(|(name, value)| predicate.word(name, *value))
            .collect();
        let borrowed: Vec<&str> = words.iter().map(String::as_str).collect();
        self.call_positional(command, &borrowed)
    }

    fn call(&mut self, sentence: &[&str]) -> Result<Vec<AttributeMap>> {
        if self.closed {
            return Err(Error::Connection(ConnectionError::Closed));
        }
        log::debug!("-> {}", sentence.first().unwrap_or(&""));
        if let Err(err) = self.framing.write_sentence(sentence) {
            self.mark_closed();
            return Err(err);
        }
        self.collect_response()
    }

    fn collect_response(&mut self) -> Result<Vec<AttributeMap>> {
        let mut rows = Vec::new();
        let mut traps = Vec::new();
        loop {
            let words = match self.framing.read_sentence() {
                Ok(words) => words,
                Err(err) => {
                    self.mark_closed();
                    return Err(err);
                }
            };
            let Some(leading) = words.first() else {
                continue;
            };
            match ReplyKind::parse(leading) {
                Some(ReplyKind::Reply) => {
                    let attrs = attributes_from(&words[1..]);
                    if !attrs.is_empty() {
                        rows.push(attrs);
                    }
                }
                Some(ReplyKind::Trap) => traps.push(attributes_from(&words[1..])),
                Some(ReplyKind::Done) => {
                    if traps.is_empty() {
                        return Ok(rows);
                    }
                    log::warn!("device reported {} trap sentence(s)", traps.len());
                    return Err(Error::Trap(TrapError { sentences: traps }));
                }
                Some(ReplyKind::Fatal) => unreachable!("Framing::read_sentence raises !fatal itself"),
                None => log::debug!("ignoring unrecognized reply word {leading:?}"),
            }
        }
    }

    fn mark_closed(&mut self) {
        if !self.closed {
            self.closed = true;
            self.framing.close();
        }
    }

    /// Closes the connection. Safe to call more than once.
    pub fn close(&mut self) {
        self.mark_closed();
    }
}

fn attributes_from(words: &[String]) -> AttributeMap {
    let mut map = AttributeMap::new();
    for word in words {
        if let Some((name, value)) = parse_attribute_word(word) {
            map.insert(name.to_string(), value.to_string());
        }
    }
    map
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.mark_closed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn call_collects_rows_until_done() {
        let mut session = session_with_sentences(&[
            &["!re", "=name=ether1"],
            &["!re", "=name=ether2"],
            &["!done"],
        ]);
        let rows = session.call_positional("/interface/print", &[]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some(&"ether1".to_string()));
        assert_eq!(rows[1].get("name"), Some(&"ether2".to_string()));
    }

    #[test]
    fn call_drops_empty_re_rows() {
        let mut session = session_with_sentences(&[
            &["!re"],
            &["!re", "=name=ether1"],
            &["!done"],
        ]);
        let rows = session.call_positional("/interface/print", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&"ether1".to_string()));
    }

    #[test_log::test]
    fn call_drains_past_trap_before_raising() {
        let mut session = session_with_sentences(&[
            &["!trap", "=message=no such item"],
            &["!done"],
        ]);
        let err = session.call_positional("/interface/remove", &[]).unwrap_err();
        match err {
            Error::Trap(trap) => {
                assert_eq!(trap.sentences.len(), 1);
                assert_eq!(
                    trap.sentences[0].get("message"),
                    Some(&"no such item".to_string())
                );
            }
            other => panic!("expected Trap, got {other:?}"),
        }
    }

    #[test]
    fn call_attrs_sends_equals_prefixed_words() {
        let mut session = session_with_sentences(&[&["!done"]]);
        session
            .call_attrs("/ip/address/add", &[("address", "192.168.1.1/24")])
            .unwrap();
        let written = session.framing.transport.written.clone();
        let body = &written[..written.len() - 1];
        let words = crate::protocol::codec::decode_sentence(Encoding::Ascii, body).unwrap();
        assert_eq!(words, vec!["/ip/address/add", "=address=192.168.1.1/24"]);
    }

    #[test]
    fn closed_session_rejects_further_calls() {
        let mut session = session_with_sentences(&[&["!done"]]);
        session.close();
        let err = session.call_positional("/interface/print", &[]).unwrap_err();
        assert!(matches!(err, Error::Connection(ConnectionError::Closed)));
    }

    #[test_log::test]
    fn fatal_reply_closes_the_session() {
        let mut session = session_with_sentences(&[&["!fatal", "session terminated"]]);
        let err = session.call_positional("/interface/print", &[]).unwrap_err();
        assert!(matches!(err, Error::Fatal(_)));
        assert!(session.closed);
    }
}
