//! Sentence framing on top of a [`Transport`]: turns the length-prefixed
//! word stream into whole sentences, and detects `!fatal` as soon as it
//! arrives.

use crate::error::{ConnectionError, Error, FatalError};
use crate::protocol::codec::{self, Encoding};
use crate::protocol::reply::ReplyKind;
use crate::transport::Transport;

/// Reads and writes whole sentences over a [`Transport`], using `encoding`
/// for every word.
pub struct Framing<T: Transport> {
    pub(crate) transport: T,
    encoding: Encoding,
}

impl<T: Transport> Framing<T> {
    /// Wraps `transport`, framing words under `encoding`.
    pub fn new(transport: T, encoding: Encoding) -> Self {
        Self { transport, encoding }
    }

    /// Writes `words` as a single sentence, terminated by the zero-length
    /// end-of-sentence word.
    pub fn write_sentence(&mut self, words: &[&str]) -> Result<(), Error> {
        log::trace!("writing sentence of {} word(s)", words.len());
        let bytes = codec::encode_sentence(self.encoding, words).map_err(Error::Connection)?;
        self.transport.write_all(&bytes).map_err(Error::Connection)?;
        Ok(())
    }

    /// Reads a single word, or `None` if the zero-length end-of-sentence
    /// word was read instead.
    pub fn read_word(&mut self) -> Result<Option<String>, ConnectionError> {
        let mut first = [0u8; 1];
        self.transport.read_exact(&mut first)?;
        if first[0] == 0 {
            return Ok(None);
        }
        let extra = codec::determine_length(first[0])?;
        let mut prefix = vec![first[0]];
        if extra > 0 {
            let mut rest = vec![0u8; extra];
            self.transport.read_exact(&mut rest)?;
            prefix.extend(rest);
        }
        let length = codec::decode_bytes(&prefix)? as usize;
        let mut raw = vec![0u8; length];
        self.transport.read_exact(&mut raw)?;
        let word = codec::decode_word(self.encoding, &raw)?;
        Ok(Some(word))
    }

    /// Reads one complete sentence (every word up to the next end-of-sentence
    /// marker).
    ///
    /// If the sentence's leading word is `!fatal`, the transport is closed
    /// before this returns [`Error::Fatal`] — a fatal reply means the
    /// device is terminating the connection and there is nothing further
    /// to read.
    pub fn read_sentence(&mut self) -> Result<Vec<String>, Error> {
        let mut words = Vec::new();
        while let Some(word) = self.read_word().map_err(Error::Connection)? {
            words.push(word);
        }
        if let Some(first) = words.first() {
            if ReplyKind::parse(first) == Some(ReplyKind::Fatal) {
                let reason = words.get(1).cloned().unwrap_or_default();
                log::warn!("device sent !fatal: {reason}");
                self.transport.close();
                return Err(Error::Fatal(FatalError { reason }));
            }
        }
        Ok(words)
    }

    /// Closes the underlying transport. Idempotent.
    pub fn close(&mut self) {
        self.transport.close();
    }
}
