//! Connecting and logging in to a device.

use md5::{Digest, Md5};

use crate::error::{ConnectionError, Error, Result};
use crate::framing::Framing;
use crate::protocol::codec::Encoding;
use crate::session::Session;
use crate::transport::TcpTransport;

/// The RouterOS API's default (plaintext) port.
pub const DEFAULT_PORT: u16 = 8728;

/// Connects to `host:port` and logs in as `username`/`password`, returning
/// a ready-to-use [`Session`].
///
/// Set `use_old_login_method` for devices running RouterOS before v6.43,
/// which require the MD5 challenge/response handshake instead of sending
/// the password directly. Both `username` and `password` must be ASCII;
/// the wire protocol has no defined encoding for non-ASCII credentials.
///
/// On any failure the underlying connection is closed before this
/// returns — a failed login never leaves a dangling socket behind.
pub fn login(
    username: &str,
    password: &str,
    host: &str,
    port: u16,
    use_old_login_method: bool,
) -> Result<Session<TcpTransport>> {
    if !username.is_ascii() || !password.is_ascii() {
        return Err(Error::Connection(ConnectionError::Encoding {
            encoding: Encoding::Ascii,
        }));
    }

    log::info!("connecting to {host}:{port}");
    let transport = TcpTransport::connect((host, port)).map_err(Error::Connection)?;
    let mut framing = Framing::new(transport, Encoding::Ascii);

    if let Err(err) = perform_handshake(&mut framing, username, password, use_old_login_method) {
        framing.close();
        return Err(err);
    }

    log::info!("login succeeded");
    Ok(Session::new(framing))
}

fn perform_handshake(
    framing: &mut Framing<TcpTransport>,
    username: &str,
    password: &str,
    use_old_login_method: bool,
) -> Result<()> {
    if use_old_login_method {
        framing.write_sentence(&["/login"])?;
        let reply = framing.read_sentence()?;
        let token = extract_attribute(&reply, "ret").ok_or_else(|| {
            Error::Connection(ConnectionError::Decoding {
                encoding: Encoding::Ascii,
            })
        })?;
        let response = encode_password(&token, password)?;
        let name_word = format!("=name={username}");
        let response_word = format!("=response={response}");
        framing.write_sentence(&["/login", name_word.as_str(), response_word.as_str()])?;
    } else {
        let name_word = format!("=name={username}");
        let password_word = format!("=password={password}");
        framing.write_sentence(&["/login", name_word.as_str(), password_word.as_str()])?;
    }
    drain_login_reply(framing)
}

/// Reads sentences until `!done`, raising whatever the device reports
/// (`!trap` becomes [`Error::Trap`], `!fatal` is raised directly by
/// [`Framing::read_sentence`]).
fn drain_login_reply(framing: &mut Framing<TcpTransport>) -> Result<()> {
    use crate::error::TrapError;
    use crate::protocol::reply::{parse_attribute_word, ReplyKind};

    let mut traps = Vec::new();
    loop {
        let words = framing.read_sentence()?;
        match words.first().and_then(|w| ReplyKind::parse(w)) {
            Some(ReplyKind::Done) => {
                return if traps.is_empty() {
                    Ok(())
                } else {
                    Err(Error::Trap(TrapError { sentences: traps }))
                };
            }
            Some(ReplyKind::Trap) => {
                let mut map = std::collections::HashMap::new();
                for word in &words[1..] {
                    if let Some((name, value)) = parse_attribute_word(word) {
                        map.insert(name.to_string(), value.to_string());
                    }
                }
                traps.push(map);
            }
            _ => {}
        }
    }
}

fn extract_attribute(words: &[String], name: &str) -> Option<String> {
    use crate::protocol::reply::parse_attribute_word;
    words.iter().find_map(|word| {
        let (key, value) = parse_attribute_word(word)?;
        (key == name).then(|| value.to_string())
    })
}

/// Computes the pre-v6.43 login response from the device's hex-encoded
/// `token` and the plaintext `password`.
///
/// `response = "00" + hex(md5(0x00 || password || unhex(token)))`, matching
/// the algorithm every RouterOS client before v6.43 implements.
fn encode_password(token: &str, password: &str) -> Result<String> {
    let token_bytes = hex_decode(token).ok_or_else(|| {
        Error::Connection(ConnectionError::Decoding {
            encoding: Encoding::Ascii,
        })
    })?;
    let mut hasher = Md5::new();
    hasher.update([0u8]);
    hasher.update(password.as_bytes());
    hasher.update(&token_bytes);
    let digest = hasher.finalize();
    Ok(format!("00{digest:x}"))
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
