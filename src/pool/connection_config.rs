//! Connection-level charset and decoding policy.

use crate::error_handling::RequestError;

/// Character set used to decode response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
        }
    }
}

/// What to do with input that cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingErrorAction {
    /// Drop the offending bytes
    Ignore,
    /// Substitute U+FFFD
    Replace,
    /// Fail the decode
    Report,
}

/// Charset and decoding policy applied to every pooled connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub charset: Charset,
    pub malformed_input_action: CodingErrorAction,
    /// Every Unicode scalar value is representable in UTF-8, so this only
    /// matters for narrower charsets.
    pub unmappable_input_action: CodingErrorAction,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            charset: Charset::Utf8,
            malformed_input_action: CodingErrorAction::Ignore,
            unmappable_input_action: CodingErrorAction::Ignore,
        }
    }
}

impl ConnectionConfig {
    /// Decodes a response body according to the malformed-input action.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::MalformedInput` with the byte offset of the first
    /// invalid sequence when the action is `Report`.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, RequestError> {
        let mut decoded = String::with_capacity(bytes.len());
        let mut rest = bytes;
        let mut offset = 0;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    return Ok(decoded);
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    decoded.push_str(&String::from_utf8_lossy(&rest[..valid_up_to]));

                    match self.malformed_input_action {
                        CodingErrorAction::Ignore => {}
                        CodingErrorAction::Replace => decoded.push(char::REPLACEMENT_CHARACTER),
                        CodingErrorAction::Report => {
                            return Err(RequestError::MalformedInput {
                                charset: self.charset.name(),
                                offset: offset + valid_up_to,
                            });
                        }
                    }

                    // error_len() is None for a sequence truncated by end of input
                    let skip = valid_up_to + e.error_len().unwrap_or(rest.len() - valid_up_to);
                    offset += skip;
                    rest = &rest[skip..];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_action(action: CodingErrorAction) -> ConnectionConfig {
        ConnectionConfig {
            malformed_input_action: action,
            ..ConnectionConfig::default()
        }
    }

    #[test]
    fn test_valid_utf8_is_untouched() {
        let config = ConnectionConfig::default();
        assert_eq!(config.decode("héllo wörld".as_bytes()).unwrap(), "héllo wörld");
    }

    #[test]
    fn test_ignore_drops_malformed_bytes() {
        let config = ConnectionConfig::default();
        let bytes = [b'a', 0xff, b'b', 0xc3, 0x28, b'c'];
        assert_eq!(config.decode(&bytes).unwrap(), "ab(c");
    }

    #[test]
    fn test_ignore_drops_truncated_tail() {
        let config = ConnectionConfig::default();
        let bytes = [b'o', b'k', 0xe2, 0x82];
        assert_eq!(config.decode(&bytes).unwrap(), "ok");
    }

    #[test]
    fn test_replace_substitutes_replacement_char() {
        let config = with_action(CodingErrorAction::Replace);
        let bytes = [b'a', 0xff, b'b'];
        assert_eq!(config.decode(&bytes).unwrap(), "a\u{FFFD}b");
    }

    #[test]
    fn test_report_fails_with_offset() {
        let config = with_action(CodingErrorAction::Report);
        let bytes = [b'a', b'b', 0xff];
        match config.decode(&bytes) {
            Err(RequestError::MalformedInput { charset, offset }) => {
                assert_eq!(charset, "UTF-8");
                assert_eq!(offset, 2);
            }
            other => panic!("expected malformed input error, got {other:?}"),
        }
    }
}
