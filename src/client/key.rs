use base64::{STANDARD, decode_config};

/// Length of an uncompressed P-256 public key, the form VAPID keys take.
pub const P256_PUBLIC_KEY_LEN: usize = 65;

/// Sender identity in the byte form the push manager expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationServerKey(Vec<u8>);

impl ApplicationServerKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_uncompressed_p256(&self) -> bool {
        self.0.len() == P256_PUBLIC_KEY_LEN && self.0[0] == 0x04
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("application server key is empty")]
    Empty,
    #[error("application server key is not valid base64url: {0}")]
    Invalid(String),
}

/// Decodes a base64url VAPID key, with or without padding. Non-zero bits
/// after the last full byte are ignored.
pub fn decode_application_server_key(encoded: &str) -> Result<ApplicationServerKey, KeyError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(KeyError::Empty);
    }

    let padding = (4 - encoded.len() % 4) % 4;
    let mut standard = String::with_capacity(encoded.len() + padding);
    for ch in encoded.chars() {
        standard.push(match ch {
            '-' => '+',
            '_' => '/',
            other => other,
        });
    }
    standard.extend(std::iter::repeat_n('=', padding));

    decode_config(&standard, STANDARD.decode_allow_trailing_bits(true))
        .map(ApplicationServerKey)
        .map_err(|err| KeyError::Invalid(err.to_string()))
}
