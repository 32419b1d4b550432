use base64::{encode_config, STANDARD, URL_SAFE};

#[inline]
pub(crate) fn standard(data: &[u8]) -> String {
    encode_config(data, STANDARD)
}

#[inline]
pub(crate) fn urlsafe(data: &[u8]) -> String {
    encode_config(data, URL_SAFE)
}
