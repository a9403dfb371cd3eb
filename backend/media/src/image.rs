//! Still image → one-frame GIF.

use bytes::Bytes;
use gifsmith_core::MediaError;

use crate::gif_encode::{decode_error, encode_still};

/// Decode any supported still image, drop alpha, and re-encode it as a
/// single-frame GIF of the same dimensions.
pub fn convert_image(bytes: &[u8]) -> Result<Bytes, MediaError> {
    let image = image::load_from_memory(bytes).map_err(decode_error)?;
    encode_still(image.to_rgb8())
}
