//! Pluggable compression of the static record stream.
//!
//! [`RawDeflate`] produces headerless DEFLATE at the best compression level. [`IdentityDeflater`]
//! passes bytes through unchanged and has to be chosen explicitly; nothing falls back to it at
//! runtime.
//!
//! Inflating is capped at [`MAX_STATIC_STREAM_BYTES`], since static codes are untrusted input.

use crate::constants::MAX_STATIC_STREAM_BYTES;
use crate::{CodecError, CodecResult};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compression provider for the static stream.
pub trait Deflater: Send + Sync + std::fmt::Debug {
    fn compress(&self, bytes: &[u8]) -> CodecResult<Vec<u8>>;
    fn decompress(&self, bytes: &[u8]) -> CodecResult<Vec<u8>>;
}

/// Raw DEFLATE (no zlib or gzip header), level 9.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawDeflate;

impl Deflater for RawDeflate {
    fn compress(&self, bytes: &[u8]) -> CodecResult<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(bytes).map_err(CodecError::Compression)?;
        encoder.finish().map_err(CodecError::Compression)
    }

    fn decompress(&self, bytes: &[u8]) -> CodecResult<Vec<u8>> {
        let mut out = Vec::new();
        DeflateDecoder::new(bytes)
            .take(MAX_STATIC_STREAM_BYTES as u64 + 1)
            .read_to_end(&mut out)
            .map_err(CodecError::Decompression)?;

        if out.len() > MAX_STATIC_STREAM_BYTES {
            return Err(CodecError::Decompression(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("inflated static stream exceeds {MAX_STATIC_STREAM_BYTES} bytes"),
            )));
        }
        Ok(out)
    }
}

/// Pass-through provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityDeflater;

impl Deflater for IdentityDeflater {
    fn compress(&self, bytes: &[u8]) -> CodecResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    fn decompress(&self, bytes: &[u8]) -> CodecResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}
