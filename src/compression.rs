//! Codecs for overflow strings persisted to disk.
//!
//! Compressed bytes do not need to be bit-exact across versions, only
//! `decompress(compress(x)) == x` must hold.

use crate::config::CompressionType;
use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compress `data` with the given codec.
pub fn compress(compression: CompressionType, data: &[u8]) -> Result<Vec<u8>> {
    match compression {
        CompressionType::Gzip => {
            let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        #[cfg(feature = "snappy")]
        CompressionType::Snappy => snap::raw::Encoder::new()
            .compress_vec(data)
            .map_err(|e| Error::internal(format!("Compression failed: {}", e))),
        #[cfg(feature = "lz4-compression")]
        CompressionType::Lz4 => Ok(lz4::block::compress(data, None, false)?),
    }
}

/// Decompress `data` into `target`, which must be exactly the uncompressed size.
///
/// Any payload that does not decode to exactly `target.len()` bytes is
/// reported as corruption.
pub fn decompress_into(compression: CompressionType, data: &[u8], target: &mut [u8]) -> Result<()> {
    match compression {
        CompressionType::Gzip => {
            let mut decoder = GzDecoder::new(data);
            decoder
                .read_exact(target)
                .map_err(|e| Error::corruption(format!("Overflow string decompression failed: {}", e)))?;
            // Drain to the end so the gzip trailer (crc + size) is verified
            let mut trailing = [0u8; 1];
            let extra = decoder
                .read(&mut trailing)
                .map_err(|e| Error::corruption(format!("Overflow string decompression failed: {}", e)))?;
            if extra != 0 {
                return Err(Error::corruption("Overflow string is longer than its recorded size"));
            }
            Ok(())
        }
        #[cfg(feature = "snappy")]
        CompressionType::Snappy => {
            let written = snap::raw::Decoder::new()
                .decompress(data, target)
                .map_err(|e| Error::corruption(format!("Overflow string decompression failed: {}", e)))?;
            check_length(written, target.len())
        }
        #[cfg(feature = "lz4-compression")]
        CompressionType::Lz4 => {
            let written = lz4::block::decompress_to_buffer(data, Some(target.len() as i32), target)
                .map_err(|e| Error::corruption(format!("Overflow string decompression failed: {}", e)))?;
            check_length(written, target.len())
        }
    }
}

#[cfg(any(feature = "snappy", feature = "lz4-compression"))]
fn check_length(written: usize, expected: usize) -> Result<()> {
    if written != expected {
        return Err(Error::corruption(format!(
            "Overflow string decompressed to {} bytes, expected {}",
            written, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_roundtrip() {
        let data = b"hello hello hello hello hello hello".repeat(100);
        let compressed = compress(CompressionType::Gzip, &data).unwrap();
        assert!(compressed.len() < data.len());

        let mut out = vec![0u8; data.len()];
        decompress_into(CompressionType::Gzip, &compressed, &mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_gzip_empty() {
        let compressed = compress(CompressionType::Gzip, b"").unwrap();
        let mut out = [0u8; 0];
        decompress_into(CompressionType::Gzip, &compressed, &mut out).unwrap();
    }

    #[test]
    fn test_gzip_wrong_size() {
        let data = b"some overflow string".to_vec();
        let compressed = compress(CompressionType::Gzip, &data).unwrap();

        let mut short = vec![0u8; data.len() - 1];
        assert!(matches!(
            decompress_into(CompressionType::Gzip, &compressed, &mut short),
            Err(Error::Corruption(_))
        ));

        let mut long = vec![0u8; data.len() + 1];
        assert!(matches!(
            decompress_into(CompressionType::Gzip, &compressed, &mut long),
            Err(Error::Corruption(_))
        ));
    }

    #[test]
    fn test_gzip_garbage() {
        let mut out = vec![0u8; 16];
        let result = decompress_into(CompressionType::Gzip, b"definitely not gzip", &mut out);
        assert!(matches!(result, Err(Error::Corruption(_))));
    }

    #[cfg(feature = "snappy")]
    #[test]
    fn test_snappy_roundtrip() {
        let data = b"snappy snappy snappy".repeat(50);
        let compressed = compress(CompressionType::Snappy, &data).unwrap();
        let mut out = vec![0u8; data.len()];
        decompress_into(CompressionType::Snappy, &compressed, &mut out).unwrap();
        assert_eq!(out, data);
    }

    #[cfg(feature = "lz4-compression")]
    #[test]
    fn test_lz4_roundtrip() {
        let data = b"lz4 lz4 lz4 lz4".repeat(50);
        let compressed = compress(CompressionType::Lz4, &data).unwrap();
        let mut out = vec![0u8; data.len()];
        decompress_into(CompressionType::Lz4, &compressed, &mut out).unwrap();
        assert_eq!(out, data);
    }
}
