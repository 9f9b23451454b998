use md5::{Digest, Md5};
use rdirdiff_common::Blake3Hash;
use std::io::{self, Read};

/// Files are streamed through the digest in blocks of this size
pub const BLOCK_SIZE: usize = 64 * 1024;

fn stream_blocks<R: Read>(mut reader: R, mut update: impl FnMut(&[u8])) -> io::Result<()> {
    let mut buffer = vec![0; BLOCK_SIZE];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        update(&buffer[..n]);
    }

    Ok(())
}

/// MD5 digest of everything the reader yields
pub fn md5_reader<R: Read>(reader: R) -> io::Result<[u8; 16]> {
    let mut hasher = Md5::new();
    stream_blocks(reader, |block| hasher.update(block))?;

    let mut digest = [0u8; 16];
    digest.copy_from_slice(&hasher.finalize());
    Ok(digest)
}

/// BLAKE3 hash of everything the reader yields
pub fn blake3_reader<R: Read>(reader: R) -> io::Result<Blake3Hash> {
    let mut hasher = blake3::Hasher::new();
    stream_blocks(reader, |block| {
        hasher.update(block);
    })?;
    Ok(hasher.finalize().into())
}
