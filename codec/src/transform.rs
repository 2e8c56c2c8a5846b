//! Byte transforms applied by the encryption codec.
//!
//! A [Transform] maps an input slice into a caller-provided output slice. The caller sizes the
//! output with [Transform::output_size] first, so transforms run directly over buffer storage
//! without intermediate allocation.
//!
//! [Seal] and [Open] implement ChaCha20-Poly1305 with a random nonce per message:
//! `[nonce: 12][ciphertext][tag: 16]`.

use crate::Error;
use chacha20poly1305::{
    aead::{generic_array::typenum::Unsigned, AeadInPlace},
    AeadCore, ChaCha20Poly1305, KeyInit as _, Nonce, Tag,
};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use tracing::trace;

/// Size of a nonce.
pub const NONCE_SIZE: usize = <ChaCha20Poly1305 as AeadCore>::NonceSize::USIZE;

/// Size of an authentication tag.
pub const TAG_SIZE: usize = <ChaCha20Poly1305 as AeadCore>::TagSize::USIZE;

/// Bytes a sealed message adds to its plaintext.
pub const OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// A stateful mapping from one byte sequence to another.
pub trait Transform {
    /// Returns the number of output bytes needed for `input_len` input bytes.
    ///
    /// Fails if no valid input has that length.
    fn output_size(&self, input_len: usize) -> Result<usize, Error>;

    /// Transforms `input` into the start of `output` and returns the number of bytes written.
    ///
    /// `output` must hold at least [Transform::output_size] bytes.
    fn apply(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, Error>;
}

fn check_output(required: usize, output: &[u8]) -> Result<(), Error> {
    if output.len() < required {
        return Err(Error::CapacityExceeded {
            requested: required,
            max: output.len(),
        });
    }
    Ok(())
}

/// Encrypts and authenticates messages.
pub struct Seal {
    cipher: ChaCha20Poly1305,
    rng: StdRng,
}

impl Seal {
    /// Creates a sealing transform with nonces drawn from OS entropy.
    pub fn new(key: [u8; 32]) -> Self {
        Self::with_rng(key, StdRng::from_entropy())
    }

    /// Creates a sealing transform with nonces drawn from `rng`.
    pub fn with_rng(key: [u8; 32], rng: StdRng) -> Self {
        trace!("created seal transform");
        Self {
            cipher: ChaCha20Poly1305::new(&key.into()),
            rng,
        }
    }
}

impl Transform for Seal {
    fn output_size(&self, input_len: usize) -> Result<usize, Error> {
        input_len
            .checked_add(OVERHEAD)
            .ok_or(Error::LengthOverflow(input_len))
    }

    fn apply(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, Error> {
        let len = self.output_size(input.len())?;
        check_output(len, output)?;

        let (nonce, rest) = output.split_at_mut(NONCE_SIZE);
        let (body, rest) = rest.split_at_mut(input.len());
        self.rng.fill_bytes(nonce);
        body.copy_from_slice(input);
        let tag = self
            .cipher
            .encrypt_in_place_detached(Nonce::from_slice(nonce), &[], body)
            .map_err(|_| Error::EncryptionFailed)?;
        rest[..TAG_SIZE].copy_from_slice(&tag);
        Ok(len)
    }
}

/// Authenticates and decrypts messages produced by [Seal].
pub struct Open {
    cipher: ChaCha20Poly1305,
}

impl Open {
    pub fn new(key: [u8; 32]) -> Self {
        trace!("created open transform");
        Self {
            cipher: ChaCha20Poly1305::new(&key.into()),
        }
    }
}

impl Transform for Open {
    fn output_size(&self, input_len: usize) -> Result<usize, Error> {
        input_len
            .checked_sub(OVERHEAD)
            .ok_or(Error::DecryptionFailed)
    }

    fn apply(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, Error> {
        let len = self.output_size(input.len())?;
        check_output(len, output)?;

        let (nonce, rest) = input.split_at(NONCE_SIZE);
        let (body, tag) = rest.split_at(len);
        let plain = &mut output[..len];
        plain.copy_from_slice(body);
        self.cipher
            .decrypt_in_place_detached(Nonce::from_slice(nonce), &[], plain, Tag::from_slice(tag))
            .map_err(|_| Error::DecryptionFailed)?;
        Ok(len)
    }
}
