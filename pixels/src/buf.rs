// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `mmdisplay` developers
use core::mem;

use bytemuck::{Pod, Zeroable};

/// A byte-like type with the largest alignment any sample type requires.
///
/// This type does not contain padding and implements `Pod`, so a slice of it may be viewed as a
/// slice of bytes, of `u16` or of `f32` samples without copying.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(16))]
pub(crate) struct MaxAligned([u8; MAX_ALIGN]);

pub(crate) const MAX_ALIGN: usize = 16;

/// Allocates and manages raw, highly aligned bytes.
///
/// The inner storage is allocated in chunks of [`MAX_ALIGN`] bytes, so its capacity is generally
/// larger than the requested length. The buffer keeps track of the exact logical length and only
/// ever exposes that many bytes.
#[derive(Clone, Default)]
pub struct Buffer {
    /// The backing memory.
    inner: Vec<MaxAligned>,
    /// Logical length in bytes.
    len: usize,
}

impl Buffer {
    const ELEMENT: MaxAligned = MaxAligned([0; MAX_ALIGN]);

    /// Allocate a zeroed buffer with a number of bytes.
    pub fn new(length: usize) -> Self {
        let alloc_len = Self::alloc_len(length);
        let inner = vec![Self::ELEMENT; alloc_len];

        Buffer { inner, len: length }
    }

    /// Allocate a buffer holding a copy of the bytes.
    pub fn with_bytes(bytes: &[u8]) -> Self {
        let mut buffer = Self::new(bytes.len());
        buffer.as_bytes_mut().copy_from_slice(bytes);
        buffer
    }

    /// The logical length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Retrieve the byte capacity of the allocated storage.
    pub fn capacity(&self) -> usize {
        self.inner.capacity() * mem::size_of::<MaxAligned>()
    }

    /// View the logical bytes.
    ///
    /// The slice always starts at an address aligned to at least `MAX_ALIGN`.
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.inner)[..self.len]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut(&mut self.inner)[..self.len]
    }

    /// Calculates the number of chunks to have a byte buffer of requested length.
    fn alloc_len(length: usize) -> usize {
        const CHUNK_SIZE: usize = mem::size_of::<MaxAligned>();

        // Never overflows, at most one chunk is added on top of the quotient.
        length / CHUNK_SIZE + usize::from(length % CHUNK_SIZE != 0)
    }
}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Buffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_logical_length() {
        let buffer = Buffer::new(17);
        assert_eq!(buffer.len(), 17);
        assert_eq!(buffer.as_bytes().len(), 17);
        assert!(buffer.capacity() >= 32);

        let empty = Buffer::new(0);
        assert!(empty.is_empty());
        assert_eq!(empty.capacity(), 0);
    }

    #[test]
    fn aligned_for_samples() {
        let buffer = Buffer::with_bytes(&[0; 12]);
        assert_eq!(buffer.as_bytes().as_ptr() as usize % MAX_ALIGN, 0);
        assert_eq!(bytemuck::try_cast_slice::<u8, f32>(buffer.as_bytes()).map(<[f32]>::len), Ok(3));
        assert_eq!(bytemuck::try_cast_slice::<u8, u16>(buffer.as_bytes()).map(<[u16]>::len), Ok(6));
    }

    #[test]
    fn copies_are_independent() {
        let original = Buffer::with_bytes(&[1, 2, 3]);
        let mut copy = original.clone();
        copy.as_bytes_mut()[1] = 0xff;

        assert_eq!(original.as_bytes(), &[1, 2, 3]);
        assert_eq!(copy.as_bytes(), &[1, 0xff, 3]);
        assert_ne!(original, copy);
    }
}
