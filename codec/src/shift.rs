//! Acquisition color buffers store three channel bytes followed by an unused byte per pixel. The
//! display engine wants packed integers whose unused byte is the most significant one. The two are
//! related by moving the whole byte sequence one position, not by rotating each pixel.

/// Shift right by one byte across the buffer, then pack every four bytes big-endian.
///
/// The first packed integer always starts with a zero byte and the final input byte is dropped.
/// A trailing partial group is ignored.
pub(crate) fn pack_rgb32(bytes: &[u8]) -> Vec<u32> {
    let mut carry = 0;
    bytes
        .chunks_exact(4)
        .map(|group| {
            let packed = u32::from_be_bytes([carry, group[0], group[1], group[2]]);
            carry = group[3];
            packed
        })
        .collect()
}

/// Unpack big-endian and shift left by one byte across the buffer, zero filling the end.
pub(crate) fn unpack_rgb32(pixels: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 4);
    for (idx, pixel) in pixels.iter().enumerate() {
        let [_, b1, b2, b3] = pixel.to_be_bytes();
        let next = pixels.get(idx + 1).map_or(0, |next| next.to_be_bytes()[0]);
        bytes.extend_from_slice(&[b1, b2, b3, next]);
    }
    bytes
}

/// Extract one byte of every four-byte group, from the unshifted acquisition layout.
pub(crate) fn single_component(bytes: &[u8], component: usize) -> Vec<u8> {
    debug_assert!(component < 4);
    bytes.chunks_exact(4).map(|group| group[component]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_is_global() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8];
        let packed = pack_rgb32(&bytes);
        assert_eq!(packed, [0x0001_0203, 0x0405_0607]);

        let packed_bytes: Vec<u8> = packed.iter().flat_map(|p| p.to_be_bytes()).collect();
        assert_eq!(packed_bytes, [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn unshift_fills_zero() {
        assert_eq!(
            unpack_rgb32(&[0x0001_0203, 0x0405_0607]),
            [1, 2, 3, 4, 5, 6, 7, 0]
        );
    }

    #[test]
    fn empty_buffers() {
        assert!(pack_rgb32(&[]).is_empty());
        assert!(unpack_rgb32(&[]).is_empty());
        assert!(single_component(&[], 1).is_empty());
    }

    #[test]
    fn components_of_each_group() {
        let bytes = [10, 11, 12, 0, 20, 21, 22, 0];
        assert_eq!(single_component(&bytes, 0), [10, 20]);
        assert_eq!(single_component(&bytes, 1), [11, 21]);
        assert_eq!(single_component(&bytes, 2), [12, 22]);
    }
}
