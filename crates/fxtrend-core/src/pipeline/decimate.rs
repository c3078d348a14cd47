/// Spacing, in observations, between the points kept for charting.
pub const DECIMATION_STRIDE: usize = 2;

/// Keeps every other element counting back from the last, so the most recent
/// element always survives.
pub fn decimate<T: Clone>(seq: &[T]) -> Vec<T> {
    decimate_with_stride(seq, DECIMATION_STRIDE)
}

/// Keeps index `i` iff `(len - 1 - i) % stride == 0`. A stride of 0 or 1
/// keeps everything.
pub fn decimate_with_stride<T: Clone>(seq: &[T], stride: usize) -> Vec<T> {
    let stride = stride.max(1);
    let last = match seq.len().checked_sub(1) {
        Some(last) => last,
        None => return Vec::new(),
    };

    seq.iter()
        .enumerate()
        .filter(|(index, _)| (last - index) % stride == 0)
        .map(|(_, item)| item.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_length_keeps_both_ends() {
        assert_eq!(decimate(&[0, 1, 2, 3, 4]), vec![0, 2, 4]);
    }

    #[test]
    fn even_length_drops_first() {
        assert_eq!(decimate(&[0, 1, 2, 3]), vec![1, 3]);
    }

    #[test]
    fn length_is_half_rounded_up_and_last_survives() {
        for n in 1..40_usize {
            let seq: Vec<usize> = (0..n).collect();
            let kept = decimate(&seq);
            assert_eq!(kept.len(), n.div_ceil(2), "n={n}");
            assert_eq!(kept.last(), seq.last(), "n={n}");
        }
    }

    #[test]
    fn empty_and_single() {
        assert!(decimate::<u8>(&[]).is_empty());
        assert_eq!(decimate(&["only"]), vec!["only"]);
    }

    #[test]
    fn custom_stride_is_anchored_at_the_end() {
        assert_eq!(decimate_with_stride(&[0, 1, 2, 3, 4, 5, 6], 3), vec![0, 3, 6]);
        assert_eq!(decimate_with_stride(&[0, 1, 2], 0), vec![0, 1, 2]);
    }
}
