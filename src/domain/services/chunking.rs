/// Splits `text` into consecutive fragments of at most `chunk_size` characters.
///
/// Pure fixed-width slicing: no word-boundary awareness, no overlap, original
/// order. The last fragment may be shorter. Concatenating the fragments in
/// order gives back `text` exactly.
///
/// Slicing counts characters, not bytes, so a multi-byte character is never
/// split in two.
///
/// `chunk_size` must be positive; callers validate it at the boundary, a zero
/// size yields no fragment at all.
pub fn split_fixed_size(text: &str, chunk_size: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    text.chars()
        .collect::<Vec<char>>()
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
