/// Resolve a possibly negative dimension index against `n` dimensions.
///
/// With `start_behind` set, `-1` addresses the slot after the last
/// dimension, which is what insertion (unsqueeze) needs.

#[inline]
pub(crate) fn negative_index(i: isize, n: usize, start_behind: bool) -> usize {
  if i < 0 {
    let offset = if start_behind { 1 } else { 0 };
    (n as isize + i + offset) as usize
  } else {
    i as usize
  }
}
