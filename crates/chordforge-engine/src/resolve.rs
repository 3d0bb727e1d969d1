//! Function-label resolution: pick a concrete chord for a roman numeral.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::pool::ChordPool;

/// Pick a chord name carrying the given function label.
///
/// When `prefer_seventh` is set and any candidate is a seventh-or-richer
/// chord, selection is restricted to those. Among the remaining candidates
/// the choice is uniform. Returns `None` when no entry carries the label.
pub fn find_by_function<R: Rng>(
    pool: &ChordPool,
    label: &str,
    prefer_seventh: bool,
    rng: &mut R,
) -> Option<String> {
    let candidates = pool.names_for_function(label);
    if candidates.is_empty() {
        return None;
    }
    if prefer_seventh {
        let sevenths: Vec<&String> = candidates.iter().filter(|n| is_seventh(n)).collect();
        if !sevenths.is_empty() {
            return sevenths.choose(rng).map(|n| (*n).clone());
        }
    }
    candidates.choose(rng).cloned()
}

/// A name reads as seventh-or-richer if its suffix carries an extension digit.
fn is_seventh(name: &str) -> bool {
    name.contains('7') || name.contains('9') || name.contains("11") || name.contains("13")
}
