use rand::seq::SliceRandom;
use rand::thread_rng;

/// Pick one element uniformly. `None` only for an empty slice.
pub fn choose<T: Clone>(items: &[T]) -> Option<T> {
    let mut rng = thread_rng();
    items.choose(&mut rng).cloned()
}

/// Return a shuffled copy of `items`.
pub fn shuffled<T: Clone>(items: &[T]) -> Vec<T> {
    let mut rng = thread_rng();
    let mut out = items.to_vec();
    out.shuffle(&mut rng);
    out
}
