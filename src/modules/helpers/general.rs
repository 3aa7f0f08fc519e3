use std::collections::HashSet;
use std::hash::Hash;

pub struct Helpers {}

impl Helpers {
    /// # difference between vectors
    /// every element of `a` that is not in `b`, in the order of `a`
    pub fn get_difference_between_vectors<T: Eq + Hash + Clone>(a: &[T], b: &[T]) -> Vec<T> {
        let excluded: HashSet<&T> = b.iter().collect();
        a.iter()
            .filter(|x| !excluded.contains(x))
            .cloned()
            .collect()
    }

    /// number of distinct values in an iterator
    pub fn count_distinct<T: Eq + Hash, I: IntoIterator<Item = T>>(values: I) -> usize {
        values.into_iter().collect::<HashSet<T>>().len()
    }
}
