use std::borrow::{Borrow, Cow};
use std::cmp::Eq;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

/// Source of variable values for [`UriTemplate::expand`](crate::UriTemplate::expand).
///
/// Maps look values up by name, sequences by position.
pub trait Vars {
    /// Value of the `index`-th placeholder, named `name`.
    fn var(&self, index: usize, name: &str) -> Option<Cow<'_, str>>;

    /// Number of values of a positional source, `None` for sources keyed by name.
    fn positional_len(&self) -> Option<usize> {
        None
    }
}

impl<T: Vars + ?Sized> Vars for &T {
    fn var(&self, index: usize, name: &str) -> Option<Cow<'_, str>> {
        (**self).var(index, name)
    }
    fn positional_len(&self) -> Option<usize> {
        (**self).positional_len()
    }
}

impl Vars for () {
    fn var(&self, _index: usize, _name: &str) -> Option<Cow<'_, str>> {
        None
    }
}

impl<K, V> Vars for HashMap<K, V>
where
    K: Borrow<str> + Hash + Eq,
    V: fmt::Display,
{
    fn var(&self, _index: usize, name: &str) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.get(name)?.to_string()))
    }
}

impl<K, V> Vars for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: fmt::Display,
{
    fn var(&self, _index: usize, name: &str) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.get(name)?.to_string()))
    }
}

impl<V: fmt::Display> Vars for [V] {
    fn var(&self, index: usize, _name: &str) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.get(index)?.to_string()))
    }
    fn positional_len(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<V: fmt::Display, const N: usize> Vars for [V; N] {
    fn var(&self, index: usize, name: &str) -> Option<Cow<'_, str>> {
        self.as_slice().var(index, name)
    }
    fn positional_len(&self) -> Option<usize> {
        Some(N)
    }
}

impl<V: fmt::Display> Vars for Vec<V> {
    fn var(&self, index: usize, name: &str) -> Option<Cow<'_, str>> {
        self.as_slice().var(index, name)
    }
    fn positional_len(&self) -> Option<usize> {
        Some(self.len())
    }
}
