//! Insertion-ordered association of tags to series.

use std::collections::HashMap;

/// Tag -> series mapping that iterates in the order tags were first inserted.
///
/// Output column order is derived from this order, so it must never be an
/// unordered map.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedSeries<S> {
    entries: Vec<(String, S)>,
    positions: HashMap<String, usize>,
}

impl<S> Default for OrderedSeries<S> {
    fn default() -> Self {
        OrderedSeries { entries: Vec::new(), positions: HashMap::new() }
    }
}

impl<S> OrderedSeries<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.positions.contains_key(tag)
    }

    /// Tags in first-insertion order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(tag, _)| tag.as_str())
    }

    pub fn get(&self, tag: &str) -> Option<&S> {
        self.positions.get(tag).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, tag: &str) -> Option<&mut S> {
        let i = self.positions.get(tag).copied()?;
        Some(&mut self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &S)> {
        self.entries.iter().map(|(tag, series)| (tag.as_str(), series))
    }

    pub fn series_mut(&mut self) -> impl Iterator<Item = &mut S> {
        self.entries.iter_mut().map(|(_, series)| series)
    }

    /// Apply `f` to every series, keeping tag order.
    pub fn map_series<U>(self, mut f: impl FnMut(S) -> U) -> OrderedSeries<U> {
        OrderedSeries {
            entries: self.entries.into_iter().map(|(tag, series)| (tag, f(series))).collect(),
            positions: self.positions,
        }
    }
}

impl<S: Default> OrderedSeries<S> {
    /// Series for `tag`, appending an empty one at the end if the tag is new.
    pub fn entry(&mut self, tag: &str) -> &mut S {
        let idx = match self.positions.get(tag).copied() {
            Some(i) => i,
            None => {
                self.entries.push((tag.to_string(), S::default()));
                let i = self.entries.len() - 1;
                self.positions.insert(tag.to_string(), i);
                i
            }
        };
        &mut self.entries[idx].1
    }
}

impl<S> FromIterator<(String, S)> for OrderedSeries<S> {
    /// Later duplicates of a tag replace the earlier series in place.
    fn from_iter<I: IntoIterator<Item = (String, S)>>(iter: I) -> Self {
        let mut out = OrderedSeries::default();
        for (tag, series) in iter {
            match out.positions.get(&tag) {
                Some(&i) => out.entries[i].1 = series,
                None => {
                    out.positions.insert(tag.clone(), out.entries.len());
                    out.entries.push((tag, series));
                }
            }
        }
        out
    }
}
