use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::geometry::{UPoint, URect};

/// An insertion-ordered set of unique grid positions.
///
/// Used for multi-cell selections, where tools need to visit the selected
/// cells in the order the user picked them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<UPoint>", into = "Vec<UPoint>")]
pub struct UPointVectorSet {
    items: Vec<UPoint>,
    lookup: HashSet<UPoint>,
}

impl UPointVectorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a position. Returns false if it was already present.
    pub fn insert(&mut self, p: UPoint) -> bool {
        if self.lookup.insert(p) {
            self.items.push(p);
            true
        } else {
            false
        }
    }

    /// Remove a position, keeping the order of the remaining items
    pub fn remove(&mut self, p: &UPoint) -> bool {
        if self.lookup.remove(p) {
            self.items.retain(|i| i != p);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, p: &UPoint) -> bool {
        self.lookup.contains(p)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.lookup.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UPoint> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[UPoint] {
        &self.items
    }

    /// Smallest rectangle containing every position
    pub fn bounding_rect(&self) -> Option<URect> {
        let first = self.items.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.items[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(URect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }
}

impl PartialEq for UPointVectorSet {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for UPointVectorSet {}

impl From<Vec<UPoint>> for UPointVectorSet {
    fn from(items: Vec<UPoint>) -> Self {
        items.into_iter().collect()
    }
}

impl From<UPointVectorSet> for Vec<UPoint> {
    fn from(set: UPointVectorSet) -> Self {
        set.items
    }
}

impl FromIterator<UPoint> for UPointVectorSet {
    fn from_iter<I: IntoIterator<Item = UPoint>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<UPoint> for UPointVectorSet {
    fn extend<I: IntoIterator<Item = UPoint>>(&mut self, iter: I) {
        for p in iter {
            self.insert(p);
        }
    }
}

impl<'a> IntoIterator for &'a UPointVectorSet {
    type Item = &'a UPoint;
    type IntoIter = std::slice::Iter<'a, UPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
