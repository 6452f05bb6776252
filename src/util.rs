//! Small index-arithmetic helpers shared by the mesh and pipeline stages.

/// A `usize` index with a niche-optimized "empty" sentinel (`usize::MAX`),
/// used in place of `Option<usize>` for the `halfedges` array and the hull
/// linked-list fields so they stay a single machine word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OptionIndex(usize);

#[cfg(feature = "serde")]
impl serde::Serialize for OptionIndex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.get().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for OptionIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(OptionIndex::from(Option::<usize>::deserialize(
            deserializer,
        )?))
    }
}

const EMPTY: usize = usize::MAX;

impl OptionIndex {
    #[inline]
    pub fn none() -> Self {
        OptionIndex(EMPTY)
    }

    #[inline]
    pub fn some(index: usize) -> Self {
        debug_assert_ne!(index, EMPTY, "index collides with the empty sentinel");
        OptionIndex(index)
    }

    #[inline]
    pub fn get(self) -> Option<usize> {
        if self.0 == EMPTY {
            None
        } else {
            Some(self.0)
        }
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == EMPTY
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self.0 != EMPTY
    }

    #[inline]
    pub fn unwrap(self) -> usize {
        self.get().expect("OptionIndex::unwrap on an empty index")
    }
}

impl Default for OptionIndex {
    fn default() -> Self {
        OptionIndex::none()
    }
}

impl From<Option<usize>> for OptionIndex {
    fn from(opt: Option<usize>) -> Self {
        match opt {
            Some(i) => OptionIndex::some(i),
            None => OptionIndex::none(),
        }
    }
}

impl From<usize> for OptionIndex {
    fn from(index: usize) -> Self {
        OptionIndex::some(index)
    }
}

impl From<OptionIndex> for Option<usize> {
    fn from(oi: OptionIndex) -> Self {
        oi.get()
    }
}

/// The next half-edge going counter-clockwise around a triangle.
#[inline]
pub fn next_halfedge(h: usize) -> usize {
    if h % 3 == 2 {
        h - 2
    } else {
        h + 1
    }
}

/// The previous half-edge going counter-clockwise around a triangle
/// (equivalently, the next one clockwise).
#[inline]
pub fn prev_halfedge(h: usize) -> usize {
    if h % 3 == 0 {
        h + 2
    } else {
        h - 1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_next_prev_halfedge() {
        assert_eq!(next_halfedge(0), 1);
        assert_eq!(next_halfedge(1), 2);
        assert_eq!(next_halfedge(2), 0);
        assert_eq!(prev_halfedge(0), 2);
        assert_eq!(prev_halfedge(1), 0);
        assert_eq!(prev_halfedge(2), 1);
    }

    #[test]
    fn test_option_index_roundtrip() {
        let none = OptionIndex::none();
        assert!(none.is_none());
        assert_eq!(none.get(), None);

        let some = OptionIndex::some(42);
        assert!(some.is_some());
        assert_eq!(some.get(), Some(42));
    }
}
