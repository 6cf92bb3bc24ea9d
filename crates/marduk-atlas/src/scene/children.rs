use super::{SortKey, ZIndex};

/// One entry of a [`ChildList`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Child<H> {
    pub handle: H,
    pub key: SortKey,
    /// Caller-supplied tag, if any.
    pub tag: Option<i32>,
}

impl<H> Child<H> {
    #[inline]
    pub fn z(&self) -> ZIndex {
        self.key.z
    }
}

/// Z-ordered child storage.
///
/// Children are kept sorted by [`SortKey`], so list position *is* draw order.
/// Inserting or reordering a child places it after every existing child that
/// shares its z (stable ties).
///
/// Performance characteristics:
/// - `insertion_index()` is O(log n)
/// - `insert()` / `remove_at()` / `reorder_at()` are O(n) element moves
/// - handle lookups (`position_of()`, `find_by_tag()`) are linear scans
#[derive(Debug, Clone)]
pub struct ChildList<H> {
    children: Vec<Child<H>>,
    next_order: u64,
}

impl<H> Default for ChildList<H> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            next_order: 0,
        }
    }
}

impl<H: Copy + Eq> ChildList<H> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with room for `capacity` children (no lazy alloc).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            children: Vec::with_capacity(capacity),
            next_order: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Child<H>> {
        self.children.iter()
    }

    #[inline]
    pub fn handle_at(&self, position: usize) -> Option<H> {
        self.children.get(position).map(|c| c.handle)
    }

    pub fn position_of(&self, handle: H) -> Option<usize> {
        self.children.iter().position(|c| c.handle == handle)
    }

    /// First child (in draw order) carrying `tag`.
    pub fn find_by_tag(&self, tag: i32) -> Option<H> {
        self.children
            .iter()
            .find(|c| c.tag == Some(tag))
            .map(|c| c.handle)
    }

    /// Position a new child with key `z` would take: the first position whose
    /// existing child has a strictly greater z.
    #[inline]
    pub fn insertion_index(&self, z: ZIndex) -> usize {
        self.children.partition_point(|c| c.key.z <= z)
    }

    /// Inserts `handle` with key `z` and returns its position.
    pub fn insert(&mut self, handle: H, z: ZIndex, tag: Option<i32>) -> usize {
        let key = self.next_key(z);
        let position = self.insertion_index(z);
        self.children.insert(position, Child { handle, key, tag });
        position
    }

    /// Removes the child at `position`. Out-of-range positions return `None`.
    pub fn remove_at(&mut self, position: usize) -> Option<Child<H>> {
        (position < self.children.len()).then(|| self.children.remove(position))
    }

    /// Moves the child at `position` to its slot for key `z`; returns the new position.
    ///
    /// # Panics
    /// Panics if `position` is out of range.
    pub fn reorder_at(&mut self, position: usize, z: ZIndex) -> usize {
        let mut child = self.children.remove(position);
        child.key = self.next_key(z);
        let new_position = self.insertion_index(z);
        self.children.insert(new_position, child);
        new_position
    }

    /// Removes every child. Keeps allocated capacity.
    pub fn clear(&mut self) {
        self.children.clear();
        self.next_order = 0;
    }

    fn next_key(&mut self, z: ZIndex) -> SortKey {
        let order = self.next_order;
        self.next_order += 1;
        SortKey::new(z, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(list: &ChildList<u32>) -> Vec<u32> {
        list.iter().map(|c| c.handle).collect()
    }

    fn filled(zs: &[i32]) -> ChildList<u32> {
        let mut list = ChildList::new();
        for (h, &z) in zs.iter().enumerate() {
            list.insert(h as u32, ZIndex(z), None);
        }
        list
    }

    #[test]
    fn insert_sorts_by_z_and_keeps_arrival_for_ties() {
        let list = filled(&[5, 3, 5, 1]);
        assert_eq!(handles(&list), vec![3, 1, 0, 2]);
    }

    #[test]
    fn insertion_index_lands_after_equal_keys() {
        let list = filled(&[1, 2, 2, 3]);
        assert_eq!(list.insertion_index(ZIndex(2)), 3);
        assert_eq!(list.insertion_index(ZIndex(0)), 0);
        assert_eq!(list.insertion_index(ZIndex(9)), 4);
    }

    #[test]
    fn reorder_to_same_z_moves_to_end_of_run() {
        let mut list = filled(&[0, 0, 0]);
        assert_eq!(list.reorder_at(0, ZIndex(0)), 2);
        assert_eq!(handles(&list), vec![1, 2, 0]);
    }

    #[test]
    fn reorder_forward_and_back() {
        let mut list = filled(&[0, 1, 2, 3]);
        assert_eq!(list.reorder_at(3, ZIndex(0)), 1);
        assert_eq!(handles(&list), vec![0, 3, 1, 2]);
        assert_eq!(list.position_of(0), Some(0));
        assert_eq!(list.reorder_at(0, ZIndex(5)), 3);
        assert_eq!(handles(&list), vec![3, 1, 2, 0]);
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut list = filled(&[0, 1]);
        assert_eq!(list.position_of(42), None);
        assert!(list.remove_at(2).is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn find_by_tag_returns_first_in_draw_order() {
        let mut list = ChildList::new();
        list.insert(10u32, ZIndex(5), Some(7));
        list.insert(11u32, ZIndex(1), Some(7));
        assert_eq!(list.find_by_tag(7), Some(11));
        assert_eq!(list.find_by_tag(8), None);
    }
}
