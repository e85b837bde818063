/// A disjoint-set forest over provisional labels handed out in scan order.
///
/// Every entry stores the label of its parent, roots store themselves. Trees are only ever merged
/// at their roots, and the smaller label always becomes the new root, so every non-root entry
/// points to a strictly smaller label. This is what lets [`UnionFindArray::make_contiguous`]
/// resolve the whole forest in a single top-down walk.
///
/// Label 0 is reserved and never handed out. The last entry is the tentative label of the voxel
/// currently being scanned: it is committed by [`UnionFindArray::finalize_label`] if the voxel
/// starts a new region, and recycled otherwise.
#[derive(Debug, Clone)]
pub(crate) struct UnionFindArray {
    parents: Vec<u32>,
}

impl UnionFindArray {
    /// Creates a forest with room for `capacity` labels.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut parents = Vec::with_capacity(capacity.saturating_add(2));
        parents.extend([0, 1]);
        Self { parents }
    }

    /// The tentative label for the voxel currently being scanned.
    #[inline]
    pub(crate) fn next_free_label(&self) -> u32 {
        self.tail()
    }

    /// Returns the root of `label`, pointing every entry on the way directly at the root.
    #[inline]
    pub(crate) fn find(&mut self, label: u32) -> u32 {
        let mut root = label;
        while self.parents[root as usize] != root {
            let parent = self.parents[root as usize];
            debug_assert!(parent < root, "label {root} points up to {parent}");
            root = parent;
        }
        let mut label = label;
        while label != root {
            let next = self.parents[label as usize];
            self.parents[label as usize] = root;
            label = next;
        }
        root
    }

    /// Merges the trees of `a` and `b` and returns the root of the merged tree, which is the
    /// smaller of the two roots.
    #[inline]
    pub(crate) fn make_union(&mut self, a: u32, b: u32) -> u32 {
        let a = self.find(a);
        let b = self.find(b);
        if a <= b {
            self.parents[b as usize] = a;
            a
        } else {
            self.parents[a as usize] = b;
            b
        }
    }

    /// Commits `label` as the label of the voxel currently being scanned and returns it.
    ///
    /// If `label` is still the tentative label, the voxel starts a new region and a fresh tentative
    /// label is allocated. Otherwise the voxel was merged into an existing tree and the tentative
    /// entry is reset so it can be handed out again.
    #[inline]
    pub(crate) fn finalize_label(&mut self, label: u32) -> u32 {
        let tail = self.tail();
        if label == tail {
            self.parents.push(tail + 1);
        } else {
            let last = self.parents.len() - 1;
            self.parents[last] = tail;
        }
        label
    }

    /// Replaces every committed entry by a contiguous region id `1..=K` shared by all members of
    /// a tree, and returns `K`. Afterwards [`UnionFindArray::region`] maps a provisional label to its
    /// region id.
    pub(crate) fn make_contiguous(&mut self) -> u32 {
        let committed = self.parents.len() - 1;
        let mut count = 0;
        for i in 0..committed {
            let parent = self.parents[i] as usize;
            if parent == i {
                self.parents[i] = count;
                count += 1;
            } else {
                // The parent precedes `i` and has already been replaced by its region id.
                debug_assert!(parent < i, "label {i} points up to {parent}");
                self.parents[i] = self.parents[parent];
            }
        }
        let regions = count - 1;
        tracing::trace!(labels = committed - 1, regions, "Made labels contiguous");
        regions
    }

    /// The region id of a provisional label after [`UnionFindArray::make_contiguous`].
    #[inline]
    pub(crate) fn region(&self, label: u32) -> u32 {
        self.parents[label as usize]
    }

    /// The tentative label, which is always the index of the last entry.
    #[inline]
    fn tail(&self) -> u32 {
        (self.parents.len() - 1) as u32
    }

    /// Returns `true` if every entry points to itself or to a smaller label.
    #[cfg(test)]
    pub(crate) fn is_monotone(&self) -> bool {
        self.parents
            .iter()
            .enumerate()
            .all(|(label, &parent)| parent as usize <= label)
    }
}
