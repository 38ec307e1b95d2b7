use {
    crate::{
        projection::{
            indirect::{IndexOrder, IndexedList, Placement},
            sort::{Comparator, SortOrder},
        },
        view::{list::ListView, OuterViewPort},
    },
    std::{cmp::Ordering, ops::Deref, sync::Arc},
    tracing::debug,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// Steps through all arrangements of the source in lexicographic order,
    /// starting with the sorted one.
    pub fn permutations<F>(&self, cmp: F) -> Permutations<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let (view, port) = IndexedList::new(self, PermutationOrder::new(Arc::new(cmp)));
        Permutations { view, port }
    }
}

pub struct Permutations<T>
where
    T: Clone + Send + Sync + 'static,
{
    view: Arc<IndexedList<T, PermutationOrder<T>>>,
    port: OuterViewPort<dyn ListView<T>>,
}

impl<T> Permutations<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Advance to the lexicographic successor.
    /// After the last arrangement this wraps to the first and returns `false`.
    pub fn next_permutation(&self) -> bool {
        self.view
            .reorder(|order, src, indices| order.advance(src, indices))
            .unwrap_or(false)
    }

    pub fn get_port(&self) -> OuterViewPort<dyn ListView<T>> {
        self.port.clone()
    }
}

impl<T> Deref for Permutations<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = OuterViewPort<dyn ListView<T>>;

    fn deref(&self) -> &Self::Target {
        &self.port
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct PermutationOrder<T>
where
    T: Clone + Send + Sync + 'static,
{
    sort: SortOrder<T>,
    cmp: Comparator<T>,
}

impl<T> PermutationOrder<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(cmp: Comparator<T>) -> Self {
        PermutationOrder {
            sort: SortOrder::new(cmp.clone()),
            cmp,
        }
    }

    fn advance(&mut self, src: &dyn ListView<T>, indices: &mut Vec<usize>) -> bool {
        let items: Vec<T> = (0..src.len()).filter_map(|i| src.get(&i)).collect();
        if items.len() != indices.len() || indices.iter().any(|i| *i >= items.len()) {
            *indices = self.sort.sorted(src);
            return false;
        }

        let less = |a: usize, b: usize| (self.cmp)(&items[a], &items[b]) == Ordering::Less;

        let n = indices.len();
        let i = match (0..n.saturating_sub(1)).rev().find(|&i| less(indices[i], indices[i + 1])) {
            Some(i) => i,
            None => {
                debug!("permutation: wrapped around to the first arrangement");
                *indices = self.sort.sorted(src);
                return false;
            }
        };
        let j = ((i + 1)..n)
            .rev()
            .find(|&j| less(indices[i], indices[j]))
            .unwrap_or(i + 1);

        indices.swap(i, j);
        indices[i + 1..].reverse();
        true
    }
}

impl<T> IndexOrder<T> for PermutationOrder<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn build(&mut self, src: &dyn ListView<T>, _current: &[usize]) -> Vec<usize> {
        self.sort.sorted(src)
    }

    fn place(&mut self, _src: &dyn ListView<T>, _indices: &[usize], _src_idx: usize) -> Placement {
        Placement::Reset
    }

    fn resets_on_change(&self) -> bool {
        true
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use crate::{buffer::vec::VecBuffer, view::list::*};

    #[test]
    fn walks_all_permutations() {
        let buffer = VecBuffer::with_data(vec![3, 1, 2]);
        let perms = buffer.to_list().permutations(|a, b| a.cmp(b));
        let (_sub, rx) = perms.queue();

        let mut seen = vec![perms.to_vec()];
        while perms.next_permutation() {
            seen.push(perms.to_vec());
        }
        assert_eq!(
            seen,
            vec![
                vec![1, 2, 3],
                vec![1, 3, 2],
                vec![2, 1, 3],
                vec![2, 3, 1],
                vec![3, 1, 2],
                vec![3, 2, 1],
            ]
        );

        // wrapped around
        assert_eq!(perms.to_vec(), vec![1, 2, 3]);
        assert_eq!(rx.drain(), vec![ListDiff::Reset; 6]);
    }

    #[test]
    fn duplicates_are_not_repeated() {
        let perms =
            crate::buffer::generate::just(vec!['a', 'b', 'a']).permutations(|a, b| a.cmp(b));
        let mut count = 1;
        while perms.next_permutation() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn source_change_restarts() {
        let buffer = VecBuffer::with_data(vec![1, 2, 3]);
        let perms = buffer.to_list().permutations(|a, b| a.cmp(b));
        let (_sub, rx) = perms.queue();

        assert!(perms.next_permutation());
        assert!(perms.next_permutation());
        assert_eq!(perms.to_vec(), vec![2, 1, 3]);

        buffer.push(0);
        assert_eq!(perms.to_vec(), vec![0, 1, 2, 3]);
        assert_eq!(rx.drain(), vec![ListDiff::Reset; 3]);
    }
}
