use {
    crate::{
        projection::indirect::{IndexOrder, IndexedList, Placement},
        view::{list::ListView, OuterViewPort},
    },
    std::{
        cmp::Ordering,
        ops::Deref,
        sync::{Arc, OnceLock},
    },
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// Stable sort: equal elements keep their source order.
    pub fn sort_by<F>(&self, cmp: F) -> SortedPort<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        SortedPort::new(self.clone(), Arc::new(cmp))
    }

    pub fn sort_by_key<K, F>(&self, key: F) -> SortedPort<T>
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.sort_by(move |a, b| key(a).cmp(&key(b)))
    }
}

/// Port of a sorted view, which can be refined with secondary orderings.
/// The view is built on first use.
pub struct SortedPort<T>
where
    T: Clone + Send + Sync + 'static,
{
    src: OuterViewPort<dyn ListView<T>>,
    cmp: Comparator<T>,
    port: OnceLock<OuterViewPort<dyn ListView<T>>>,
}

impl<T> SortedPort<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new(src: OuterViewPort<dyn ListView<T>>, cmp: Comparator<T>) -> Self {
        SortedPort {
            src,
            cmp,
            port: OnceLock::new(),
        }
    }

    fn port(&self) -> &OuterViewPort<dyn ListView<T>> {
        self.port
            .get_or_init(|| IndexedList::new(&self.src, SortOrder::new(self.cmp.clone())).1)
    }

    /// Sort elements that compare equal so far by `cmp`.
    /// Builds a new view over the same source.
    pub fn then_by<F>(&self, cmp: F) -> SortedPort<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let first = self.cmp.clone();
        SortedPort::new(
            self.src.clone(),
            Arc::new(move |a: &T, b: &T| first(a, b).then_with(|| cmp(a, b))),
        )
    }

    pub fn then_by_key<K, F>(&self, key: F) -> SortedPort<T>
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.then_by(move |a, b| key(a).cmp(&key(b)))
    }

    pub fn into_port(self) -> OuterViewPort<dyn ListView<T>> {
        self.port().clone()
    }
}

impl<T> Deref for SortedPort<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = OuterViewPort<dyn ListView<T>>;

    fn deref(&self) -> &Self::Target {
        self.port()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Sorted arrangement of source indices, ties broken by source position.
pub struct SortOrder<T>
where
    T: Clone + Send + Sync + 'static,
{
    cmp: Comparator<T>,
}

impl<T> SortOrder<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(cmp: Comparator<T>) -> Self {
        SortOrder { cmp }
    }

    pub(crate) fn sorted(&self, src: &dyn ListView<T>) -> Vec<usize> {
        let items: Vec<T> = (0..src.len()).filter_map(|i| src.get(&i)).collect();
        let mut indices: Vec<usize> = (0..items.len()).collect();
        indices.sort_by(|a, b| (self.cmp)(&items[*a], &items[*b]));
        indices
    }
}

impl<T> IndexOrder<T> for SortOrder<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn build(&mut self, src: &dyn ListView<T>, _current: &[usize]) -> Vec<usize> {
        self.sorted(src)
    }

    fn place(&mut self, src: &dyn ListView<T>, indices: &[usize], src_idx: usize) -> Placement {
        let item = match src.get(&src_idx) {
            Some(item) => item,
            None => return Placement::Reset,
        };
        Placement::At(indices.partition_point(|j| match src.get(j) {
            Some(x) => match (self.cmp)(&x, &item) {
                Ordering::Less => true,
                Ordering::Equal => *j < src_idx,
                Ordering::Greater => false,
            },
            None => false,
        }))
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use {
        crate::{buffer::vec::VecBuffer, view::list::*},
        proptest::prelude::*,
        std::sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    #[test]
    fn sorted_inserts_are_positioned() {
        let buffer = VecBuffer::with_data(vec![5, 1, 4]);
        let sorted = buffer.to_list().sort_by(|a, b| a.cmp(b));
        let (_sub, rx) = sorted.queue();
        assert_eq!(sorted.to_vec(), vec![1, 4, 5]);

        buffer.push(3);
        buffer.insert(0, 9).unwrap();
        buffer.remove(2).unwrap();

        assert_eq!(sorted.to_vec(), vec![3, 4, 5, 9]);
        assert_eq!(
            rx.drain(),
            vec![
                ListDiff::Insert { idx: 1, val: 3 },
                ListDiff::Insert { idx: 4, val: 9 },
                ListDiff::Remove { idx: 0, old: Some(1) },
            ]
        );
    }

    #[test]
    fn moving_replace_resets() {
        let buffer = VecBuffer::with_data(vec!["b", "a", "c"]);
        let sorted = buffer.to_list().sort_by(|a, b| a.cmp(b));
        let (_sub, rx) = sorted.queue();
        assert_eq!(sorted.to_vec(), vec!["a", "b", "c"]);

        buffer.update(0, "z").unwrap();
        assert_eq!(rx.drain(), vec![ListDiff::Reset]);
        assert_eq!(sorted.to_vec(), vec!["a", "c", "z"]);

        buffer.update(0, "y").unwrap();
        assert_eq!(
            rx.drain(),
            vec![ListDiff::Update { idx: 2, old: Some("z"), val: "y" }]
        );
    }

    #[test]
    fn ties_keep_source_order() {
        let buffer = VecBuffer::with_data(vec![(1, 'a'), (0, 'b'), (1, 'c')]);
        let by_num = buffer.to_list().sort_by_key(|p| p.0);
        let _sub = by_num.add_contents_fn(|| {});
        assert_eq!(by_num.to_vec(), vec![(0, 'b'), (1, 'a'), (1, 'c')]);

        buffer.insert(1, (1, 'x')).unwrap();
        assert_eq!(by_num.to_vec(), vec![(0, 'b'), (1, 'a'), (1, 'x'), (1, 'c')]);
    }

    #[test]
    fn then_by_refines_ties() {
        let buffer = VecBuffer::with_data(vec![("bob", 30), ("amy", 25), ("al", 30)]);
        let sorted = buffer
            .to_list()
            .sort_by_key(|p| p.1)
            .then_by(|a, b| a.0.cmp(b.0));
        assert_eq!(sorted.to_vec(), vec![("amy", 25), ("al", 30), ("bob", 30)]);

        let desc = buffer.to_list().sort_by(|a, b| b.1.cmp(&a.1)).then_by_key(|p| p.0).into_port();
        buffer.push(("cy", 25));
        assert_eq!(desc.to_vec(), vec![("al", 30), ("bob", 30), ("amy", 25), ("cy", 25)]);
    }

    #[test]
    fn refining_skips_the_coarse_view() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let buffer = VecBuffer::with_data(vec![(2, 'b'), (1, 'z'), (2, 'a')]);
        let sorted = buffer
            .to_list()
            .sort_by(move |a: &(i32, char), b: &(i32, char)| {
                counter.fetch_add(1, Ordering::SeqCst);
                a.0.cmp(&b.0)
            })
            .then_by_key(|p| p.1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(sorted.to_vec(), vec![(1, 'z'), (2, 'a'), (2, 'b')]);
        assert!(calls.load(Ordering::SeqCst) > 0);
    }

    proptest! {
        #[test]
        fn sorted_view_matches_fresh_sort(
            init in proptest::collection::vec(0..10u8, 0..10),
            edits in proptest::collection::vec((0..3u8, any::<usize>(), 0..10u8), 0..30),
        ) {
            let buffer = VecBuffer::with_data(init);
            let sorted = buffer.to_list().sort_by(|a, b| a.cmp(b));
            let (_sub, rx) = sorted.queue();
            let mut mirror = sorted.to_vec();

            for (kind, i, v) in edits {
                let len = buffer.len();
                match kind {
                    0 => buffer.insert(i % (len + 1), v).unwrap(),
                    1 if len > 0 => { buffer.remove(i % len).unwrap(); }
                    2 if len > 0 => { buffer.update(i % len, v).unwrap(); }
                    _ => {}
                }
                for d in rx.drain() {
                    match d {
                        ListDiff::Insert { idx, val } => mirror.insert(idx, val),
                        ListDiff::Remove { idx, .. } => { mirror.remove(idx); }
                        ListDiff::Update { idx, val, .. } => mirror[idx] = val,
                        ListDiff::Reset => mirror = sorted.to_vec(),
                    }
                }
                let mut fresh = buffer.to_vec();
                fresh.sort();
                prop_assert_eq!(&mirror, &fresh);
            }
        }
    }
}
