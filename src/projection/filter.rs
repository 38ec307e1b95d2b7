use {
    crate::{
        projection::indirect::{IndexOrder, IndexedList, Placement},
        view::{list::ListView, OuterViewPort},
    },
    std::marker::PhantomData,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// Elements satisfying `pred`, in source order.
    pub fn filter<P: Fn(&T) -> bool + Send + Sync + 'static>(
        &self,
        pred: P,
    ) -> OuterViewPort<dyn ListView<T>> {
        IndexedList::new(self, FilterOrder::new(pred)).1
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Keeps the source indices of matching elements, sorted ascending.
pub struct FilterOrder<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    pred: P,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, P> FilterOrder<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    pub fn new(pred: P) -> Self {
        FilterOrder {
            pred,
            _phantom: PhantomData,
        }
    }
}

impl<T, P> IndexOrder<T> for FilterOrder<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn build(&mut self, src: &dyn ListView<T>, _current: &[usize]) -> Vec<usize> {
        (0..src.len())
            .filter(|i| src.get(i).map(|x| (self.pred)(&x)).unwrap_or(false))
            .collect()
    }

    fn place(&mut self, src: &dyn ListView<T>, indices: &[usize], src_idx: usize) -> Placement {
        match src.get(&src_idx) {
            Some(x) if (self.pred)(&x) => Placement::At(indices.partition_point(|i| *i < src_idx)),
            Some(_) => Placement::Skip,
            None => Placement::Reset,
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use {
        crate::{buffer::vec::VecBuffer, view::list::*},
        proptest::prelude::*,
    };

    #[test]
    fn filter_list1() {
        let buffer = VecBuffer::<i32>::new();
        let target_port = buffer.to_list().filter(|x| *x > 10);

        buffer.push(0);
        buffer.push(7);
        buffer.push(9);
        assert_eq!(target_port.len(), 0);
        assert_eq!(target_port.get(&0), None);

        buffer.push(11);
        assert_eq!(target_port.to_vec(), vec![11]);

        buffer.push(13);
        buffer.push(1);
        buffer.push(5);
        buffer.push(19);
        assert_eq!(target_port.to_vec(), vec![11, 13, 19]);
    }

    #[test]
    fn insert_between_matches() {
        let buffer = VecBuffer::with_data(vec![1, 2, 3, 4, 5]);
        let evens = buffer.to_list().filter(|x| x % 2 == 0);
        let (_sub, rx) = evens.queue();
        assert_eq!(evens.to_vec(), vec![2, 4]);

        buffer.insert(2, 6).unwrap();
        assert_eq!(evens.to_vec(), vec![2, 6, 4]);
        assert_eq!(rx.drain(), vec![ListDiff::Insert { idx: 1, val: 6 }]);
    }

    #[test]
    fn predicate_flips_on_update() {
        let buffer = VecBuffer::with_data(vec![1, 2, 3, 4]);
        let evens = buffer.to_list().filter(|x| x % 2 == 0);
        let (_sub, rx) = evens.queue();

        buffer.update(0, 8).unwrap();
        buffer.update(1, 5).unwrap();
        buffer.update(3, 10).unwrap();
        buffer.remove(2).unwrap();
        buffer.remove(0).unwrap();

        assert_eq!(evens.to_vec(), vec![10]);
        assert_eq!(
            rx.drain(),
            vec![
                ListDiff::Insert { idx: 0, val: 8 },
                ListDiff::Remove { idx: 1, old: Some(2) },
                ListDiff::Update { idx: 1, old: Some(4), val: 10 },
                ListDiff::Remove { idx: 0, old: Some(8) },
            ]
        );
    }

    #[test]
    fn lazy_activation() {
        let buffer = VecBuffer::with_data(vec![1, 2, 3]);
        let src = buffer.to_list();
        let odds = src.filter(|x| x % 2 == 1);
        assert!(!src.is_observed());

        let sub = odds.add_contents_fn(|| {});
        assert!(src.is_observed());
        drop(sub);
        assert!(!src.is_observed());

        // unobserved views still read through
        buffer.push(7);
        assert_eq!(odds.to_vec(), vec![1, 3, 7]);
    }

    #[test]
    fn write_through() {
        let buffer = VecBuffer::with_data(vec![1, 2, 3, 4]);
        let evens = buffer.to_list().filter(|x| x % 2 == 0);
        let (_sub, rx) = evens.queue();

        assert_eq!(evens.set(0, 6), Ok(2));
        assert_eq!(evens.set(1, 5), Ok(4));
        assert_eq!(buffer.to_vec(), vec![1, 6, 3, 5]);
        assert_eq!(evens.to_vec(), vec![6]);
        assert_eq!(evens.remove(0), Ok(6));
        assert_eq!(buffer.to_vec(), vec![1, 3, 5]);
        assert!(evens.push(2).is_err());

        assert_eq!(
            rx.drain(),
            vec![
                ListDiff::Update { idx: 0, old: Some(2), val: 6 },
                ListDiff::Remove { idx: 1, old: Some(4) },
                ListDiff::Remove { idx: 0, old: Some(6) },
            ]
        );
    }

    #[test]
    fn write_through_a_sorted_source() {
        let buffer = VecBuffer::with_data(vec![1, 2, 3, 4]);
        let sorted = buffer.to_list().sort_by_key(|x| *x);
        let evens = sorted.filter(|x| x % 2 == 0);
        let (_sub, rx) = evens.queue();

        // the new value sorts to the end
        assert_eq!(evens.set(0, 10), Ok(2));
        assert_eq!(buffer.to_vec(), vec![1, 10, 3, 4]);
        assert_eq!(sorted.to_vec(), vec![1, 3, 4, 10]);
        assert_eq!(evens.to_vec(), vec![4, 10]);
        assert_eq!(rx.drain(), vec![ListDiff::Reset]);

        assert_eq!(evens.remove(0), Ok(4));
        assert_eq!(buffer.to_vec(), vec![1, 10, 3]);
        assert_eq!(evens.to_vec(), vec![10]);
        assert_eq!(rx.drain(), vec![ListDiff::Remove { idx: 0, old: Some(4) }]);
    }

    #[derive(Clone, Debug)]
    enum Edit {
        Insert(usize, i32),
        Remove(usize),
        Update(usize, i32),
    }

    fn edit() -> impl Strategy<Value = Edit> {
        prop_oneof![
            (any::<usize>(), -20..20i32).prop_map(|(i, v)| Edit::Insert(i, v)),
            any::<usize>().prop_map(Edit::Remove),
            (any::<usize>(), -20..20i32).prop_map(|(i, v)| Edit::Update(i, v)),
        ]
    }

    fn apply(buffer: &VecBuffer<i32>, e: &Edit) {
        let len = buffer.len();
        match *e {
            Edit::Insert(i, v) => buffer.insert(i % (len + 1), v).unwrap(),
            Edit::Remove(i) if len > 0 => {
                buffer.remove(i % len).unwrap();
            }
            Edit::Update(i, v) if len > 0 => {
                buffer.update(i % len, v).unwrap();
            }
            _ => {}
        }
    }

    proptest! {
        #[test]
        fn mirrored_state_matches_fresh_filter(
            init in proptest::collection::vec(-20..20i32, 0..12),
            edits in proptest::collection::vec(edit(), 0..40),
        ) {
            let buffer = VecBuffer::with_data(init);
            let filtered = buffer.to_list().filter(|x| *x >= 0);

            let mirror = std::sync::Arc::new(std::sync::Mutex::new(filtered.to_vec()));
            let m = mirror.clone();
            let view = filtered.clone();
            let _sub = filtered.add_notify_fn(move |d: &ListDiff<i32>| {
                let mut m = m.lock().unwrap();
                match d {
                    ListDiff::Insert { idx, val } => m.insert(*idx, *val),
                    ListDiff::Remove { idx, .. } => { m.remove(*idx); }
                    ListDiff::Update { idx, val, .. } => m[*idx] = *val,
                    ListDiff::Reset => *m = view.to_vec(),
                }
            });

            for e in edits.iter() {
                apply(&buffer, e);
                let fresh: Vec<i32> = buffer.to_vec().into_iter().filter(|x| *x >= 0).collect();
                prop_assert_eq!(&*mirror.lock().unwrap(), &fresh);
                prop_assert_eq!(filtered.to_vec(), fresh);
            }
        }
    }
}
