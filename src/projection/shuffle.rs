use {
    crate::{
        projection::indirect::{IndexOrder, IndexedList, Placement},
        view::{list::ListView, OuterViewPort},
    },
    rand::{rngs::StdRng, Rng, SeedableRng},
    std::{ops::Deref, sync::Arc},
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Source of random positions: given `n > 0`, returns a value in `[0, n)`.
pub type RandomIndex = Box<dyn FnMut(usize) -> usize + Send + Sync>;

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    pub fn shuffle(&self) -> Shuffled<T> {
        let mut rng = StdRng::from_entropy();
        self.shuffle_with(move |n| rng.gen_range(0..n))
    }

    pub fn shuffle_seeded(&self, seed: u64) -> Shuffled<T> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.shuffle_with(move |n| rng.gen_range(0..n))
    }

    pub fn shuffle_with<R>(&self, rng: R) -> Shuffled<T>
    where
        R: FnMut(usize) -> usize + Send + Sync + 'static,
    {
        let (view, port) = IndexedList::new(self, ShuffleOrder::new(Box::new(rng)));
        Shuffled { view, port }
    }
}

pub struct Shuffled<T>
where
    T: Clone + Send + Sync + 'static,
{
    view: Arc<IndexedList<T, ShuffleOrder>>,
    port: OuterViewPort<dyn ListView<T>>,
}

impl<T> Shuffled<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Draw a new arrangement.
    pub fn reshuffle(&self) {
        self.view.reorder(|order, src, indices| {
            *indices = order.shuffled(src.len());
        });
    }

    pub fn get_port(&self) -> OuterViewPort<dyn ListView<T>> {
        self.port.clone()
    }
}

impl<T> Deref for Shuffled<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = OuterViewPort<dyn ListView<T>>;

    fn deref(&self) -> &Self::Target {
        &self.port
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct ShuffleOrder {
    rng: RandomIndex,
}

impl ShuffleOrder {
    pub fn new(rng: RandomIndex) -> Self {
        ShuffleOrder { rng }
    }

    /// Fisher–Yates over `0..n`
    fn shuffled(&mut self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = (self.rng)(i + 1).min(i);
            indices.swap(i, j);
        }
        indices
    }
}

impl<T> IndexOrder<T> for ShuffleOrder
where
    T: Clone + Send + Sync + 'static,
{
    fn build(&mut self, src: &dyn ListView<T>, _current: &[usize]) -> Vec<usize> {
        self.shuffled(src.len())
    }

    fn place(&mut self, _src: &dyn ListView<T>, indices: &[usize], _src_idx: usize) -> Placement {
        let n = indices.len() + 1;
        Placement::At((self.rng)(n).min(n - 1))
    }

    fn relocate(
        &mut self,
        _src: &dyn ListView<T>,
        _indices: &[usize],
        _src_idx: usize,
        old_pos: usize,
    ) -> Placement {
        Placement::At(old_pos)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use crate::{buffer::vec::VecBuffer, view::list::*};

    fn sorted(mut v: Vec<i32>) -> Vec<i32> {
        v.sort();
        v
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let buffer = VecBuffer::with_data((0..20).collect());
        let shuffled = buffer.to_list().shuffle_seeded(7);
        let (_sub, rx) = shuffled.queue();

        assert_eq!(sorted(shuffled.to_vec()), buffer.to_vec());

        buffer.push(20);
        buffer.remove(3).unwrap();
        buffer.update(0, 100).unwrap();
        assert_eq!(sorted(shuffled.to_vec()), sorted(buffer.to_vec()));

        let diffs = rx.drain();
        assert_eq!(diffs.len(), 3);
        assert!(matches!(diffs[0], ListDiff::Insert { val: 20, .. }));
        assert!(matches!(diffs[1], ListDiff::Remove { old: Some(3), .. }));
        assert!(matches!(diffs[2], ListDiff::Update { old: Some(0), val: 100, .. }));
    }

    #[test]
    fn injected_generator_decides_positions() {
        // always pick the first slot: Fisher-Yates then rotates left by one
        let buffer = VecBuffer::with_data(vec![1, 2, 3]);
        let shuffled = buffer.to_list().shuffle_with(|_| 0);
        let (_sub, rx) = shuffled.queue();
        assert_eq!(shuffled.to_vec(), vec![2, 3, 1]);

        buffer.push(4);
        assert_eq!(shuffled.to_vec(), vec![4, 2, 3, 1]);
        assert_eq!(rx.drain(), vec![ListDiff::Insert { idx: 0, val: 4 }]);

        shuffled.reshuffle();
        assert_eq!(rx.drain(), vec![ListDiff::Reset]);
        assert_eq!(sorted(shuffled.to_vec()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn same_seed_same_order() {
        let src = crate::buffer::generate::just((0..10).collect::<Vec<i32>>());
        assert_eq!(src.shuffle_seeded(3).to_vec(), src.shuffle_seeded(3).to_vec());
    }
}
