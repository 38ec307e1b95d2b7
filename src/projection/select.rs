use crate::{
    projection::indirect::{IndexOrder, IndexedList, Placement},
    view::{list::ListView, OuterViewPort},
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// The source elements at `positions`, in the given order.
    /// Positions may repeat; those out of range are left out.
    /// Selected elements follow their source element when it moves.
    pub fn select(&self, positions: Vec<usize>) -> OuterViewPort<dyn ListView<T>> {
        IndexedList::new(self, SelectOrder::new(positions)).1
    }
}

pub struct SelectOrder {
    initial: Option<Vec<usize>>,
}

impl SelectOrder {
    pub fn new(positions: Vec<usize>) -> Self {
        SelectOrder {
            initial: Some(positions),
        }
    }
}

impl<T> IndexOrder<T> for SelectOrder
where
    T: Clone + Send + Sync + 'static,
{
    fn build(&mut self, src: &dyn ListView<T>, current: &[usize]) -> Vec<usize> {
        let len = src.len();
        let positions = self.initial.take().unwrap_or_else(|| current.to_vec());
        positions.into_iter().filter(|i| *i < len).collect()
    }

    fn place(&mut self, _src: &dyn ListView<T>, _indices: &[usize], _src_idx: usize) -> Placement {
        Placement::Skip
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
