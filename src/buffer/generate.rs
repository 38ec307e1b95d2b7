use {
    crate::view::{
        list::{ListDiff, ListView},
        OuterViewPort, View, ViewPort,
    },
    std::sync::Arc,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Fixed list of items. Never changes, never notifies.
pub struct StaticList<T>
where
    T: Clone + Send + Sync + 'static,
{
    items: Vec<T>,
}

impl<T> View for StaticList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T> ListView<T> for StaticList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, idx: &usize) -> Option<T> {
        self.items.get(*idx).cloned()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Arithmetic progression, computed on read.
pub struct RangeList {
    start: i64,
    count: usize,
    step: i64,
}

impl View for RangeList {
    type Msg = ListDiff<i64>;
}

impl ListView<i64> for RangeList {
    fn len(&self) -> usize {
        self.count
    }

    fn get(&self, idx: &usize) -> Option<i64> {
        if *idx < self.count {
            Some(self.start + (*idx as i64) * self.step)
        } else {
            None
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// The same item `count` times.
pub struct RepeatList<T>
where
    T: Clone + Send + Sync + 'static,
{
    item: T,
    count: usize,
}

impl<T> View for RepeatList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T> ListView<T> for RepeatList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.count
    }

    fn get(&self, idx: &usize) -> Option<T> {
        if *idx < self.count {
            Some(self.item.clone())
        } else {
            None
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

fn static_port<T, V>(view: V) -> OuterViewPort<dyn ListView<T>>
where
    T: Clone + Send + Sync + 'static,
    V: ListView<T> + 'static,
{
    ViewPort::with_view(Arc::new(view) as Arc<dyn ListView<T>>).into_outer()
}

pub fn empty<T: Clone + Send + Sync + 'static>() -> OuterViewPort<dyn ListView<T>> {
    static_port(StaticList { items: Vec::new() })
}

pub fn just<T: Clone + Send + Sync + 'static>(items: Vec<T>) -> OuterViewPort<dyn ListView<T>> {
    static_port(StaticList { items })
}

/// `count` values `start, start + step, ...`
pub fn range(start: i64, count: usize, step: i64) -> OuterViewPort<dyn ListView<i64>> {
    static_port(RangeList { start, count, step })
}

pub fn repeat<T: Clone + Send + Sync + 'static>(
    item: T,
    count: usize,
) -> OuterViewPort<dyn ListView<T>> {
    static_port(RepeatList { item, count })
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
