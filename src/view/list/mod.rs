use {
    crate::{
        error::ViewError,
        view::{NotifyFnObserver, OuterViewPort, Subscription, View},
    },
    serde::{Deserialize, Serialize},
    std::{ops::Deref, sync::Arc},
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Canonical change message of a list view.
///
/// Old values are only captured when some observer asked for them
/// (see [`Observer::wants_old_values`](crate::view::Observer::wants_old_values)).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ListDiff<T> {
    Insert { idx: usize, val: T },
    Remove { idx: usize, old: Option<T> },
    Update { idx: usize, old: Option<T>, val: T },
    /// anything may have changed, re-read the whole list
    Reset,
}

impl<T> ListDiff<T> {
    pub fn changes_count(&self) -> bool {
        !matches!(self, ListDiff::Update { .. })
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> ListDiff<U> {
        match self {
            ListDiff::Insert { idx, val } => ListDiff::Insert { idx: *idx, val: f(val) },
            ListDiff::Remove { idx, old } => ListDiff::Remove {
                idx: *idx,
                old: old.as_ref().map(&f),
            },
            ListDiff::Update { idx, old, val } => ListDiff::Update {
                idx: *idx,
                old: old.as_ref().map(&f),
                val: f(val),
            },
            ListDiff::Reset => ListDiff::Reset,
        }
    }

    /// Same message with its index moved by `f`.
    pub fn reindex(self, f: impl FnOnce(usize) -> usize) -> ListDiff<T> {
        match self {
            ListDiff::Insert { idx, val } => ListDiff::Insert { idx: f(idx), val },
            ListDiff::Remove { idx, old } => ListDiff::Remove { idx: f(idx), old },
            ListDiff::Update { idx, old, val } => ListDiff::Update { idx: f(idx), old, val },
            ListDiff::Reset => ListDiff::Reset,
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub trait ListView<Item>: View<Msg = ListDiff<Item>>
where
    Item: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize;
    fn get(&self, idx: &usize) -> Option<Item>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this view will ever emit a message.
    fn notifies(&self) -> bool {
        false
    }

    /// Stamp that grows whenever the contents may have changed.
    /// Lists that never change keep the default.
    fn revision(&self) -> u64 {
        0
    }

    /// Write access, if the view (and its sources) support it.
    fn as_mutable(&self) -> Option<&dyn MutableList<Item>> {
        None
    }
}

/// Write capability of a list view.
///
/// Every method either applies the change and lets the view emit
/// the corresponding message, or fails without touching anything.
pub trait MutableList<Item>: Send + Sync {
    fn insert(&self, idx: usize, val: Item) -> Result<(), ViewError>;
    fn remove(&self, idx: usize) -> Result<Item, ViewError>;
    fn set(&self, idx: usize, val: Item) -> Result<Item, ViewError>;
    fn clear(&self) -> Result<(), ViewError>;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub trait ListViewExt<T>: ListView<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn iter<'a>(&'a self) -> ListViewIter<'a, T, Self> {
        ListViewIter {
            _phantom: std::marker::PhantomData,
            view: self,
            cur: 0,
        }
    }

    fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    fn try_get(&self, idx: usize) -> Result<T, ViewError> {
        self.get(&idx)
            .ok_or(ViewError::OutOfRange { idx, len: self.len() })
    }
}

impl<T, V: ListView<T> + ?Sized> ListViewExt<T> for V where T: Clone + Send + Sync + 'static {}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct ListViewIter<'a, T, V>
where
    T: Clone + Send + Sync + 'static,
    V: ListView<T> + ?Sized,
{
    _phantom: std::marker::PhantomData<T>,
    view: &'a V,
    cur: usize,
}

impl<'a, T, V> Iterator for ListViewIter<'a, T, V>
where
    T: Clone + Send + Sync + 'static,
    V: ListView<T> + ?Sized,
{
    type Item = T;

    /// Positions that read as `None` are skipped.
    fn next(&mut self) -> Option<Self::Item> {
        while self.cur < self.view.len() {
            let i = self.cur;
            self.cur += 1;
            if let Some(x) = self.view.get(&i) {
                return Some(x);
            }
        }
        None
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<Item: Clone + Send + Sync + 'static, V: ListView<Item> + ?Sized> ListView<Item> for Arc<V> {
    fn len(&self) -> usize {
        self.deref().len()
    }

    fn get(&self, idx: &usize) -> Option<Item> {
        self.deref().get(idx)
    }

    fn notifies(&self) -> bool {
        self.deref().notifies()
    }

    fn revision(&self) -> u64 {
        self.deref().revision()
    }

    fn as_mutable(&self) -> Option<&dyn MutableList<Item>> {
        self.deref().as_mutable()
    }
}

impl<Item: Clone + Send + Sync + 'static, V: ListView<Item>> ListView<Item> for Option<V> {
    fn len(&self) -> usize {
        self.as_ref().map(|v| v.len()).unwrap_or(0)
    }

    fn get(&self, idx: &usize) -> Option<Item> {
        self.as_ref()?.get(idx)
    }

    fn notifies(&self) -> bool {
        self.as_ref().map(|v| v.notifies()).unwrap_or(false)
    }

    fn revision(&self) -> u64 {
        self.as_ref().map(|v| v.revision()).unwrap_or(0)
    }

    fn as_mutable(&self) -> Option<&dyn MutableList<Item>> {
        self.as_ref()?.as_mutable()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> OuterViewPort<dyn ListView<T>>
where
    T: Clone + Send + Sync + 'static,
{
    /// Called after every message that may change the length.
    pub fn add_count_fn<F: Fn() + Send + Sync + 'static>(&self, f: F) -> Subscription {
        self.add_observer(Arc::new(NotifyFnObserver::<dyn ListView<T>, _>::without_old_values(
            move |diff: &ListDiff<T>| {
                if diff.changes_count() {
                    f()
                }
            },
        )))
    }

    /// Called after every message.
    pub fn add_contents_fn<F: Fn() + Send + Sync + 'static>(&self, f: F) -> Subscription {
        self.add_observer(Arc::new(NotifyFnObserver::<dyn ListView<T>, _>::without_old_values(
            move |_: &ListDiff<T>| f(),
        )))
    }

    pub fn len(&self) -> usize {
        self.get_view().len()
    }

    pub fn get(&self, idx: &usize) -> Option<T> {
        self.get_view().get(idx)
    }

    pub fn to_vec(&self) -> Vec<T> {
        match self.get_view() {
            Some(view) => view.to_vec(),
            None => Vec::new(),
        }
    }

    pub fn notifies(&self) -> bool {
        self.get_view().notifies()
    }

    pub fn revision(&self) -> u64 {
        self.get_view().revision()
    }

    fn with_mutable<R>(
        &self,
        f: impl FnOnce(&dyn MutableList<T>) -> Result<R, ViewError>,
    ) -> Result<R, ViewError> {
        let view = self.get_view().ok_or(ViewError::Unsupported("port has no view"))?;
        let m = view
            .as_mutable()
            .ok_or(ViewError::Unsupported("view is read-only"))?;
        f(m)
    }

    pub fn insert(&self, idx: usize, val: T) -> Result<(), ViewError> {
        self.with_mutable(|m| m.insert(idx, val))
    }

    pub fn push(&self, val: T) -> Result<(), ViewError> {
        let len = self.len();
        self.insert(len, val)
    }

    pub fn remove(&self, idx: usize) -> Result<T, ViewError> {
        self.with_mutable(|m| m.remove(idx))
    }

    pub fn set(&self, idx: usize, val: T) -> Result<T, ViewError> {
        self.with_mutable(|m| m.set(idx, val))
    }

    pub fn clear(&self) -> Result<(), ViewError> {
        self.with_mutable(|m| m.clear())
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
