use {
    crate::{
        buffer::generate,
        error::ViewError,
        projection::{
            projection_helper::{demand_of, ProjectionHelper},
            publish,
        },
        view::{
            list::{ListDiff, ListView, ListViewExt, MutableList},
            Activation, ObserverBroadcast, OuterViewPort, View, ViewPort,
        },
    },
    std::sync::{Arc, RwLock},
    tracing::debug,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// This list followed by `other`.
    pub fn concat(&self, other: &OuterViewPort<dyn ListView<T>>) -> OuterViewPort<dyn ListView<T>> {
        self.concat_all(vec![other.clone()])
    }

    /// This list followed by each of `rest`, in order.
    pub fn concat_all(
        &self,
        rest: impl IntoIterator<Item = OuterViewPort<dyn ListView<T>>>,
    ) -> OuterViewPort<dyn ListView<T>> {
        let mut ports = vec![self.clone()];
        ports.extend(rest);
        generate::just(ports).flatten()
    }
}

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<OuterViewPort<dyn ListView<T>>>> {
    /// Concatenation of all lists in this list.
    /// Changes to the outer list are followed as well.
    pub fn flatten(&self) -> OuterViewPort<dyn ListView<T>> {
        let port: ViewPort<dyn ListView<T>> = ViewPort::new();
        let cast = port.get_cast();

        let proj = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let sources = proj_helper.new_list_arg(
                ConcatArg::Sources,
                self.clone(),
                |c: &ConcatList<T>, diff| c.on_sources_diff(diff),
            );
            let proj = ConcatList {
                sources,
                attached: RwLock::new(0),
                cast,
                proj_helper,
            };
            proj.attach_children();
            proj
        });

        publish(port, &proj)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

type Child<T> = Option<Arc<dyn ListView<T>>>;

/// Child holding the element at `idx`, and the position inside it.
fn find_existing_index<T>(children: &[Child<T>], idx: usize) -> Option<(usize, usize)>
where
    T: Clone + Send + Sync + 'static,
{
    let mut base = 0;
    for (i, child) in children.iter().enumerate() {
        let len = child.len();
        if idx < base + len {
            return Some((i, idx - base));
        }
        base += len;
    }
    None
}

/// Child receiving an insertion at `idx`.
/// A position between two children appends to the earlier one.
fn find_new_index<T>(children: &[Child<T>], idx: usize) -> Option<(usize, usize)>
where
    T: Clone + Send + Sync + 'static,
{
    let mut base = 0;
    for (i, child) in children.iter().enumerate() {
        let len = child.len();
        if idx <= base + len {
            return Some((i, idx - base));
        }
        base += len;
    }
    None
}

fn writable<T>(child: &Child<T>) -> Result<&dyn MutableList<T>, ViewError>
where
    T: Clone + Send + Sync + 'static,
{
    child
        .as_ref()
        .and_then(|c| c.as_mutable())
        .ok_or(ViewError::Unsupported("source is read-only"))
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConcatArg {
    Sources,
    Child(usize),
}

pub struct ConcatList<T>
where
    T: Clone + Send + Sync + 'static,
{
    sources: Option<Arc<dyn ListView<OuterViewPort<dyn ListView<T>>>>>,

    /// number of child listeners currently registered
    attached: RwLock<usize>,

    cast: Arc<ObserverBroadcast<dyn ListView<T>>>,
    proj_helper: ProjectionHelper<ConcatArg, Self>,
}

impl<T> ConcatList<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Current children, read from the source list.
    fn children(&self) -> Vec<Child<T>> {
        self.sources
            .to_vec()
            .into_iter()
            .map(|port| port.get_view())
            .collect()
    }

    /// Replace all child listeners by ones for the current source list.
    fn attach_children(&self) {
        let ports = self.sources.to_vec();
        let n = ports.len();

        let old = *self.attached.read().unwrap();
        for i in n..old {
            self.proj_helper.remove_arg(&ConcatArg::Child(i));
        }
        for (i, port) in ports.into_iter().enumerate() {
            self.proj_helper.new_list_arg(ConcatArg::Child(i), port, move |c: &Self, diff| {
                c.on_child_diff(i, diff)
            });
        }
        *self.attached.write().unwrap() = n;
    }

    fn on_sources_diff(&self, _diff: &ListDiff<OuterViewPort<dyn ListView<T>>>) {
        debug!("concat: reset (list of sources changed)");
        self.attach_children();
        self.cast.notify(&ListDiff::Reset);
    }

    fn on_child_diff(&self, child: usize, diff: &ListDiff<T>) {
        let children = self.children();
        if child >= children.len() {
            debug!("concat: reset (message from detached child {})", child);
            self.cast.notify(&ListDiff::Reset);
            return;
        }
        let base: usize = children[..child].iter().map(|c| c.len()).sum();
        self.cast.notify(&diff.clone().reindex(|i| base + i));
    }
}

impl<T> View for ConcatList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T> ListView<T> for ConcatList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.children().iter().map(|c| c.len()).sum()
    }

    fn get(&self, idx: &usize) -> Option<T> {
        let children = self.children();
        let (child, local) = find_existing_index(&children, *idx)?;
        children[child].get(&local)
    }

    fn notifies(&self) -> bool {
        self.sources.notifies() || self.children().iter().any(|c| c.notifies())
    }

    fn revision(&self) -> u64 {
        self.children()
            .iter()
            .map(|c| c.revision())
            .fold(self.sources.revision(), u64::max)
    }

    fn as_mutable(&self) -> Option<&dyn MutableList<T>> {
        Some(self)
    }
}

/// Writes go to the child owning the position; its message comes back offset.
impl<T> MutableList<T> for ConcatList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn insert(&self, idx: usize, val: T) -> Result<(), ViewError> {
        let children = self.children();
        ViewError::check_insert(idx, self.len())?;
        let (child, local) =
            find_new_index(&children, idx).ok_or(ViewError::Unsupported("no list to insert into"))?;
        writable(&children[child])?.insert(local, val)
    }

    fn remove(&self, idx: usize) -> Result<T, ViewError> {
        let children = self.children();
        let (child, local) = find_existing_index(&children, idx).ok_or(ViewError::OutOfRange {
            idx,
            len: self.len(),
        })?;
        writable(&children[child])?.remove(local)
    }

    fn set(&self, idx: usize, val: T) -> Result<T, ViewError> {
        let children = self.children();
        let (child, local) = find_existing_index(&children, idx).ok_or(ViewError::OutOfRange {
            idx,
            len: self.len(),
        })?;
        writable(&children[child])?.set(local, val)
    }

    fn clear(&self) -> Result<(), ViewError> {
        let children = self.children();
        let mut pause = self.proj_helper.pause();
        let result = children
            .iter()
            .filter(|c| !c.is_empty())
            .try_for_each(|c| writable(c)?.clear());
        // one reset covers all of them
        pause.discard();
        self.cast.notify(&ListDiff::Reset);
        result
    }
}

impl<T> Activation for ConcatList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn activate(&self) {
        self.attach_children();
        self.proj_helper.activate();
    }

    fn deactivate(&self) {
        self.proj_helper.deactivate();
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use {
        crate::{
            buffer::{generate, vec::VecBuffer},
            error::ViewError,
            view::{list::*, OuterViewPort},
        },
        proptest::prelude::*,
    };

    #[test]
    fn concat_translates_child_messages() {
        let a = VecBuffer::with_data(vec![1, 2]);
        let b = VecBuffer::with_data(vec![3, 4, 5]);
        let b_list = b.to_list();
        let both = a.to_list().concat(&b_list);

        assert_eq!(both.len(), 5);
        assert_eq!(both.get(&3), Some(4));
        assert!(!b_list.is_observed());

        let (_sub, rx) = both.queue();
        assert!(b_list.is_observed());

        b.remove(0).unwrap();
        assert_eq!(rx.drain(), vec![ListDiff::Remove { idx: 2, old: Some(3) }]);
        assert_eq!(both.to_vec(), vec![1, 2, 4, 5]);
    }

    #[test]
    fn writes_go_to_the_owning_child() {
        let a = VecBuffer::with_data(vec![1, 2]);
        let b = VecBuffer::with_data(vec![3]);
        let both = a.to_list().concat(&b.to_list());
        let (_sub, rx) = both.queue();

        // the boundary position belongs to the earlier child
        both.insert(2, 9).unwrap();
        assert_eq!(a.to_vec(), vec![1, 2, 9]);
        assert_eq!(both.set(3, 30), Ok(3));
        assert_eq!(both.remove(0), Ok(1));
        assert_eq!(both.remove(7), Err(ViewError::OutOfRange { idx: 7, len: 3 }));
        assert_eq!(
            rx.drain(),
            vec![
                ListDiff::Insert { idx: 2, val: 9 },
                ListDiff::Update { idx: 3, old: Some(3), val: 30 },
                ListDiff::Remove { idx: 0, old: Some(1) },
            ]
        );

        both.clear().unwrap();
        assert_eq!(rx.drain(), vec![ListDiff::Reset]);
        assert!(a.is_empty() && b.is_empty());
    }

    #[test]
    fn read_only_children() {
        let both = generate::just(vec![1]).concat(&generate::empty());
        assert!(matches!(both.push(2), Err(ViewError::Unsupported(_))));
        assert_eq!(both.to_vec(), vec![1]);
    }

    #[test]
    fn outer_list_changes_reset() {
        let lists = VecBuffer::<OuterViewPort<dyn ListView<i32>>>::new();
        let flat = lists.to_list().flatten();
        let (_sub, rx) = flat.queue();

        lists.push(generate::just(vec![1, 2]));
        lists.push(generate::just(vec![3]));
        assert_eq!(flat.to_vec(), vec![1, 2, 3]);
        assert_eq!(rx.drain(), vec![ListDiff::Reset, ListDiff::Reset]);

        let c = VecBuffer::with_data(vec![7]);
        lists.insert(0, c.to_list()).unwrap();
        c.push(8);
        assert_eq!(flat.to_vec(), vec![7, 8, 1, 2, 3]);
        assert_eq!(rx.drain(), vec![ListDiff::Reset, ListDiff::Insert { idx: 1, val: 8 }]);

        lists.remove(0).unwrap();
        c.push(9);
        assert_eq!(rx.drain(), vec![ListDiff::Reset]);
        assert_eq!(flat.to_vec(), vec![1, 2, 3]);
    }

    proptest! {
        #[test]
        fn observed_concat_matches_joined_sources(
            left in proptest::collection::vec(0..50i32, 0..6),
            right in proptest::collection::vec(0..50i32, 0..6),
            script in proptest::collection::vec(
                (any::<bool>(), 0..3u8, any::<usize>(), 0..50i32),
                0..30,
            ),
        ) {
            let a = VecBuffer::with_data(left);
            let b = VecBuffer::with_data(right);
            let both = a.to_list().concat(&b.to_list());
            let (_sub, rx) = both.queue();
            let mut mirror = both.to_vec();

            for (on_left, kind, i, v) in script {
                let buffer = if on_left { &a } else { &b };
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
                        ListDiff::Reset => mirror = both.to_vec(),
                    }
                }
                let mut joined = a.to_vec();
                joined.extend(b.to_vec());
                prop_assert_eq!(&mirror, &joined);
            }
        }
    }
}
