use {
    crate::{
        error::ViewError,
        projection::{
            projection_helper::{demand_of, ProjectionHelper},
            publish,
        },
        view::{
            list::{ListDiff, ListView, MutableList},
            next_revision, Activation, ObserverBroadcast, OuterViewPort, View, ViewPort,
        },
    },
    std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
    tracing::{debug, trace},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
             Index Array Helpers
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// Account for an element inserted into the source at `src_idx`.
pub fn shift_up(indices: &mut [usize], src_idx: usize) {
    for i in indices.iter_mut() {
        if *i >= src_idx {
            *i += 1;
        }
    }
}

/// Account for the source element at `src_idx` being removed.
/// Returns the derived positions that referenced it, which are dropped.
pub fn shift_down(indices: &mut Vec<usize>, src_idx: usize) -> Vec<usize> {
    let dropped = occurrences(indices, src_idx);
    indices.retain(|i| *i != src_idx);
    for i in indices.iter_mut() {
        if *i > src_idx {
            *i -= 1;
        }
    }
    dropped
}

/// Derived positions referencing `src_idx`.
pub fn occurrences(indices: &[usize], src_idx: usize) -> Vec<usize> {
    indices
        .iter()
        .enumerate()
        .filter(|(_, i)| **i == src_idx)
        .map(|(pos, _)| pos)
        .collect()
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                Index Order
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// Where a source element goes in the derived list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// not part of the derived list
    Skip,
    At(usize),
    /// no precise answer, rebuild everything
    Reset,
}

/// Policy of an index-translated view: which source elements
/// appear and in what order.
pub trait IndexOrder<T>: Send + Sync + 'static
where
    T: Clone + Send + Sync + 'static,
{
    /// Complete index array for the current source contents.
    /// `current` is the array before the rebuild (empty at construction).
    fn build(&mut self, src: &dyn ListView<T>, current: &[usize]) -> Vec<usize>;

    /// Position for `src_idx` in `indices`, which does not contain it yet.
    fn place(&mut self, src: &dyn ListView<T>, indices: &[usize], src_idx: usize) -> Placement;

    /// New position for a replaced element that used to sit at `old_pos`.
    fn relocate(
        &mut self,
        src: &dyn ListView<T>,
        indices: &[usize],
        src_idx: usize,
        _old_pos: usize,
    ) -> Placement {
        self.place(src, indices, src_idx)
    }

    /// Every source message invalidates the whole arrangement.
    fn resets_on_change(&self) -> bool {
        false
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               Indexed List
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

struct IndexState<O> {
    indices: Vec<usize>,
    order: O,
    /// source revision the indices correspond to
    synced: u64,
}

/// View whose element `i` is `source[indices[i]]`.
pub struct IndexedList<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: IndexOrder<T>,
{
    src: Option<Arc<dyn ListView<T>>>,
    state: RwLock<IndexState<O>>,
    /// bumped when the order rearranges on its own
    local_revision: AtomicU64,
    cast: Arc<ObserverBroadcast<dyn ListView<T>>>,
    proj_helper: ProjectionHelper<(), Self>,
}

impl<T, O> IndexedList<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: IndexOrder<T>,
{
    pub fn new(
        src_port: &OuterViewPort<dyn ListView<T>>,
        order: O,
    ) -> (Arc<Self>, OuterViewPort<dyn ListView<T>>) {
        let port: ViewPort<dyn ListView<T>> = ViewPort::new();
        let cast = port.get_cast();

        let proj = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let src = proj_helper.new_list_arg((), src_port.clone(), |p: &Self, diff| {
                p.on_src_diff(diff)
            });

            let mut order = order;
            let indices = match src.as_ref() {
                Some(src) => order.build(src.as_ref(), &[]),
                None => Vec::new(),
            };

            IndexedList {
                state: RwLock::new(IndexState {
                    indices,
                    order,
                    synced: proj_helper.revision(),
                }),
                src,
                local_revision: AtomicU64::new(0),
                cast,
                proj_helper,
            }
        });

        let port = publish(port, &proj);
        (proj, port)
    }

    fn src(&self) -> Option<&dyn ListView<T>> {
        self.src.as_ref().map(|s| s.as_ref())
    }

    fn rebuild(&self, state: &mut IndexState<O>) {
        let src = match self.src() {
            Some(src) => src,
            None => return,
        };
        let IndexState { indices, order, .. } = &mut *state;
        *indices = order.build(src, indices);
        state.synced = self.proj_helper.revision();
    }

    /// Bring the index array up to date when no listener does it.
    fn validate(&self) {
        if self.proj_helper.is_live() {
            return;
        }
        let rev = self.proj_helper.revision();
        if self.state.read().unwrap().synced == rev {
            return;
        }
        let mut state = self.state.write().unwrap();
        if state.synced != rev {
            trace!("indexed list: rebuilding stale indices");
            self.rebuild(&mut state);
        }
    }

    pub fn indices(&self) -> Vec<usize> {
        self.validate();
        self.state.read().unwrap().indices.clone()
    }

    /// Rearrange through the order and announce a Reset.
    pub fn reorder<R>(
        &self,
        f: impl FnOnce(&mut O, &dyn ListView<T>, &mut Vec<usize>) -> R,
    ) -> Option<R> {
        self.validate();
        let src = self.src()?;
        let r = {
            let mut state = self.state.write().unwrap();
            let IndexState { indices, order, .. } = &mut *state;
            f(order, src, indices)
        };
        self.local_revision.store(next_revision(), Ordering::SeqCst);
        self.cast.notify(&ListDiff::Reset);
        Some(r)
    }

    fn reset(&self, state: &mut IndexState<O>, reason: &str) -> Option<ListDiff<T>> {
        debug!("indexed list: reset ({})", reason);
        self.rebuild(state);
        Some(ListDiff::Reset)
    }

    fn on_src_diff(&self, diff: &ListDiff<T>) {
        let src = match self.src() {
            Some(src) => src,
            None => return,
        };

        let out = {
            let mut state = self.state.write().unwrap();
            let out = if state.order.resets_on_change() {
                self.reset(&mut state, "order depends on all elements")
            } else {
                self.translate(src, &mut state, diff)
            };
            state.synced = self.proj_helper.revision();
            out
        };

        if let Some(out) = out {
            self.cast.notify(&out);
        }
    }

    fn translate(
        &self,
        src: &dyn ListView<T>,
        state: &mut IndexState<O>,
        diff: &ListDiff<T>,
    ) -> Option<ListDiff<T>> {
        match diff {
            ListDiff::Insert { idx, val } => {
                shift_up(&mut state.indices, *idx);
                let IndexState { indices, order, .. } = &mut *state;
                match order.place(src, indices, *idx) {
                    Placement::Skip => None,
                    Placement::At(pos) => {
                        indices.insert(pos, *idx);
                        Some(ListDiff::Insert { idx: pos, val: val.clone() })
                    }
                    Placement::Reset => self.reset(state, "no position for inserted element"),
                }
            }

            ListDiff::Remove { idx, old } => {
                let dropped = shift_down(&mut state.indices, *idx);
                match dropped.as_slice() {
                    [] => None,
                    [pos] => Some(ListDiff::Remove { idx: *pos, old: old.clone() }),
                    _ => self.reset(state, "removed element was referenced several times"),
                }
            }

            ListDiff::Update { idx, old, val } => {
                let found = occurrences(&state.indices, *idx);
                match found.as_slice() {
                    [] => {
                        let IndexState { indices, order, .. } = &mut *state;
                        match order.place(src, indices, *idx) {
                            Placement::Skip => None,
                            Placement::At(pos) => {
                                indices.insert(pos, *idx);
                                Some(ListDiff::Insert { idx: pos, val: val.clone() })
                            }
                            Placement::Reset => {
                                self.reset(state, "no position for replaced element")
                            }
                        }
                    }
                    [pos] => {
                        let pos = *pos;
                        let IndexState { indices, order, .. } = &mut *state;
                        indices.remove(pos);
                        match order.relocate(src, indices, *idx, pos) {
                            Placement::Skip => Some(ListDiff::Remove {
                                idx: pos,
                                old: old.clone(),
                            }),
                            Placement::At(new_pos) if new_pos == pos => {
                                indices.insert(pos, *idx);
                                Some(ListDiff::Update {
                                    idx: pos,
                                    old: old.clone(),
                                    val: val.clone(),
                                })
                            }
                            Placement::At(new_pos) => {
                                indices.insert(new_pos, *idx);
                                debug!(
                                    "indexed list: reset (replaced element moved {} -> {})",
                                    pos, new_pos
                                );
                                Some(ListDiff::Reset)
                            }
                            Placement::Reset => {
                                self.reset(state, "no position for replaced element")
                            }
                        }
                    }
                    _ => self.reset(state, "replaced element is referenced several times"),
                }
            }

            ListDiff::Reset => self.reset(state, "source reset"),
        }
    }

    fn writable(&self) -> Result<&dyn MutableList<T>, ViewError> {
        self.src()
            .and_then(|s| s.as_mutable())
            .ok_or(ViewError::Unsupported("source is read-only"))
    }

    fn source_index(&self, idx: usize) -> Result<usize, ViewError> {
        self.validate();
        let state = self.state.read().unwrap();
        state
            .indices
            .get(idx)
            .copied()
            .ok_or(ViewError::OutOfRange { idx, len: state.indices.len() })
    }
}

impl<T, O> View for IndexedList<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: IndexOrder<T>,
{
    type Msg = ListDiff<T>;
}

impl<T, O> ListView<T> for IndexedList<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: IndexOrder<T>,
{
    fn len(&self) -> usize {
        self.validate();
        self.state.read().unwrap().indices.len()
    }

    fn get(&self, idx: &usize) -> Option<T> {
        self.validate();
        let src_idx = *self.state.read().unwrap().indices.get(*idx)?;
        self.src()?.get(&src_idx)
    }

    fn notifies(&self) -> bool {
        self.proj_helper.notifies()
    }

    fn revision(&self) -> u64 {
        self.proj_helper
            .revision()
            .max(self.local_revision.load(Ordering::SeqCst))
    }

    fn as_mutable(&self) -> Option<&dyn MutableList<T>> {
        Some(self)
    }
}

/// Elements are addressed through the index array. The order decides
/// positions, so inserting at a chosen index is not possible.
/// Messages the write causes upstream are held until it is done
/// and then handled like any other source message.
impl<T, O> MutableList<T> for IndexedList<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: IndexOrder<T>,
{
    fn insert(&self, _idx: usize, _val: T) -> Result<(), ViewError> {
        Err(ViewError::Unsupported("position is decided by the view"))
    }

    fn remove(&self, idx: usize) -> Result<T, ViewError> {
        let src = self.writable()?;
        let src_idx = self.source_index(idx)?;
        let _guard = self.proj_helper.pause();
        src.remove(src_idx)
    }

    fn set(&self, idx: usize, val: T) -> Result<T, ViewError> {
        let src = self.writable()?;
        let src_idx = self.source_index(idx)?;
        let _guard = self.proj_helper.pause();
        src.set(src_idx, val)
    }

    fn clear(&self) -> Result<(), ViewError> {
        Err(ViewError::Unsupported("clear the source instead"))
    }
}

impl<T, O> Activation for IndexedList<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: IndexOrder<T>,
{
    fn activate(&self) {
        self.validate();
        self.proj_helper.activate();
    }

    fn deactivate(&self) {
        self.proj_helper.deactivate();
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
