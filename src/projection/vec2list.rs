use {
    crate::{
        buffer::vec::{VecBuffer, VecDiff, VecStore},
        error::ViewError,
        view::{
            list::{ListDiff, ListView, MutableList},
            Activation, Observer, ObserverBroadcast, OuterViewPort, Subscription, View, ViewPort,
        },
    },
    std::sync::{Arc, Mutex, Weak},
    tracing::trace,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Adapter View implementing `ListView` for a `VecBuffer`
pub struct Vec2List<T>
where
    T: Clone + Send + Sync + 'static,
{
    buffer: VecBuffer<T>,
    store: Arc<VecStore<T>>,
    listener: Arc<VecListener<T>>,
    subscription: Mutex<Option<Subscription>>,
    cast: Arc<ObserverBroadcast<dyn ListView<T>>>,
}

struct VecListener<T>
where
    T: Clone + Send + Sync + 'static,
{
    target: Weak<Vec2List<T>>,
}

impl<T> Vec2List<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Translate one raw buffer signal. Runs right after the
    /// mutation, so the store already holds the new contents.
    fn normalize(&self, diff: &VecDiff<T>, with_old: bool) -> Option<ListDiff<T>> {
        let old = |v: &T| if with_old { Some(v.clone()) } else { None };
        match diff {
            VecDiff::Clear => Some(ListDiff::Reset),
            VecDiff::Push(val) => Some(ListDiff::Insert {
                idx: self.store.len().saturating_sub(1),
                val: val.clone(),
            }),
            VecDiff::Extend(vals) => match vals.as_slice() {
                [] => None,
                [val] => Some(ListDiff::Insert {
                    idx: self.store.len().saturating_sub(1),
                    val: val.clone(),
                }),
                _ => Some(ListDiff::Reset),
            },
            VecDiff::Insert { idx, val } => Some(ListDiff::Insert {
                idx: *idx,
                val: val.clone(),
            }),
            VecDiff::Remove { idx, old: o } => Some(ListDiff::Remove {
                idx: *idx,
                old: old(o),
            }),
            VecDiff::Update { idx, old: o, val } => Some(ListDiff::Update {
                idx: *idx,
                old: old(o),
                val: val.clone(),
            }),
            VecDiff::Swap { a, b } if a == b => None,
            VecDiff::Swap { .. } => Some(ListDiff::Reset),
            VecDiff::Truncate { len, removed } => match removed.as_slice() {
                [] => None,
                [o] => Some(ListDiff::Remove {
                    idx: *len,
                    old: old(o),
                }),
                _ => Some(ListDiff::Reset),
            },
        }
    }

    fn on_raw_diff(&self, diff: &VecDiff<T>) {
        let notifier = self.cast.notifier();
        if notifier.is_empty() {
            return;
        }
        if let Some(diff) = self.normalize(diff, notifier.wants_old_values()) {
            trace!("vec2list: forwarding buffer change");
            notifier.notify(&diff);
        }
    }
}

impl<T> Observer<VecStore<T>> for VecListener<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn notify(&self, diff: &VecDiff<T>) {
        if let Some(target) = self.target.upgrade() {
            target.on_raw_diff(diff);
        }
    }

    fn wants_old_values(&self) -> bool {
        false
    }
}

impl<T> Activation for Vec2List<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn activate(&self) {
        let mut sub = self.subscription.lock().unwrap();
        if sub.is_none() {
            *sub = Some(self.buffer.get_port().add_observer(self.listener.clone()));
        }
    }

    fn deactivate(&self) {
        let sub = self.subscription.lock().unwrap().take();
        drop(sub);
    }
}

impl<T> View for Vec2List<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T> ListView<T> for Vec2List<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.store.len()
    }

    fn get(&self, idx: &usize) -> Option<T> {
        self.store.get(*idx)
    }

    fn notifies(&self) -> bool {
        true
    }

    fn revision(&self) -> u64 {
        self.store.revision()
    }

    fn as_mutable(&self) -> Option<&dyn MutableList<T>> {
        Some(self)
    }
}

/// Writes go straight into the buffer, whose signal comes back
/// through the normal path.
impl<T> MutableList<T> for Vec2List<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn insert(&self, idx: usize, val: T) -> Result<(), ViewError> {
        self.buffer.insert(idx, val)
    }

    fn remove(&self, idx: usize) -> Result<T, ViewError> {
        self.buffer.remove(idx)
    }

    fn set(&self, idx: usize, val: T) -> Result<T, ViewError> {
        self.buffer.update(idx, val)
    }

    fn clear(&self) -> Result<(), ViewError> {
        self.buffer.clear();
        Ok(())
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> OuterViewPort<VecStore<T>>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn to_list(&self) -> OuterViewPort<dyn ListView<T>> {
        let port = ViewPort::new();
        let buffer = match VecBuffer::from_port(self) {
            Some(buffer) => buffer,
            None => return port.into_outer(),
        };

        let v2l = Arc::new_cyclic(|weak| Vec2List {
            store: buffer.store(),
            buffer,
            listener: Arc::new(VecListener {
                target: weak.clone(),
            }),
            subscription: Mutex::new(None),
            cast: port.get_cast(),
        });

        port.set_view(Some(v2l.clone() as Arc<dyn ListView<T>>));
        port.inner()
            .set_activation(Arc::downgrade(&v2l) as Weak<dyn Activation>);
        port.into_outer()
    }
}

impl<T> VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn to_list(&self) -> OuterViewPort<dyn ListView<T>> {
        self.get_port().to_list()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
