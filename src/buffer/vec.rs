use {
    crate::{
        error::ViewError,
        view::{next_revision, InnerViewPort, OuterViewPort, View, ViewPort},
    },
    serde::{Deserialize, Serialize},
    std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Native change signal of a [`VecBuffer`].
///
/// Some variants span several elements; list views normalize those
/// into `ListDiff::Reset` (see `to_list`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum VecDiff<T> {
    Clear,
    Push(T),
    Extend(Vec<T>),
    Insert { idx: usize, val: T },
    Remove { idx: usize, old: T },
    Update { idx: usize, old: T, val: T },
    Swap { a: usize, b: usize },
    Truncate { len: usize, removed: Vec<T> },
}

/// Storage behind a [`VecBuffer`], shared with the buffer's views.
pub struct VecStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    data: RwLock<Vec<T>>,
    revision: AtomicU64,
}

impl<T> View for VecStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = VecDiff<T>;
}

impl<T> VecStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new(data: Vec<T>) -> Self {
        VecStore {
            data: RwLock::new(data),
            revision: AtomicU64::new(next_revision()),
        }
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<T> {
        self.data.read().unwrap().get(idx).cloned()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.read().unwrap().clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.revision.store(next_revision(), Ordering::SeqCst);
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Mutable, notifying vector. Clones share the same storage.
#[derive(Clone)]
pub struct VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    store: Arc<VecStore<T>>,
    port: InnerViewPort<VecStore<T>>,
}

impl<T> VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn with_data_port(data: Vec<T>, port: InnerViewPort<VecStore<T>>) -> Self {
        let store = Arc::new(VecStore::new(data));
        port.set_view(Some(store.clone()));
        VecBuffer { store, port }
    }

    pub fn with_data(data: Vec<T>) -> Self {
        VecBuffer::with_data_port(data, ViewPort::new().into_inner())
    }

    pub fn with_port(port: InnerViewPort<VecStore<T>>) -> Self {
        VecBuffer::with_data_port(vec![], port)
    }

    pub fn new() -> Self {
        VecBuffer::with_port(ViewPort::new().into_inner())
    }

    /// Re-attach to the buffer behind `port`.
    /// `None` if the port has no storage yet.
    pub fn from_port(port: &OuterViewPort<VecStore<T>>) -> Option<Self> {
        Some(VecBuffer {
            store: port.get_view()?,
            port: port.0.inner(),
        })
    }

    pub fn get_port(&self) -> OuterViewPort<VecStore<T>> {
        self.port.0.outer()
    }

    pub fn store(&self) -> Arc<VecStore<T>> {
        self.store.clone()
    }

    /// Replay a recorded change.
    pub fn apply_diff(&self, diff: VecDiff<T>) -> Result<(), ViewError> {
        match diff {
            VecDiff::Clear => self.clear(),
            VecDiff::Push(val) => self.push(val),
            VecDiff::Extend(vals) => self.extend(vals),
            VecDiff::Insert { idx, val } => self.insert(idx, val)?,
            VecDiff::Remove { idx, .. } => {
                self.remove(idx)?;
            }
            VecDiff::Update { idx, val, .. } => {
                self.update(idx, val)?;
            }
            VecDiff::Swap { a, b } => self.swap(a, b)?,
            VecDiff::Truncate { len, .. } => self.truncate(len),
        }
        Ok(())
    }

    fn emit(&self, diff: VecDiff<T>) {
        self.store.touch();
        self.port.notify(&diff);
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<T> {
        self.store.get(idx)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.store.to_vec()
    }

    pub fn clear(&self) {
        self.store.data.write().unwrap().clear();
        self.emit(VecDiff::Clear);
    }

    pub fn push(&self, val: T) {
        self.store.data.write().unwrap().push(val.clone());
        self.emit(VecDiff::Push(val));
    }

    pub fn extend(&self, vals: Vec<T>) {
        self.store.data.write().unwrap().extend(vals.iter().cloned());
        self.emit(VecDiff::Extend(vals));
    }

    pub fn insert(&self, idx: usize, val: T) -> Result<(), ViewError> {
        {
            let mut data = self.store.data.write().unwrap();
            ViewError::check_insert(idx, data.len())?;
            data.insert(idx, val.clone());
        }
        self.emit(VecDiff::Insert { idx, val });
        Ok(())
    }

    pub fn remove(&self, idx: usize) -> Result<T, ViewError> {
        let old = {
            let mut data = self.store.data.write().unwrap();
            ViewError::check_index(idx, data.len())?;
            data.remove(idx)
        };
        self.emit(VecDiff::Remove {
            idx,
            old: old.clone(),
        });
        Ok(old)
    }

    pub fn update(&self, idx: usize, val: T) -> Result<T, ViewError> {
        let old = {
            let mut data = self.store.data.write().unwrap();
            ViewError::check_index(idx, data.len())?;
            std::mem::replace(&mut data[idx], val.clone())
        };
        self.emit(VecDiff::Update {
            idx,
            old: old.clone(),
            val,
        });
        Ok(old)
    }

    pub fn swap(&self, a: usize, b: usize) -> Result<(), ViewError> {
        {
            let mut data = self.store.data.write().unwrap();
            ViewError::check_index(a, data.len())?;
            ViewError::check_index(b, data.len())?;
            data.swap(a, b);
        }
        self.emit(VecDiff::Swap { a, b });
        Ok(())
    }

    pub fn truncate(&self, len: usize) {
        let removed: Vec<T> = {
            let mut data = self.store.data.write().unwrap();
            if len >= data.len() {
                Vec::new()
            } else {
                data.drain(len..).collect()
            }
        };
        self.emit(VecDiff::Truncate { len, removed });
    }
}

impl<T> Default for VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        VecBuffer::new()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use crate::buffer::vec::*;
    use std::sync::Mutex;

    #[test]
    fn vec_buffer_signals() {
        let buffer = VecBuffer::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        let _sub = buffer
            .get_port()
            .add_notify_fn(move |d: &VecDiff<char>| l.lock().unwrap().push(d.clone()));

        buffer.push('a');
        buffer.push('b');
        buffer.insert(1, 'c').unwrap();
        assert_eq!(buffer.update(0, 'x'), Ok('a'));
        assert_eq!(buffer.remove(2), Ok('b'));
        assert_eq!(buffer.to_vec(), vec!['x', 'c']);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                VecDiff::Push('a'),
                VecDiff::Push('b'),
                VecDiff::Insert { idx: 1, val: 'c' },
                VecDiff::Update { idx: 0, old: 'a', val: 'x' },
                VecDiff::Remove { idx: 2, old: 'b' },
            ]
        );
    }

    #[test]
    fn out_of_range_writes_are_rejected() {
        let buffer = VecBuffer::with_data(vec![1, 2]);
        let rev = buffer.get_port().get_view().unwrap().revision();

        assert_eq!(buffer.insert(3, 0), Err(ViewError::OutOfRange { idx: 3, len: 2 }));
        assert_eq!(buffer.remove(2), Err(ViewError::OutOfRange { idx: 2, len: 2 }));
        assert_eq!(buffer.update(5, 0), Err(ViewError::OutOfRange { idx: 5, len: 2 }));
        assert_eq!(buffer.to_vec(), vec![1, 2]);
        assert_eq!(buffer.get_port().get_view().unwrap().revision(), rev);

        buffer.push(3);
        assert!(buffer.get_port().get_view().unwrap().revision() > rev);
    }

    #[test]
    fn recorded_diffs_replay_through_json() {
        let source = VecBuffer::<i32>::new();
        let (_sub, rx) = source.get_port().queue();

        source.extend(vec![1, 2, 3]);
        source.swap(0, 2).unwrap();
        source.remove(1).unwrap();
        source.truncate(1);
        source.update(0, 7).unwrap();

        let log: Vec<String> = rx
            .drain()
            .iter()
            .map(|d| serde_json::to_string(d).unwrap())
            .collect();

        let replica = VecBuffer::<i32>::new();
        for line in log {
            let diff: VecDiff<i32> = serde_json::from_str(&line).unwrap();
            replica.apply_diff(diff).unwrap();
        }
        assert_eq!(replica.to_vec(), source.to_vec());
        assert_eq!(replica.to_vec(), vec![7]);
    }
}
