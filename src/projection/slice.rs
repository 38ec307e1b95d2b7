use {
    crate::{
        error::ViewError,
        projection::{
            projection_helper::{demand_of, ProjectionHelper},
            publish,
        },
        view::{
            list::{ListDiff, ListView, MutableList},
            Activation, ObserverBroadcast, OuterViewPort, View, ViewPort,
        },
    },
    std::sync::{Arc, RwLock},
    tracing::debug,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// Window of `count` elements starting at `offset`.
    /// The window moves with insertions and removals before it,
    /// and grows or shrinks with those inside it.
    pub fn slice(
        &self,
        offset: usize,
        count: usize,
    ) -> Result<OuterViewPort<dyn ListView<T>>, ViewError> {
        let len = self.len();
        match offset.checked_add(count) {
            Some(end) if end <= len => {}
            end => {
                return Err(ViewError::OutOfRange {
                    idx: end.unwrap_or(usize::MAX),
                    len,
                })
            }
        }
        Ok(SliceList::new(self, offset, count))
    }

    /// Everything from `n` on (nothing if the list is shorter).
    pub fn skip(&self, n: usize) -> OuterViewPort<dyn ListView<T>> {
        let len = self.len();
        let offset = n.min(len);
        SliceList::new(self, offset, len - offset)
    }

    /// The first `n` elements (all of them if the list is shorter).
    pub fn take(&self, n: usize) -> OuterViewPort<dyn ListView<T>> {
        SliceList::new(self, 0, n.min(self.len()))
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Window {
    offset: usize,
    count: usize,
}

impl Window {
    fn clamped(self, len: usize) -> Window {
        let offset = self.offset.min(len);
        Window {
            offset,
            count: self.count.min(len - offset),
        }
    }
}

pub struct SliceList<T>
where
    T: Clone + Send + Sync + 'static,
{
    src: Option<Arc<dyn ListView<T>>>,
    window: RwLock<Window>,
    cast: Arc<ObserverBroadcast<dyn ListView<T>>>,
    proj_helper: ProjectionHelper<(), Self>,
}

impl<T> SliceList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new(
        src_port: &OuterViewPort<dyn ListView<T>>,
        offset: usize,
        count: usize,
    ) -> OuterViewPort<dyn ListView<T>> {
        let port: ViewPort<dyn ListView<T>> = ViewPort::new();
        let cast = port.get_cast();

        let slice = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let src = proj_helper.new_list_arg((), src_port.clone(), |s: &Self, diff| {
                s.on_src_diff(diff)
            });
            SliceList {
                src,
                window: RwLock::new(Window { offset, count }),
                cast,
                proj_helper,
            }
        });

        publish(port, &slice)
    }

    /// Current window, kept inside the source.
    fn window(&self) -> Window {
        self.window.read().unwrap().clamped(self.src.len())
    }

    fn on_src_diff(&self, diff: &ListDiff<T>) {
        let out = {
            let mut w = self.window.write().unwrap();
            match diff {
                ListDiff::Insert { idx, val } => {
                    if *idx < w.offset {
                        w.offset += 1;
                        None
                    } else if *idx <= w.offset + w.count {
                        w.count += 1;
                        Some(ListDiff::Insert {
                            idx: idx - w.offset,
                            val: val.clone(),
                        })
                    } else {
                        None
                    }
                }
                ListDiff::Remove { idx, old } => {
                    if *idx < w.offset {
                        w.offset -= 1;
                        None
                    } else if *idx < w.offset + w.count {
                        w.count -= 1;
                        Some(ListDiff::Remove {
                            idx: idx - w.offset,
                            old: old.clone(),
                        })
                    } else {
                        None
                    }
                }
                ListDiff::Update { idx, old, val } => {
                    if *idx >= w.offset && *idx < w.offset + w.count {
                        Some(ListDiff::Update {
                            idx: idx - w.offset,
                            old: old.clone(),
                            val: val.clone(),
                        })
                    } else {
                        None
                    }
                }
                ListDiff::Reset => {
                    debug!("slice: source reset, clamping window");
                    *w = w.clamped(self.src.len());
                    Some(ListDiff::Reset)
                }
            }
        };

        if let Some(out) = out {
            self.cast.notify(&out);
        }
    }

    fn writable(&self) -> Result<&dyn MutableList<T>, ViewError> {
        self.src
            .as_ref()
            .and_then(|s| s.as_mutable())
            .ok_or(ViewError::Unsupported("source is read-only"))
    }
}

impl<T> View for SliceList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T> ListView<T> for SliceList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.window().count
    }

    fn get(&self, idx: &usize) -> Option<T> {
        let w = self.window();
        if *idx < w.count {
            self.src.get(&(w.offset + idx))
        } else {
            None
        }
    }

    fn notifies(&self) -> bool {
        self.proj_helper.notifies()
    }

    fn revision(&self) -> u64 {
        self.proj_helper.revision()
    }

    fn as_mutable(&self) -> Option<&dyn MutableList<T>> {
        Some(self)
    }
}

/// Each write holds back the source messages it causes and translates
/// them once the source is done. Without a live listener there are none,
/// so the requested change is translated instead.
impl<T> SliceList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn write<R>(
        &self,
        edit: impl FnOnce(&dyn MutableList<T>) -> Result<R, ViewError>,
        requested: impl FnOnce(&R) -> ListDiff<T>,
    ) -> Result<R, ViewError> {
        let src = self.writable()?;
        let live = self.proj_helper.is_live();
        let r = {
            let _guard = self.proj_helper.pause();
            edit(src)?
        };
        if !live {
            self.on_src_diff(&requested(&r));
        }
        Ok(r)
    }
}

impl<T> MutableList<T> for SliceList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn insert(&self, idx: usize, val: T) -> Result<(), ViewError> {
        let w = self.window();
        ViewError::check_insert(idx, w.count)?;
        let at = w.offset + idx;
        let item = val.clone();
        self.write(
            |src| src.insert(at, item),
            |_| ListDiff::Insert { idx: at, val },
        )
    }

    fn remove(&self, idx: usize) -> Result<T, ViewError> {
        let w = self.window();
        ViewError::check_index(idx, w.count)?;
        let at = w.offset + idx;
        self.write(
            |src| src.remove(at),
            |old| ListDiff::Remove {
                idx: at,
                old: Some(old.clone()),
            },
        )
    }

    fn set(&self, idx: usize, val: T) -> Result<T, ViewError> {
        let w = self.window();
        ViewError::check_index(idx, w.count)?;
        let at = w.offset + idx;
        let item = val.clone();
        self.write(
            |src| src.set(at, item),
            |old| ListDiff::Update {
                idx: at,
                old: Some(old.clone()),
                val,
            },
        )
    }

    fn clear(&self) -> Result<(), ViewError> {
        let w = self.window();
        self.write(
            |src| (0..w.count).rev().try_for_each(|i| src.remove(w.offset + i).map(|_| ())),
            |_| ListDiff::Reset,
        )?;
        if !self.proj_helper.is_live() {
            *self.window.write().unwrap() = Window {
                offset: w.offset,
                count: 0,
            };
        }
        Ok(())
    }
}

impl<T> Activation for SliceList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn activate(&self) {
        let w = self.window();
        *self.window.write().unwrap() = w;
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
        crate::{buffer::vec::VecBuffer, error::ViewError, view::list::*},
        proptest::prelude::*,
    };

    #[test]
    fn window_follows_edits() {
        let buffer = VecBuffer::with_data(vec![0, 1, 2, 3, 4, 5]);
        let mid = buffer.to_list().slice(2, 2).unwrap();
        let (_sub, rx) = mid.queue();
        assert_eq!(mid.to_vec(), vec![2, 3]);

        buffer.insert(0, 9).unwrap();
        assert_eq!(mid.to_vec(), vec![2, 3]);

        buffer.insert(4, 7).unwrap();
        buffer.update(3, 20).unwrap();
        buffer.remove(6).unwrap();
        buffer.remove(4).unwrap();

        assert_eq!(mid.to_vec(), vec![20, 3]);
        assert_eq!(
            rx.drain(),
            vec![
                ListDiff::Insert { idx: 1, val: 7 },
                ListDiff::Update { idx: 0, old: Some(2), val: 20 },
                ListDiff::Remove { idx: 1, old: Some(7) },
            ]
        );
    }

    #[test]
    fn invalid_window_is_rejected() {
        let list = crate::buffer::generate::range(0, 4, 1);
        assert_eq!(
            list.slice(3, 2).err(),
            Some(ViewError::OutOfRange { idx: 5, len: 4 })
        );
        assert_eq!(list.slice(4, 0).unwrap().len(), 0);
        assert_eq!(
            list.slice(usize::MAX, 2).err(),
            Some(ViewError::OutOfRange { idx: usize::MAX, len: 4 })
        );
        assert_eq!(list.skip(1).to_vec(), vec![1, 2, 3]);
        assert_eq!(list.skip(9).len(), 0);
        assert_eq!(list.take(2).to_vec(), vec![0, 1]);
    }

    #[test]
    fn writes_go_through_the_window() {
        let buffer = VecBuffer::with_data(vec!['a', 'b', 'c', 'd']);
        let mid = buffer.to_list().slice(1, 2).unwrap();
        let (_sub, rx) = mid.queue();

        mid.push('x').unwrap();
        assert_eq!(mid.set(0, 'B'), Ok('b'));
        assert_eq!(mid.remove(1), Ok('c'));
        assert_eq!(buffer.to_vec(), vec!['a', 'B', 'x', 'd']);
        assert_eq!(mid.to_vec(), vec!['B', 'x']);
        assert_eq!(mid.insert(3, 'z'), Err(ViewError::OutOfRange { idx: 3, len: 2 }));

        mid.clear().unwrap();
        assert_eq!(buffer.to_vec(), vec!['a', 'd']);
        assert_eq!(mid.len(), 0);

        assert_eq!(
            rx.drain(),
            vec![
                ListDiff::Insert { idx: 2, val: 'x' },
                ListDiff::Update { idx: 0, old: Some('b'), val: 'B' },
                ListDiff::Remove { idx: 1, old: Some('c') },
                ListDiff::Remove { idx: 1, old: Some('x') },
                ListDiff::Remove { idx: 0, old: Some('B') },
            ]
        );
    }

    #[test]
    fn writes_through_a_filtered_source() {
        let buffer = VecBuffer::with_data(vec![2, 4, 6, 8]);
        let evens = buffer.to_list().filter(|x| x % 2 == 0);
        let head = evens.slice(0, 2).unwrap();
        let (_sub, rx) = head.queue();

        // the written element leaves the filter and so the window
        assert_eq!(head.set(0, 3), Ok(2));
        assert_eq!(evens.to_vec(), vec![4, 6, 8]);
        assert_eq!(head.to_vec(), vec![4]);
        assert_eq!(rx.drain(), vec![ListDiff::Remove { idx: 0, old: Some(2) }]);
    }

    #[test]
    fn unobserved_writes_move_the_window() {
        let buffer = VecBuffer::with_data(vec![1, 2, 3, 4]);
        let mid = buffer.to_list().slice(1, 2).unwrap();
        mid.insert(0, 9).unwrap();
        assert_eq!(mid.to_vec(), vec![9, 2, 3]);
        mid.clear().unwrap();
        assert_eq!(buffer.to_vec(), vec![1, 4]);
        assert_eq!(mid.len(), 0);
    }

    #[test]
    fn unobserved_slice_clamps() {
        let buffer = VecBuffer::with_data(vec![1, 2, 3, 4]);
        let tail = buffer.to_list().slice(2, 2).unwrap();
        buffer.truncate(3);
        assert_eq!(tail.to_vec(), vec![3]);
        buffer.clear();
        assert_eq!(tail.len(), 0);
    }

    proptest! {
        #[test]
        fn observed_slice_matches_window(
            init in proptest::collection::vec(any::<u8>(), 4..10),
            edits in proptest::collection::vec((0..3u8, any::<usize>(), any::<u8>()), 0..30),
        ) {
            let buffer = VecBuffer::with_data(init);
            let sliced = buffer.to_list().slice(1, 2).unwrap();
            let (_sub, rx) = sliced.queue();
            let mut mirror = sliced.to_vec();
            let (mut offset, mut count) = (1usize, 2usize);

            for (kind, i, v) in edits {
                let len = buffer.len();
                match kind {
                    0 => {
                        let i = i % (len + 1);
                        buffer.insert(i, v).unwrap();
                        if i < offset { offset += 1 } else if i <= offset + count { count += 1 }
                    }
                    1 if len > 0 => {
                        let i = i % len;
                        buffer.remove(i).unwrap();
                        if i < offset { offset -= 1 } else if i < offset + count { count -= 1 }
                    }
                    2 if len > 0 => { buffer.update(i % len, v).unwrap(); }
                    _ => {}
                }
                for d in rx.drain() {
                    match d {
                        ListDiff::Insert { idx, val } => mirror.insert(idx, val),
                        ListDiff::Remove { idx, .. } => { mirror.remove(idx); }
                        ListDiff::Update { idx, val, .. } => mirror[idx] = val,
                        ListDiff::Reset => mirror = sliced.to_vec(),
                    }
                }
                let fresh = buffer.to_vec()[offset..offset + count].to_vec();
                prop_assert_eq!(&mirror, &fresh);
                prop_assert_eq!(sliced.to_vec(), fresh);
            }
        }
    }
}
