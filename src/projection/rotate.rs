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
    std::sync::Arc,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// The source read starting at position `k`, wrapping around at its end.
    pub fn rotate(&self, k: usize) -> OuterViewPort<dyn ListView<T>> {
        let port: ViewPort<dyn ListView<T>> = ViewPort::new();
        let cast = port.get_cast();

        let proj = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let src = proj_helper.new_list_arg((), self.clone(), |r: &RotateList<T>, diff| {
                r.on_src_diff(diff)
            });
            RotateList {
                src,
                k,
                cast,
                proj_helper,
            }
        });

        publish(port, &proj)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct RotateList<T>
where
    T: Clone + Send + Sync + 'static,
{
    src: Option<Arc<dyn ListView<T>>>,
    k: usize,
    cast: Arc<ObserverBroadcast<dyn ListView<T>>>,
    proj_helper: ProjectionHelper<(), Self>,
}

impl<T> RotateList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn to_src(&self, idx: usize, len: usize) -> usize {
        (idx + self.k % len) % len
    }

    fn from_src(&self, idx: usize, len: usize) -> usize {
        (idx + len - self.k % len) % len
    }

    fn on_src_diff(&self, diff: &ListDiff<T>) {
        match diff {
            ListDiff::Update { .. } => {
                let len = self.src.len();
                if len == 0 {
                    return;
                }
                let d = diff.clone().reindex(|i| self.from_src(i, len));
                self.cast.notify(&d);
            }
            // the length is the modulus
            _ => self.cast.notify(&ListDiff::Reset),
        }
    }
}

impl<T> View for RotateList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T> ListView<T> for RotateList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.src.len()
    }

    fn get(&self, idx: &usize) -> Option<T> {
        let len = self.src.len();
        if *idx < len {
            self.src.get(&self.to_src(*idx, len))
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

impl<T> MutableList<T> for RotateList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn insert(&self, _idx: usize, _val: T) -> Result<(), ViewError> {
        Err(ViewError::Unsupported("rotated view has a fixed shape"))
    }

    fn remove(&self, _idx: usize) -> Result<T, ViewError> {
        Err(ViewError::Unsupported("rotated view has a fixed shape"))
    }

    fn set(&self, idx: usize, val: T) -> Result<T, ViewError> {
        let len = self.src.len();
        ViewError::check_index(idx, len)?;
        let src = self
            .src
            .as_ref()
            .and_then(|s| s.as_mutable())
            .ok_or(ViewError::Unsupported("source is read-only"))?;
        src.set(self.to_src(idx, len), val)
    }

    fn clear(&self) -> Result<(), ViewError> {
        Err(ViewError::Unsupported("rotated view has a fixed shape"))
    }
}

impl<T> Activation for RotateList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn activate(&self) {
        self.proj_helper.activate();
    }

    fn deactivate(&self) {
        self.proj_helper.deactivate();
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use crate::{buffer::vec::VecBuffer, view::list::*};

    #[test]
    fn rotation_wraps() {
        let buffer = VecBuffer::with_data(vec![1, 2, 3, 4]);
        let rotated = buffer.to_list().rotate(5);
        let (_sub, rx) = rotated.queue();
        assert_eq!(rotated.to_vec(), vec![2, 3, 4, 1]);

        buffer.update(0, 10).unwrap();
        assert_eq!(rx.drain(), vec![ListDiff::Update { idx: 3, old: Some(1), val: 10 }]);

        buffer.push(5);
        assert_eq!(rx.drain(), vec![ListDiff::Reset]);
        // a full turn
        assert_eq!(rotated.to_vec(), vec![10, 2, 3, 4, 5]);

        buffer.clear();
        assert_eq!(rotated.len(), 0);
        assert_eq!(rotated.get(&0), None);
    }

    #[test]
    fn large_offsets_wrap() {
        let src = crate::buffer::generate::just(vec![1, 2, 3]);
        // usize::MAX is 0 mod 3
        assert_eq!(src.rotate(usize::MAX).to_vec(), vec![1, 2, 3]);
        assert_eq!(src.rotate(usize::MAX - 1).to_vec(), vec![3, 1, 2]);
    }

    #[test]
    fn set_writes_the_rotated_position() {
        let buffer = VecBuffer::with_data(vec!['a', 'b', 'c']);
        let rotated = buffer.to_list().rotate(1);
        let (_sub, rx) = rotated.queue();

        assert_eq!(rotated.set(2, 'A'), Ok('a'));
        assert_eq!(buffer.to_vec(), vec!['A', 'b', 'c']);
        assert_eq!(rx.drain(), vec![ListDiff::Update { idx: 2, old: Some('a'), val: 'A' }]);
        assert!(rotated.insert(0, 'x').is_err());
    }
}
