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
    tracing::trace,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// Every `n`-th element, starting with the first.
    pub fn step(&self, n: usize) -> Result<OuterViewPort<dyn ListView<T>>, ViewError> {
        if n == 0 {
            return Err(ViewError::InvalidArgument("step must be positive"));
        }

        let port: ViewPort<dyn ListView<T>> = ViewPort::new();
        let cast = port.get_cast();

        let proj = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let src = proj_helper.new_list_arg((), self.clone(), |s: &StepList<T>, diff| {
                s.on_src_diff(diff)
            });
            StepList {
                src,
                n,
                cast,
                proj_helper,
            }
        });

        Ok(publish(port, &proj))
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct StepList<T>
where
    T: Clone + Send + Sync + 'static,
{
    src: Option<Arc<dyn ListView<T>>>,
    n: usize,
    cast: Arc<ObserverBroadcast<dyn ListView<T>>>,
    proj_helper: ProjectionHelper<(), Self>,
}

impl<T> StepList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn on_src_diff(&self, diff: &ListDiff<T>) {
        match diff {
            ListDiff::Update { idx, .. } if idx % self.n == 0 => {
                let d = diff.clone().reindex(|i| i / self.n);
                self.cast.notify(&d);
            }
            ListDiff::Update { idx, .. } => {
                trace!("step: update at {} is off-stride", idx);
            }
            // positions shift across the stride
            _ => self.cast.notify(&ListDiff::Reset),
        }
    }
}

impl<T> View for StepList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T> ListView<T> for StepList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.src.len().div_ceil(self.n)
    }

    fn get(&self, idx: &usize) -> Option<T> {
        self.src.get(&idx.checked_mul(self.n)?)
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

impl<T> MutableList<T> for StepList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn insert(&self, _idx: usize, _val: T) -> Result<(), ViewError> {
        Err(ViewError::Unsupported("strided view has a fixed shape"))
    }

    fn remove(&self, _idx: usize) -> Result<T, ViewError> {
        Err(ViewError::Unsupported("strided view has a fixed shape"))
    }

    fn set(&self, idx: usize, val: T) -> Result<T, ViewError> {
        ViewError::check_index(idx, self.len())?;
        let src = self
            .src
            .as_ref()
            .and_then(|s| s.as_mutable())
            .ok_or(ViewError::Unsupported("source is read-only"))?;
        src.set(idx * self.n, val)
    }

    fn clear(&self) -> Result<(), ViewError> {
        Err(ViewError::Unsupported("strided view has a fixed shape"))
    }
}

impl<T> Activation for StepList<T>
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
