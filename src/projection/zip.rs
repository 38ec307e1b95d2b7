use {
    crate::{
        projection::{
            projection_helper::{demand_of, ProjectionHelper},
            publish,
        },
        view::{
            list::{ListDiff, ListView},
            Activation, ObserverBroadcast, OuterViewPort, View, ViewPort,
        },
    },
    std::sync::Arc,
    tracing::{debug, trace},
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<A: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<A>> {
    /// Pairwise combination with `other`, as long as the shorter list.
    pub fn zip<B, R, F>(
        &self,
        other: &OuterViewPort<dyn ListView<B>>,
        f: F,
    ) -> OuterViewPort<dyn ListView<R>>
    where
        B: Clone + Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
        F: Fn(&A, &B) -> R + Send + Sync + 'static,
    {
        let port: ViewPort<dyn ListView<R>> = ViewPort::new();
        let cast = port.get_cast();

        let proj = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let a = proj_helper.new_list_arg(Side::A, self.clone(), |z: &Zip2<A, B, R, F>, diff| {
                z.on_diff(diff.map(|x| Pick::A(x.clone())))
            });
            let b = proj_helper.new_list_arg(Side::B, other.clone(), |z: &Zip2<A, B, R, F>, diff| {
                z.on_diff(diff.map(|x| Pick::B(x.clone())))
            });
            Zip2 {
                a,
                b,
                f,
                cast,
                proj_helper,
            }
        });

        publish(port, &proj)
    }

    pub fn zip3<B, C, R, F>(
        &self,
        b: &OuterViewPort<dyn ListView<B>>,
        c: &OuterViewPort<dyn ListView<C>>,
        f: F,
    ) -> OuterViewPort<dyn ListView<R>>
    where
        B: Clone + Send + Sync + 'static,
        C: Clone + Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
        F: Fn(&A, &B, &C) -> R + Send + Sync + 'static,
    {
        self.zip(b, |x, y| (x.clone(), y.clone()))
            .zip(c, move |(x, y), z| f(x, y, z))
    }

    /// Combine this list with each of `rest` position by position.
    /// `f` sees the co-indexed elements in port order.
    pub fn zip_all<R, F>(
        &self,
        rest: impl IntoIterator<Item = OuterViewPort<dyn ListView<A>>>,
        f: F,
    ) -> OuterViewPort<dyn ListView<R>>
    where
        R: Clone + Send + Sync + 'static,
        F: Fn(&[A]) -> R + Send + Sync + 'static,
    {
        let ports: Vec<_> = std::iter::once(self.clone()).chain(rest).collect();

        let port: ViewPort<dyn ListView<R>> = ViewPort::new();
        let cast = port.get_cast();

        let proj = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let srcs = ports
                .into_iter()
                .enumerate()
                .map(|(k, port)| {
                    proj_helper.new_list_arg(k, port, move |z: &ZipN<A, R, F>, diff| {
                        z.on_diff(k, diff)
                    })
                })
                .collect();
            ZipN {
                srcs,
                f,
                cast,
                proj_helper,
            }
        });

        publish(port, &proj)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    A,
    B,
}

/// An item from one of the two sides.
#[derive(Clone)]
enum Pick<A, B> {
    A(A),
    B(B),
}

pub struct Zip2<A, B, R, F>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&A, &B) -> R + Send + Sync + 'static,
{
    a: Option<Arc<dyn ListView<A>>>,
    b: Option<Arc<dyn ListView<B>>>,
    f: F,
    cast: Arc<ObserverBroadcast<dyn ListView<R>>>,
    proj_helper: ProjectionHelper<Side, Self>,
}

impl<A, B, R, F> Zip2<A, B, R, F>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&A, &B) -> R + Send + Sync + 'static,
{
    fn on_diff(&self, diff: ListDiff<Pick<A, B>>) {
        let (idx, old) = match diff {
            ListDiff::Update { idx, old, .. } => (idx, old),
            _ => {
                self.cast.notify(&ListDiff::Reset);
                return;
            }
        };
        if idx >= self.len() {
            trace!("zip: update at {} is past the shorter side", idx);
            return;
        }

        let (a, b) = match (self.a.get(&idx), self.b.get(&idx)) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                debug!("zip: reset (no co-indexed item at {})", idx);
                self.cast.notify(&ListDiff::Reset);
                return;
            }
        };

        let old = old.filter(|_| self.cast.wants_old_values()).map(|old| match old {
            Pick::A(old_a) => (self.f)(&old_a, &b),
            Pick::B(old_b) => (self.f)(&a, &old_b),
        });
        self.cast.notify(&ListDiff::Update {
            idx,
            old,
            val: (self.f)(&a, &b),
        });
    }
}

impl<A, B, R, F> View for Zip2<A, B, R, F>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&A, &B) -> R + Send + Sync + 'static,
{
    type Msg = ListDiff<R>;
}

impl<A, B, R, F> ListView<R> for Zip2<A, B, R, F>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&A, &B) -> R + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.a.len().min(self.b.len())
    }

    fn get(&self, idx: &usize) -> Option<R> {
        Some((self.f)(&self.a.get(idx)?, &self.b.get(idx)?))
    }

    fn notifies(&self) -> bool {
        self.proj_helper.notifies()
    }

    fn revision(&self) -> u64 {
        self.proj_helper.revision()
    }
}

impl<A, B, R, F> Activation for Zip2<A, B, R, F>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&A, &B) -> R + Send + Sync + 'static,
{
    fn activate(&self) {
        self.proj_helper.activate();
    }

    fn deactivate(&self) {
        self.proj_helper.deactivate();
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct ZipN<T, R, F>
where
    T: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&[T]) -> R + Send + Sync + 'static,
{
    srcs: Vec<Option<Arc<dyn ListView<T>>>>,
    f: F,
    cast: Arc<ObserverBroadcast<dyn ListView<R>>>,
    proj_helper: ProjectionHelper<usize, Self>,
}

impl<T, R, F> ZipN<T, R, F>
where
    T: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&[T]) -> R + Send + Sync + 'static,
{
    fn row(&self, idx: usize) -> Option<Vec<T>> {
        self.srcs.iter().map(|s| s.get(&idx)).collect()
    }

    fn on_diff(&self, k: usize, diff: &ListDiff<T>) {
        let (idx, old) = match diff {
            ListDiff::Update { idx, old, .. } => (*idx, old),
            _ => {
                self.cast.notify(&ListDiff::Reset);
                return;
            }
        };
        if idx >= self.len() {
            trace!("zip: update at {} is past the shortest source", idx);
            return;
        }

        let mut row = match self.row(idx) {
            Some(row) => row,
            None => {
                debug!("zip: reset (no co-indexed item at {})", idx);
                self.cast.notify(&ListDiff::Reset);
                return;
            }
        };

        let val = (self.f)(&row);
        let old = match old {
            Some(old) if self.cast.wants_old_values() => {
                row[k] = old.clone();
                Some((self.f)(&row))
            }
            _ => None,
        };
        self.cast.notify(&ListDiff::Update { idx, old, val });
    }
}

impl<T, R, F> View for ZipN<T, R, F>
where
    T: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&[T]) -> R + Send + Sync + 'static,
{
    type Msg = ListDiff<R>;
}

impl<T, R, F> ListView<R> for ZipN<T, R, F>
where
    T: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&[T]) -> R + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.srcs.iter().map(|s| s.len()).min().unwrap_or(0)
    }

    fn get(&self, idx: &usize) -> Option<R> {
        let row = self.row(*idx)?;
        Some((self.f)(&row))
    }

    fn notifies(&self) -> bool {
        self.proj_helper.notifies()
    }

    fn revision(&self) -> u64 {
        self.proj_helper.revision()
    }
}

impl<T, R, F> Activation for ZipN<T, R, F>
where
    T: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&[T]) -> R + Send + Sync + 'static,
{
    fn activate(&self) {
        self.proj_helper.activate();
    }

    fn deactivate(&self) {
        self.proj_helper.deactivate();
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
