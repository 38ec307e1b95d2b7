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
    std::sync::{Arc, RwLock},
    tracing::debug,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// Longest prefix whose elements all satisfy `pred`.
    pub fn take_while<P: Fn(&T) -> bool + Send + Sync + 'static>(
        &self,
        pred: P,
    ) -> OuterViewPort<dyn ListView<T>> {
        WhileSlice::new(self, pred, Side::Prefix)
    }

    /// Everything after the longest prefix satisfying `pred`.
    pub fn skip_while<P: Fn(&T) -> bool + Send + Sync + 'static>(
        &self,
        pred: P,
    ) -> OuterViewPort<dyn ListView<T>> {
        WhileSlice::new(self, pred, Side::Suffix)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    /// elements before the boundary
    Prefix,
    /// elements from the boundary on
    Suffix,
}

struct Boundary {
    /// index of the first element failing the predicate, or the source length
    at: usize,
    synced: u64,
}

pub struct WhileSlice<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    src: Option<Arc<dyn ListView<T>>>,
    pred: P,
    side: Side,
    boundary: RwLock<Boundary>,
    cast: Arc<ObserverBroadcast<dyn ListView<T>>>,
    proj_helper: ProjectionHelper<(), Self>,
}

impl<T, P> WhileSlice<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn new(
        src_port: &OuterViewPort<dyn ListView<T>>,
        pred: P,
        side: Side,
    ) -> OuterViewPort<dyn ListView<T>> {
        let port: ViewPort<dyn ListView<T>> = ViewPort::new();
        let cast = port.get_cast();

        let proj = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let src = proj_helper.new_list_arg((), src_port.clone(), |s: &Self, diff| {
                s.on_src_diff(diff)
            });
            let synced = proj_helper.revision();
            let mut proj = WhileSlice {
                src,
                pred,
                side,
                boundary: RwLock::new(Boundary { at: 0, synced }),
                cast,
                proj_helper,
            };
            let at = proj.scan_from(0);
            proj.boundary.get_mut().unwrap().at = at;
            proj
        });

        publish(port, &proj)
    }

    /// First index at or after `from` whose element fails the predicate.
    fn scan_from(&self, from: usize) -> usize {
        let mut i = from;
        while let Some(x) = self.src.get(&i) {
            if !(self.pred)(&x) {
                break;
            }
            i += 1;
        }
        i
    }

    fn validate(&self) {
        if self.proj_helper.is_live() {
            return;
        }
        let rev = self.proj_helper.revision();
        if self.boundary.read().unwrap().synced == rev {
            return;
        }
        let at = self.scan_from(0);
        *self.boundary.write().unwrap() = Boundary { at, synced: rev };
    }

    fn boundary(&self) -> usize {
        self.validate();
        self.boundary.read().unwrap().at
    }

    /// The boundary must already be in place.
    fn reset(&self, reason: &str) -> Option<ListDiff<T>> {
        debug!("{:?} slice: reset ({})", self.side, reason);
        Some(ListDiff::Reset)
    }

    fn on_src_diff(&self, diff: &ListDiff<T>) {
        let out = {
            let mut boundary = self.boundary.write().unwrap();
            let out = self.translate(diff, &mut boundary.at);
            boundary.synced = self.proj_helper.revision();
            out
        };
        if let Some(out) = out {
            self.cast.notify(&out);
        }
    }

    fn translate(&self, diff: &ListDiff<T>, b: &mut usize) -> Option<ListDiff<T>> {
        let prefix = self.side == Side::Prefix;
        let pick = |p: Option<ListDiff<T>>, s: Option<ListDiff<T>>| if prefix { p } else { s };

        match diff {
            ListDiff::Insert { idx, val } => {
                let s = *idx;
                if s > *b {
                    return pick(None, Some(ListDiff::Insert { idx: s - *b, val: val.clone() }));
                }
                if (self.pred)(val) {
                    *b += 1;
                    return pick(Some(ListDiff::Insert { idx: s, val: val.clone() }), None);
                }
                // the new element ends the prefix
                let cut = *b - s;
                *b = s;
                match (prefix, cut) {
                    (true, 0) => None,
                    (true, 1) => Some(ListDiff::Remove {
                        idx: s,
                        old: self.old_at(s + 1),
                    }),
                    (false, 0) => Some(ListDiff::Insert { idx: 0, val: val.clone() }),
                    _ => self.reset("boundary moved by several elements"),
                }
            }

            ListDiff::Remove { idx, old } => {
                let s = *idx;
                if s > *b {
                    return pick(None, Some(ListDiff::Remove { idx: s - *b, old: old.clone() }));
                }
                if s < *b {
                    *b -= 1;
                    return pick(Some(ListDiff::Remove { idx: s, old: old.clone() }), None);
                }
                // the element ending the prefix is gone
                let nb = self.scan_from(s);
                let gained = nb - s;
                *b = nb;
                match (prefix, gained) {
                    (true, 0) => None,
                    (true, 1) => self.src.get(&s).map(|val| ListDiff::Insert { idx: s, val }),
                    (false, 0) => Some(ListDiff::Remove { idx: 0, old: old.clone() }),
                    _ => self.reset("boundary moved by several elements"),
                }
            }

            ListDiff::Update { idx, old, val } => {
                let s = *idx;
                if s > *b {
                    return pick(
                        None,
                        Some(ListDiff::Update {
                            idx: s - *b,
                            old: old.clone(),
                            val: val.clone(),
                        }),
                    );
                }
                let keeps = (self.pred)(val);
                if s < *b {
                    if keeps {
                        return pick(
                            Some(ListDiff::Update {
                                idx: s,
                                old: old.clone(),
                                val: val.clone(),
                            }),
                            None,
                        );
                    }
                    let cut = *b - s;
                    *b = s;
                    return match (prefix, cut) {
                        (true, 1) => Some(ListDiff::Remove { idx: s, old: old.clone() }),
                        (false, 1) => Some(ListDiff::Insert { idx: 0, val: val.clone() }),
                        _ => self.reset("boundary moved by several elements"),
                    };
                }
                // s == b
                if !keeps {
                    return pick(
                        None,
                        Some(ListDiff::Update {
                            idx: 0,
                            old: old.clone(),
                            val: val.clone(),
                        }),
                    );
                }
                let nb = self.scan_from(s + 1);
                let gained = nb - s;
                *b = nb;
                match (prefix, gained) {
                    (true, 1) => Some(ListDiff::Insert { idx: s, val: val.clone() }),
                    (false, 1) => Some(ListDiff::Remove { idx: 0, old: old.clone() }),
                    _ => self.reset("boundary moved by several elements"),
                }
            }

            ListDiff::Reset => {
                *b = self.scan_from(0);
                self.reset("source reset")
            }
        }
    }

    fn old_at(&self, idx: usize) -> Option<T> {
        if self.cast.wants_old_values() {
            self.src.get(&idx)
        } else {
            None
        }
    }
}

impl<T, P> View for WhileSlice<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T, P> ListView<T> for WhileSlice<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        let b = self.boundary();
        match self.side {
            Side::Prefix => b,
            Side::Suffix => self.src.len().saturating_sub(b),
        }
    }

    fn get(&self, idx: &usize) -> Option<T> {
        let b = self.boundary();
        match self.side {
            Side::Prefix if *idx < b => self.src.get(idx),
            Side::Prefix => None,
            Side::Suffix => self.src.get(&(b + idx)),
        }
    }

    fn notifies(&self) -> bool {
        self.proj_helper.notifies()
    }

    fn revision(&self) -> u64 {
        self.proj_helper.revision()
    }
}

impl<T, P> Activation for WhileSlice<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
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
