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

type Inverse<SrcItem, DstItem> = Box<dyn Fn(&DstItem) -> SrcItem + Send + Sync>;

impl<Item: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<Item>> {
    pub fn map<DstItem, F>(&self, f: F) -> OuterViewPort<dyn ListView<DstItem>>
    where
        DstItem: Clone + Send + Sync + 'static,
        F: Fn(&Item) -> DstItem + Send + Sync + 'static,
    {
        self.map_list(f, None)
    }

    /// Like `map`, with writes translated back through `inv`.
    pub fn map_bidirectional<DstItem, F, G>(
        &self,
        f: F,
        inv: G,
    ) -> OuterViewPort<dyn ListView<DstItem>>
    where
        DstItem: Clone + Send + Sync + 'static,
        F: Fn(&Item) -> DstItem + Send + Sync + 'static,
        G: Fn(&DstItem) -> Item + Send + Sync + 'static,
    {
        self.map_list(f, Some(Box::new(inv)))
    }

    fn map_list<DstItem, F>(
        &self,
        f: F,
        inv: Option<Inverse<Item, DstItem>>,
    ) -> OuterViewPort<dyn ListView<DstItem>>
    where
        DstItem: Clone + Send + Sync + 'static,
        F: Fn(&Item) -> DstItem + Send + Sync + 'static,
    {
        let port: ViewPort<dyn ListView<DstItem>> = ViewPort::new();
        let cast = port.get_cast();

        let map = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let src_view =
                proj_helper.new_list_arg((), self.clone(), |m: &MapListItem<_, _, F>, diff| {
                    m.on_src_diff(diff)
                });
            MapListItem {
                src_view,
                f,
                inv,
                cast,
                proj_helper,
            }
        });

        publish(port, &map)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct MapListItem<SrcItem, DstItem, F>
where
    SrcItem: Clone + Send + Sync + 'static,
    DstItem: Clone + Send + Sync + 'static,
    F: Fn(&SrcItem) -> DstItem + Send + Sync + 'static,
{
    src_view: Option<Arc<dyn ListView<SrcItem>>>,
    f: F,
    inv: Option<Inverse<SrcItem, DstItem>>,
    cast: Arc<ObserverBroadcast<dyn ListView<DstItem>>>,
    proj_helper: ProjectionHelper<(), Self>,
}

impl<SrcItem, DstItem, F> MapListItem<SrcItem, DstItem, F>
where
    SrcItem: Clone + Send + Sync + 'static,
    DstItem: Clone + Send + Sync + 'static,
    F: Fn(&SrcItem) -> DstItem + Send + Sync + 'static,
{
    fn on_src_diff(&self, diff: &ListDiff<SrcItem>) {
        let notifier = self.cast.notifier();
        let with_old = notifier.wants_old_values();

        let forwarded = match diff {
            ListDiff::Update { idx, old, val } => ListDiff::Update {
                idx: *idx,
                old: old.as_ref().filter(|_| with_old).map(&self.f),
                val: (self.f)(val),
            },
            ListDiff::Remove { idx, old } => ListDiff::Remove {
                idx: *idx,
                old: old.as_ref().filter(|_| with_old).map(&self.f),
            },
            other => other.map(&self.f),
        };
        notifier.notify(&forwarded);
    }

    fn writable(
        &self,
    ) -> Result<(&dyn MutableList<SrcItem>, &Inverse<SrcItem, DstItem>), ViewError> {
        let inv = self
            .inv
            .as_ref()
            .ok_or(ViewError::Unsupported("map has no inverse"))?;
        let src = self
            .src_view
            .as_ref()
            .and_then(|s| s.as_mutable())
            .ok_or(ViewError::Unsupported("source is read-only"))?;
        Ok((src, inv))
    }
}

impl<SrcItem, DstItem, F> View for MapListItem<SrcItem, DstItem, F>
where
    SrcItem: Clone + Send + Sync + 'static,
    DstItem: Clone + Send + Sync + 'static,
    F: Fn(&SrcItem) -> DstItem + Send + Sync + 'static,
{
    type Msg = ListDiff<DstItem>;
}

impl<SrcItem, DstItem, F> ListView<DstItem> for MapListItem<SrcItem, DstItem, F>
where
    SrcItem: Clone + Send + Sync + 'static,
    DstItem: Clone + Send + Sync + 'static,
    F: Fn(&SrcItem) -> DstItem + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.src_view.len()
    }

    fn get(&self, idx: &usize) -> Option<DstItem> {
        self.src_view.get(idx).as_ref().map(|item| (self.f)(item))
    }

    fn notifies(&self) -> bool {
        self.proj_helper.notifies()
    }

    fn revision(&self) -> u64 {
        self.proj_helper.revision()
    }

    fn as_mutable(&self) -> Option<&dyn MutableList<DstItem>> {
        if self.inv.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

/// Writes land in the source; its message comes back through the listener.
impl<SrcItem, DstItem, F> MutableList<DstItem> for MapListItem<SrcItem, DstItem, F>
where
    SrcItem: Clone + Send + Sync + 'static,
    DstItem: Clone + Send + Sync + 'static,
    F: Fn(&SrcItem) -> DstItem + Send + Sync + 'static,
{
    fn insert(&self, idx: usize, val: DstItem) -> Result<(), ViewError> {
        let (src, inv) = self.writable()?;
        src.insert(idx, inv(&val))
    }

    fn remove(&self, idx: usize) -> Result<DstItem, ViewError> {
        let (src, _) = self.writable()?;
        src.remove(idx).map(|old| (self.f)(&old))
    }

    fn set(&self, idx: usize, val: DstItem) -> Result<DstItem, ViewError> {
        let (src, inv) = self.writable()?;
        src.set(idx, inv(&val)).map(|old| (self.f)(&old))
    }

    fn clear(&self) -> Result<(), ViewError> {
        let (src, _) = self.writable()?;
        src.clear()
    }
}

impl<SrcItem, DstItem, F> Activation for MapListItem<SrcItem, DstItem, F>
where
    SrcItem: Clone + Send + Sync + 'static,
    DstItem: Clone + Send + Sync + 'static,
    F: Fn(&SrcItem) -> DstItem + Send + Sync + 'static,
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
    use crate::{buffer::vec::VecBuffer, error::ViewError, view::list::*};

    #[test]
    fn map_list1() {
        let buffer = VecBuffer::<i32>::new();
        let target_port = buffer.to_list().map(|x| x + 10);

        buffer.push(0);
        buffer.push(7);
        buffer.push(9);

        assert_eq!(target_port.len(), 3);
        assert_eq!(target_port.get(&0), Some(10));
        assert_eq!(target_port.get(&1), Some(17));
        assert_eq!(target_port.get(&2), Some(19));
        assert_eq!(target_port.get(&3), None);
    }

    #[test]
    fn map_forwards_translated_messages() {
        let buffer = VecBuffer::with_data(vec![1, 2]);
        let target_port = buffer.to_list().map(|x: &i32| x.to_string());
        let (_sub, rx) = target_port.queue();

        buffer.push(3);
        buffer.update(0, 5).unwrap();
        buffer.remove(1).unwrap();
        buffer.clear();

        assert_eq!(
            rx.drain(),
            vec![
                ListDiff::Insert { idx: 2, val: "3".to_string() },
                ListDiff::Update { idx: 0, old: Some("1".to_string()), val: "5".to_string() },
                ListDiff::Remove { idx: 1, old: Some("2".to_string()) },
                ListDiff::Reset,
            ]
        );
    }

    #[test]
    fn bidirectional_map_writes_through() {
        let buffer = VecBuffer::with_data(vec![1, 2, 3]);
        let doubled = buffer.to_list().map_bidirectional(|x| x * 2, |y| y / 2);
        let (_sub, rx) = doubled.queue();

        assert_eq!(doubled.set(1, 10), Ok(4));
        doubled.insert(0, 20).unwrap();
        assert_eq!(buffer.to_vec(), vec![10, 1, 5, 3]);
        assert_eq!(doubled.to_vec(), vec![20, 2, 10, 6]);
        assert_eq!(
            rx.drain(),
            vec![
                ListDiff::Update { idx: 1, old: Some(4), val: 10 },
                ListDiff::Insert { idx: 0, val: 20 },
            ]
        );

        let plain = buffer.to_list().map(|x| x * 2);
        assert_eq!(plain.set(0, 2), Err(ViewError::Unsupported("view is read-only")));
    }
}
