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
    tracing::trace,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// Overlay this list on `background`: positions this list covers read from it,
    /// the ones past its end read from `background`.
    pub fn layer(
        &self,
        background: &OuterViewPort<dyn ListView<T>>,
    ) -> OuterViewPort<dyn ListView<T>> {
        let port: ViewPort<dyn ListView<T>> = ViewPort::new();
        let cast = port.get_cast();

        let proj = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let priority = proj_helper.new_list_arg(
                Layer::Priority,
                self.clone(),
                |l: &LayeredList<T>, diff| l.on_diff(Layer::Priority, diff),
            );
            let background = proj_helper.new_list_arg(
                Layer::Background,
                background.clone(),
                |l: &LayeredList<T>, diff| l.on_diff(Layer::Background, diff),
            );
            LayeredList {
                priority,
                background,
                cast,
                proj_helper,
            }
        });

        publish(port, &proj)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layer {
    Priority,
    Background,
}

pub struct LayeredList<T>
where
    T: Clone + Send + Sync + 'static,
{
    priority: Option<Arc<dyn ListView<T>>>,
    background: Option<Arc<dyn ListView<T>>>,
    cast: Arc<ObserverBroadcast<dyn ListView<T>>>,
    proj_helper: ProjectionHelper<Layer, Self>,
}

impl<T> LayeredList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn on_diff(&self, layer: Layer, diff: &ListDiff<T>) {
        match (layer, diff) {
            (Layer::Priority, ListDiff::Update { .. }) => self.cast.notify(diff),
            (Layer::Background, ListDiff::Update { idx, .. }) => {
                if *idx >= self.priority.len() {
                    self.cast.notify(diff);
                } else {
                    trace!("layered: background update at {} is shadowed", idx);
                }
            }
            // alignment between the layers moved
            _ => self.cast.notify(&ListDiff::Reset),
        }
    }
}

impl<T> View for LayeredList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T> ListView<T> for LayeredList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.priority.len().max(self.background.len())
    }

    fn get(&self, idx: &usize) -> Option<T> {
        if *idx < self.priority.len() {
            self.priority.get(idx)
        } else {
            self.background.get(idx)
        }
    }

    fn notifies(&self) -> bool {
        self.proj_helper.notifies()
    }

    fn revision(&self) -> u64 {
        self.proj_helper.revision()
    }
}

impl<T> Activation for LayeredList<T>
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
    fn priority_shadows_background() {
        let top = VecBuffer::with_data(vec!['x', 'y']);
        let bottom = VecBuffer::with_data(vec!['a', 'b', 'c', 'd']);
        let layered = top.to_list().layer(&bottom.to_list());
        let (_sub, rx) = layered.queue();

        assert_eq!(layered.to_vec(), vec!['x', 'y', 'c', 'd']);

        bottom.update(1, 'B').unwrap();
        bottom.update(3, 'D').unwrap();
        top.update(0, 'X').unwrap();
        assert_eq!(
            rx.drain(),
            vec![
                ListDiff::Update { idx: 3, old: Some('d'), val: 'D' },
                ListDiff::Update { idx: 0, old: Some('x'), val: 'X' },
            ]
        );

        top.push('z');
        assert_eq!(rx.drain(), vec![ListDiff::Reset]);
        assert_eq!(layered.to_vec(), vec!['X', 'y', 'z', 'D']);

        bottom.clear();
        assert_eq!(rx.drain(), vec![ListDiff::Reset]);
        assert_eq!(layered.to_vec(), vec!['X', 'y', 'z']);
    }
}
