pub mod projection_helper;

pub mod concat;
pub mod filter;
pub mod indirect;
pub mod layered;
pub mod map;
pub mod permutation;
pub mod rotate;
pub mod select;
pub mod shuffle;
pub mod slice;
pub mod sort;
pub mod step;
pub mod take_while;
pub mod vec2list;
pub mod zip;

use {
    crate::view::{list::ListView, Activation, OuterViewPort, ViewPort},
    std::sync::{Arc, Weak},
};

/// Install `proj` as the view of `port` and let the port's
/// observer count switch its listeners on and off.
pub(crate) fn publish<T, P>(
    port: ViewPort<dyn ListView<T>>,
    proj: &Arc<P>,
) -> OuterViewPort<dyn ListView<T>>
where
    T: Clone + Send + Sync + 'static,
    P: ListView<T> + Activation + 'static,
{
    port.set_view(Some(proj.clone() as Arc<dyn ListView<T>>));
    port.inner()
        .set_activation(Arc::downgrade(proj) as Weak<dyn Activation>);
    port.into_outer()
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
