                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                   View
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub trait View: Send + Sync {
    /// Notification message for the observers
    type Msg: Send + Sync;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, RwLock,
};

impl<V: View + ?Sized> View for RwLock<V> {
    type Msg = V::Msg;
}

impl<V: View + ?Sized> View for Arc<V> {
    type Msg = V::Msg;
}

impl<V: View> View for Option<V> {
    type Msg = V::Msg;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

static REVISION: AtomicU64 = AtomicU64::new(1);

/// Draw a fresh revision stamp.
///
/// Stamps are unique and strictly increasing across the whole process,
/// so the maximum over a set of sources grows whenever any of them changes.
pub fn next_revision() -> u64 {
    REVISION.fetch_add(1, Ordering::Relaxed)
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub mod any;
pub mod channel;
pub mod list;
pub mod observer;
pub mod port;

pub use {
    channel::{queue_channel, set_channel, singleton_channel, ChannelReceiver, ChannelSender},
    list::{ListDiff, ListView, ListViewExt, MutableList},
    observer::{
        Activation, Notifier, NotifyFnObserver, Observer, ObserverBroadcast, ObserverExt,
        Subscription,
    },
    port::{InnerViewPort, OuterViewPort, ViewPort},
};
