use {
    crate::view::{
        channel::{queue_channel, ChannelReceiver},
        Activation, Notifier, NotifyFnObserver, Observer, ObserverBroadcast, Subscription, View,
    },
    std::sync::{Arc, RwLock, Weak},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 View Port
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub struct ViewPort<V: View + ?Sized> {
    view: Arc<RwLock<Option<Arc<V>>>>,
    cast: Arc<ObserverBroadcast<V>>,
}

impl<V: View + ?Sized + 'static> ViewPort<V>
where
    V::Msg: Clone,
{
    pub fn new() -> Self {
        ViewPort {
            view: Arc::new(RwLock::new(None)),
            cast: Arc::new(ObserverBroadcast::new()),
        }
    }

    pub fn with_view(view: Arc<V>) -> Self {
        let port = ViewPort::new();
        port.set_view(Some(view));
        port
    }

    pub fn set_view(&self, view: Option<Arc<V>>) {
        *self.view.write().unwrap() = view;
    }

    pub fn get_cast(&self) -> Arc<ObserverBroadcast<V>> {
        self.cast.clone()
    }

    pub fn add_observer(&self, observer: Arc<dyn Observer<V>>) -> Subscription {
        self.cast.add_observer(observer)
    }

    pub fn inner(&self) -> InnerViewPort<V> {
        InnerViewPort(self.clone())
    }

    pub fn outer(&self) -> OuterViewPort<V> {
        OuterViewPort(self.clone())
    }

    pub fn into_inner(self) -> InnerViewPort<V> {
        InnerViewPort(self)
    }

    pub fn into_outer(self) -> OuterViewPort<V> {
        OuterViewPort(self)
    }
}

impl<V: View + ?Sized> Clone for ViewPort<V> {
    fn clone(&self) -> Self {
        ViewPort {
            view: self.view.clone(),
            cast: self.cast.clone(),
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Producer side of a port: installs the view and emits its messages.
pub struct InnerViewPort<V: View + ?Sized>(pub ViewPort<V>);

/// Consumer side of a port: reads the view and registers observers.
pub struct OuterViewPort<V: View + ?Sized>(pub ViewPort<V>);

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<V: View + ?Sized + 'static> InnerViewPort<V>
where
    V::Msg: Clone,
{
    pub fn get_broadcast(&self) -> Arc<ObserverBroadcast<V>> {
        self.0.cast.clone()
    }

    pub fn set_view(&self, view: Option<Arc<V>>) -> Arc<ObserverBroadcast<V>> {
        self.0.set_view(view);
        self.get_broadcast()
    }

    /// Let the broadcast switch `hook` on and off with its observer count.
    pub fn set_activation(&self, hook: Weak<dyn Activation>) {
        self.0.cast.set_activation(hook);
    }

    pub fn get_view(&self) -> Option<Arc<V>> {
        self.0.view.read().unwrap().clone()
    }

    pub fn notifier(&self) -> Notifier<V> {
        self.0.cast.notifier()
    }

    pub fn notify(&self, msg: &V::Msg) {
        self.0.cast.notify(msg);
    }
}

impl<V: View + ?Sized> Clone for InnerViewPort<V> {
    fn clone(&self) -> Self {
        InnerViewPort(self.0.clone())
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<V: View + ?Sized + 'static> OuterViewPort<V>
where
    V::Msg: Clone,
{
    pub fn get_view(&self) -> Option<Arc<V>> {
        self.0.view.read().unwrap().clone()
    }

    pub fn get_view_arc(&self) -> Arc<RwLock<Option<Arc<V>>>> {
        self.0.view.clone()
    }

    pub fn add_observer(&self, observer: Arc<dyn Observer<V>>) -> Subscription {
        self.0.add_observer(observer)
    }

    pub fn add_notify_fn<F: Fn(&V::Msg) + Send + Sync + 'static>(&self, notify: F) -> Subscription {
        self.add_observer(Arc::new(NotifyFnObserver::<V, F>::new(notify)))
    }

    /// Collect all further messages of this port into a queue.
    pub fn queue(&self) -> (Subscription, ChannelReceiver<Vec<V::Msg>>) {
        let (tx, rx) = queue_channel::<V::Msg>();
        (self.add_observer(Arc::new(tx)), rx)
    }

    pub fn observer_count(&self) -> usize {
        self.0.cast.observer_count()
    }

    /// Whether somebody downstream currently observes this port.
    pub fn is_observed(&self) -> bool {
        self.0.cast.is_observed()
    }
}

impl<V: View + ?Sized> Clone for OuterViewPort<V> {
    fn clone(&self) -> Self {
        OuterViewPort(self.0.clone())
    }
}

impl<V: View + ?Sized + 'static> Default for OuterViewPort<V>
where
    V::Msg: Clone,
{
    fn default() -> Self {
        ViewPort::new().into_outer()
    }
}
