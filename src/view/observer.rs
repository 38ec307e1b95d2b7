use {
    crate::view::View,
    std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock, Weak,
    },
    tracing::debug,
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Observer
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub trait Observer<V: View + ?Sized>: Send + Sync {
    fn notify(&self, msg: &V::Msg);

    /// Whether this observer needs the previous value
    /// of removed and replaced elements.
    fn wants_old_values(&self) -> bool {
        true
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<V: View + ?Sized, O: Observer<V> + ?Sized> Observer<V> for Arc<O> {
    fn notify(&self, msg: &V::Msg) {
        (**self).notify(msg);
    }

    fn wants_old_values(&self) -> bool {
        (**self).wants_old_values()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub trait ObserverExt<V: View + ?Sized>: Observer<V> {
    fn notify_each(&self, it: impl IntoIterator<Item = V::Msg>);
}

impl<V: View + ?Sized, T: Observer<V>> ObserverExt<V> for T {
    fn notify_each(&self, it: impl IntoIterator<Item = V::Msg>) {
        for msg in it {
            self.notify(&msg);
        }
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                Activation
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
/// Hook of a derived view, toggled by its broadcast when the
/// number of observers changes between zero and non-zero.
pub trait Activation: Send + Sync {
    fn activate(&self);
    fn deactivate(&self);
}

trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: usize);
}

/// Handle of a registered observer.
/// Dropping it removes the observer from the broadcast.
#[must_use = "dropping a subscription unsubscribes the observer"]
pub struct Subscription {
    id: usize,
    cast: Option<Weak<dyn Unsubscribe>>,
}

impl Subscription {
    pub fn cancel(&mut self) {
        if let Some(cast) = self.cast.take().and_then(|c| c.upgrade()) {
            cast.unsubscribe(self.id);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cast.is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Broadcast
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub struct ObserverBroadcast<V: View + ?Sized> {
    observers: RwLock<Vec<(usize, Arc<dyn Observer<V>>)>>,
    next_id: AtomicUsize,
    activation: RwLock<Option<Weak<dyn Activation>>>,
}

impl<V: View + ?Sized + 'static> ObserverBroadcast<V> {
    pub fn new() -> Self {
        ObserverBroadcast {
            observers: RwLock::new(Vec::new()),
            next_id: AtomicUsize::new(0),
            activation: RwLock::new(None),
        }
    }

    /// Install the hook of the view this broadcast belongs to.
    pub fn set_activation(&self, hook: Weak<dyn Activation>) {
        *self.activation.write().unwrap() = Some(hook);
        if self.is_observed() {
            self.toggle_activation(true);
        }
    }

    pub fn add_observer(self: &Arc<Self>, obs: Arc<dyn Observer<V>>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let first = {
            let mut observers = self.observers.write().unwrap();
            observers.push((id, obs));
            observers.len() == 1
        };

        if first {
            self.toggle_activation(true);
        }

        let cast: Weak<dyn Unsubscribe> = Arc::downgrade(self) as Weak<dyn Unsubscribe>;
        Subscription {
            id,
            cast: Some(cast),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().unwrap().len()
    }

    pub fn is_observed(&self) -> bool {
        self.observer_count() > 0
    }

    pub fn wants_old_values(&self) -> bool {
        self.observers
            .read()
            .unwrap()
            .iter()
            .any(|(_, o)| o.wants_old_values())
    }

    /// Snapshot of the current observers, used to deliver one message.
    pub fn notifier(&self) -> Notifier<V> {
        Notifier {
            observers: self
                .observers
                .read()
                .unwrap()
                .iter()
                .map(|(_, o)| o.clone())
                .collect(),
        }
    }

    pub fn notify(&self, msg: &V::Msg) {
        self.notifier().notify(msg);
    }

    fn toggle_activation(&self, active: bool) {
        let hook = self.activation.read().unwrap().as_ref().and_then(|h| h.upgrade());
        if let Some(hook) = hook {
            if active {
                debug!("activating view");
                hook.activate();
            } else {
                debug!("deactivating view");
                hook.deactivate();
            }
        }
    }
}

impl<V: View + ?Sized + 'static> Default for ObserverBroadcast<V> {
    fn default() -> Self {
        ObserverBroadcast::new()
    }
}

impl<V: View + ?Sized + 'static> Unsubscribe for ObserverBroadcast<V> {
    fn unsubscribe(&self, id: usize) {
        let last = {
            let mut observers = self.observers.write().unwrap();
            let before = observers.len();
            observers.retain(|(i, _)| *i != id);
            before > 0 && observers.is_empty()
        };

        if last {
            self.toggle_activation(false);
        }
    }
}

impl<V: View + ?Sized + 'static> Observer<V> for ObserverBroadcast<V> {
    fn notify(&self, msg: &V::Msg) {
        ObserverBroadcast::notify(self, msg);
    }

    fn wants_old_values(&self) -> bool {
        ObserverBroadcast::wants_old_values(self)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Delivers messages to the observers registered at the time it was created.
/// No lock is held while the observers run, so they are free to read
/// (or subscribe to) any view.
pub struct Notifier<V: View + ?Sized> {
    observers: Vec<Arc<dyn Observer<V>>>,
}

impl<V: View + ?Sized> Notifier<V> {
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn wants_old_values(&self) -> bool {
        self.observers.iter().any(|o| o.wants_old_values())
    }

    pub fn notify(&self, msg: &V::Msg) {
        for o in self.observers.iter() {
            o.notify(msg);
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct NotifyFnObserver<V, F>
where
    V: View + ?Sized,
    F: Fn(&V::Msg) + Send + Sync,
{
    f: F,
    wants_old_values: bool,
    _phantom: std::marker::PhantomData<fn(&V)>,
}

impl<V, F> NotifyFnObserver<V, F>
where
    V: View + ?Sized,
    F: Fn(&V::Msg) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        NotifyFnObserver {
            f,
            wants_old_values: true,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Observer that does not need previous values of changed elements.
    pub fn without_old_values(f: F) -> Self {
        NotifyFnObserver {
            f,
            wants_old_values: false,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<V, F> Observer<V> for NotifyFnObserver<V, F>
where
    V: View + ?Sized,
    F: Fn(&V::Msg) + Send + Sync,
{
    fn notify(&self, msg: &V::Msg) {
        (self.f)(msg);
    }

    fn wants_old_values(&self) -> bool {
        self.wants_old_values
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
