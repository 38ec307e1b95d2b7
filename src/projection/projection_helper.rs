use {
    crate::view::{
        list::{ListDiff, ListView},
        Observer, ObserverBroadcast, OuterViewPort, Subscription, View,
    },
    std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, RwLock, Weak,
    },
    tracing::trace,
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Lets a source listener ask whether the projection's own
/// observers need old values, without knowing the projection's item type.
pub trait OldValueDemand: Send + Sync {
    fn wants_old_values(&self) -> bool;
}

impl<V: View + ?Sized + 'static> OldValueDemand for ObserverBroadcast<V> {
    fn wants_old_values(&self) -> bool {
        ObserverBroadcast::wants_old_values(self)
    }
}

pub fn demand_of<V: View + ?Sized + 'static>(
    cast: &Arc<ObserverBroadcast<V>>,
) -> Weak<dyn OldValueDemand> {
    Arc::downgrade(cast) as Weak<dyn OldValueDemand>
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Keeps the source listeners of one projection and switches
/// them on and off together.
pub struct ProjectionHelper<ArgKey, P>
where
    ArgKey: Clone + PartialEq + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    args: RwLock<Vec<(ArgKey, Arc<dyn ArgHandle>)>>,
    proj: Weak<P>,
    demand: Weak<dyn OldValueDemand>,
    active: AtomicBool,
}

impl<ArgKey, P> ProjectionHelper<ArgKey, P>
where
    ArgKey: Clone + PartialEq + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    pub fn new(proj: Weak<P>, demand: Weak<dyn OldValueDemand>) -> Self {
        ProjectionHelper {
            args: RwLock::new(Vec::new()),
            proj,
            demand,
            active: AtomicBool::new(false),
        }
    }

    /// Listen to `port`; every message is handed to `notify` together with the projection.
    /// An existing argument with the same key is replaced.
    pub fn new_list_arg<T: Clone + Send + Sync + 'static>(
        &self,
        arg_key: ArgKey,
        port: OuterViewPort<dyn ListView<T>>,
        notify: impl Fn(&P, &ListDiff<T>) + Send + Sync + 'static,
    ) -> Option<Arc<dyn ListView<T>>> {
        self.remove_arg(&arg_key);

        let view = port.get_view();
        let arg = Arc::new(ProjectionArg {
            observer: Arc::new(ArgObserver {
                notify: Box::new(notify),
                proj: self.proj.clone(),
                demand: self.demand.clone(),
                paused: AtomicUsize::new(0),
                held: Mutex::new(Vec::new()),
            }),
            src: port,
            subscription: Mutex::new(None),
        });

        if self.is_active() {
            arg.activate();
        }
        self.args.write().unwrap().push((arg_key, arg));

        view
    }

    pub fn remove_arg(&self, arg_key: &ArgKey) {
        let removed: Vec<_> = {
            let mut args = self.args.write().unwrap();
            let (removed, kept) = args.drain(..).partition(|(k, _)| k == arg_key);
            *args = kept;
            removed
        };
        for (_, arg) in removed {
            arg.deactivate();
        }
    }

    pub fn clear_args(&self) {
        let removed: Vec<_> = self.args.write().unwrap().drain(..).collect();
        for (_, arg) in removed {
            arg.deactivate();
        }
    }

    fn handles(&self) -> Vec<Arc<dyn ArgHandle>> {
        self.args.read().unwrap().iter().map(|(_, a)| a.clone()).collect()
    }

    pub fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
        for arg in self.handles() {
            arg.activate();
        }
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        for arg in self.handles() {
            arg.deactivate();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Every source is notifying and currently listened to,
    /// so the projection's state is kept up to date by messages.
    pub fn is_live(&self) -> bool {
        self.is_active() && self.handles().iter().all(|a| a.is_listening())
    }

    /// Whether any source will ever notify.
    pub fn notifies(&self) -> bool {
        self.handles().iter().any(|a| a.notifies())
    }

    pub fn revision(&self) -> u64 {
        self.handles().iter().map(|a| a.revision()).max().unwrap_or(0)
    }

    /// Hold back source messages until the guard is released.
    /// Held messages are delivered in order on release.
    pub fn pause(&self) -> PauseGuard {
        let handles = self.handles();
        for arg in handles.iter() {
            arg.pause();
        }
        PauseGuard { handles }
    }
}

impl<ArgKey, P> Drop for ProjectionHelper<ArgKey, P>
where
    ArgKey: Clone + PartialEq + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.clear_args();
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Scoped hold on source messages. Released on drop.
#[must_use = "the listeners resume as soon as the guard is dropped"]
pub struct PauseGuard {
    handles: Vec<Arc<dyn ArgHandle>>,
}

impl PauseGuard {
    /// Release the listeners and deliver what they held back.
    pub fn resume(&mut self) {
        for arg in self.handles.drain(..) {
            arg.resume();
        }
    }

    /// Release the listeners, dropping what they held back.
    pub fn discard(&mut self) {
        for arg in self.handles.drain(..) {
            arg.discard();
            arg.resume();
        }
    }
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        self.resume();
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

trait ArgHandle: Send + Sync {
    fn activate(&self);
    fn deactivate(&self);
    fn is_listening(&self) -> bool;
    fn notifies(&self) -> bool;
    fn revision(&self) -> u64;
    fn pause(&self);
    fn resume(&self);
    fn discard(&self);
}

/// Listener on one source of a projection.
/// Inert when the source never notifies.
struct ProjectionArg<P, T>
where
    P: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    src: OuterViewPort<dyn ListView<T>>,
    observer: Arc<ArgObserver<P, T>>,
    subscription: Mutex<Option<Subscription>>,
}

impl<P, T> ArgHandle for ProjectionArg<P, T>
where
    P: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn activate(&self) {
        if !self.notifies() {
            return;
        }
        let mut sub = self.subscription.lock().unwrap();
        if sub.is_none() {
            *sub = Some(self.src.add_observer(self.observer.clone()));
        }
    }

    fn deactivate(&self) {
        // take it out first, cancelling may deactivate the source in turn
        let sub = self.subscription.lock().unwrap().take();
        drop(sub);
    }

    fn is_listening(&self) -> bool {
        self.subscription.lock().unwrap().is_some()
    }

    fn notifies(&self) -> bool {
        self.src.notifies()
    }

    fn revision(&self) -> u64 {
        self.src.revision()
    }

    fn pause(&self) {
        self.observer.paused.fetch_add(1, Ordering::SeqCst);
    }

    fn resume(&self) {
        if self.observer.paused.fetch_sub(1, Ordering::SeqCst) == 1 {
            let held = std::mem::take(&mut *self.observer.held.lock().unwrap());
            for msg in held.iter() {
                self.observer.deliver(msg);
            }
        }
    }

    fn discard(&self) {
        self.observer.held.lock().unwrap().clear();
    }
}

struct ArgObserver<P, T>
where
    P: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    notify: Box<dyn Fn(&P, &ListDiff<T>) + Send + Sync + 'static>,
    proj: Weak<P>,
    demand: Weak<dyn OldValueDemand>,
    paused: AtomicUsize,
    /// messages that arrived while paused
    held: Mutex<Vec<ListDiff<T>>>,
}

impl<P, T> ArgObserver<P, T>
where
    P: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn deliver(&self, msg: &ListDiff<T>) {
        if let Some(p) = self.proj.upgrade() {
            (self.notify)(&p, msg);
        }
    }
}

impl<P, T> Observer<dyn ListView<T>> for ArgObserver<P, T>
where
    P: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn notify(&self, msg: &ListDiff<T>) {
        if self.paused.load(Ordering::SeqCst) > 0 {
            trace!("listener paused, holding message");
            self.held.lock().unwrap().push(msg.clone());
            return;
        }
        self.deliver(msg);
    }

    fn wants_old_values(&self) -> bool {
        self.demand
            .upgrade()
            .map(|d| d.wants_old_values())
            .unwrap_or(false)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::vec::VecBuffer;
    use std::sync::atomic::AtomicUsize;

    struct Counting {
        seen: AtomicUsize,
        cast: Arc<ObserverBroadcast<dyn ListView<u8>>>,
        proj_helper: ProjectionHelper<(), Counting>,
    }

    fn counting(port: OuterViewPort<dyn ListView<u8>>) -> Arc<Counting> {
        let cast = Arc::new(ObserverBroadcast::new());
        Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            proj_helper.new_list_arg((), port, |c: &Counting, _| {
                c.seen.fetch_add(1, Ordering::SeqCst);
            });
            Counting {
                seen: AtomicUsize::new(0),
                cast,
                proj_helper,
            }
        })
    }

    #[test]
    fn listener_lifecycle() {
        let buf = VecBuffer::<u8>::new();
        let list = buf.to_list();
        let c = counting(list.clone());

        buf.push(1);
        assert_eq!(c.seen.load(Ordering::SeqCst), 0);
        assert!(!c.proj_helper.is_live());

        c.proj_helper.activate();
        assert!(c.proj_helper.is_live());
        assert!(list.is_observed());
        buf.push(2);
        assert_eq!(c.seen.load(Ordering::SeqCst), 1);

        {
            let _outer = c.proj_helper.pause();
            {
                let _inner = c.proj_helper.pause();
                buf.push(3);
            }
            buf.push(4);
            assert_eq!(c.seen.load(Ordering::SeqCst), 1);
        }
        // held back, then delivered on release
        assert_eq!(c.seen.load(Ordering::SeqCst), 3);

        let mut guard = c.proj_helper.pause();
        guard.resume();
        guard.resume();
        drop(guard);
        buf.push(5);
        assert_eq!(c.seen.load(Ordering::SeqCst), 4);

        let mut guard = c.proj_helper.pause();
        buf.push(6);
        guard.discard();
        assert_eq!(c.seen.load(Ordering::SeqCst), 4);

        c.proj_helper.deactivate();
        assert!(!list.is_observed());
        buf.push(7);
        assert_eq!(c.seen.load(Ordering::SeqCst), 4);
        assert!(c.cast.notifier().is_empty());
    }

    #[test]
    fn inert_listener_on_static_source() {
        let c = counting(crate::buffer::generate::just(vec![1u8, 2]));
        c.proj_helper.activate();
        assert!(!c.proj_helper.notifies());
        assert!(!c.proj_helper.is_live());
        let _guard = c.proj_helper.pause();
        c.proj_helper.deactivate();
    }
}
