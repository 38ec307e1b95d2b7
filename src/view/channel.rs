use {
    crate::view::{Observer, View},
    async_std::stream::Stream,
    core::{
        pin::Pin,
        task::{Context, Poll, Waker},
    },
    std::{
        collections::HashSet,
        hash::Hash,
        sync::{Arc, Mutex},
    },
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                  Traits
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub trait ChannelData: Default + IntoIterator + Send + Sync {
    fn channel_insert(&mut self, x: Self::Item);
}

/// every message is kept, in order
impl<T> ChannelData for Vec<T>
where
    T: Send + Sync,
{
    fn channel_insert(&mut self, x: T) {
        self.push(x);
    }
}

/// duplicate messages collapse
impl<T> ChannelData for HashSet<T>
where
    T: Eq + Hash + Send + Sync,
{
    fn channel_insert(&mut self, x: T) {
        self.insert(x);
    }
}

/// only the latest message survives
impl<T> ChannelData for Option<T>
where
    T: Send + Sync,
{
    fn channel_insert(&mut self, x: T) {
        *self = Some(x);
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                  Channel
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
struct ChannelState<Data: ChannelData> {
    send_buf: Option<Data>,
    recv_iter: Option<Data::IntoIter>,
    num_senders: usize,
    waker: Option<Waker>,
}

impl<Data: ChannelData> ChannelState<Data> {
    fn wake(&mut self) {
        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
    }
}

pub struct ChannelSender<Data: ChannelData>(Arc<Mutex<ChannelState<Data>>>);
pub struct ChannelReceiver<Data: ChannelData>(Arc<Mutex<ChannelState<Data>>>);

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<Data: ChannelData> ChannelSender<Data> {
    pub fn send(&self, msg: Data::Item) {
        let mut state = self.0.lock().unwrap();
        state
            .send_buf
            .get_or_insert_with(Data::default)
            .channel_insert(msg);
        state.wake();
    }
}

/// A sender can be registered directly as observer of a port.
impl<V: View + ?Sized, Data: ChannelData<Item = V::Msg>> Observer<V> for ChannelSender<Data>
where
    V::Msg: Clone,
    Data::IntoIter: Send + Sync,
{
    fn notify(&self, msg: &V::Msg) {
        self.send(msg.clone());
    }
}

impl<Data: ChannelData> Clone for ChannelSender<Data> {
    fn clone(&self) -> Self {
        self.0.lock().unwrap().num_senders += 1;
        ChannelSender(self.0.clone())
    }
}

impl<Data: ChannelData> Drop for ChannelSender<Data> {
    fn drop(&mut self) {
        let mut state = self.0.lock().unwrap();
        state.num_senders -= 1;
        state.wake();
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<Data: ChannelData> ChannelReceiver<Data> {
    pub async fn recv(&self) -> Option<Data> {
        ChannelRead(self.0.clone()).await
    }

    /// Take everything sent since the last receive, without waiting.
    pub fn try_recv(&self) -> Option<Data> {
        self.0.lock().unwrap().send_buf.take()
    }

    pub fn is_closed(&self) -> bool {
        self.0.lock().unwrap().num_senders == 0
    }
}

impl<T: Send + Sync> ChannelReceiver<Vec<T>> {
    /// Take all queued messages, possibly none.
    pub fn drain(&self) -> Vec<T> {
        self.try_recv().unwrap_or_default()
    }
}

struct ChannelRead<Data: ChannelData>(Arc<Mutex<ChannelState<Data>>>);

impl<Data: ChannelData> std::future::Future for ChannelRead<Data> {
    type Output = Option<Data>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        let mut state = self.0.lock().unwrap();
        if let Some(buf) = state.send_buf.take() {
            Poll::Ready(Some(buf))
        } else if state.num_senders == 0 {
            Poll::Ready(None)
        } else {
            state.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<Data: ChannelData> Stream for ChannelReceiver<Data> {
    type Item = Data::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut state = self.0.lock().unwrap();

        if let Some(val) = state.recv_iter.as_mut().and_then(|it| it.next()) {
            return Poll::Ready(Some(val));
        }
        state.recv_iter = None;

        if let Some(send_buf) = state.send_buf.take() {
            let mut iter = send_buf.into_iter();
            let next = iter.next();
            state.recv_iter = Some(iter);
            Poll::Ready(next)
        } else if state.num_senders == 0 {
            Poll::Ready(None)
        } else {
            state.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

/*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
             Factory Functions
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub fn channel<Data: ChannelData>() -> (ChannelSender<Data>, ChannelReceiver<Data>) {
    let state = Arc::new(Mutex::new(ChannelState {
        send_buf: None,
        recv_iter: None,
        num_senders: 1,
        waker: None,
    }));

    (ChannelSender(state.clone()), ChannelReceiver(state))
}

pub fn set_channel<T: Eq + Hash + Send + Sync>(
) -> (ChannelSender<HashSet<T>>, ChannelReceiver<HashSet<T>>) {
    channel::<HashSet<T>>()
}

pub fn queue_channel<T: Send + Sync>() -> (ChannelSender<Vec<T>>, ChannelReceiver<Vec<T>>) {
    channel::<Vec<T>>()
}

pub fn singleton_channel<T: Send + Sync>() -> (ChannelSender<Option<T>>, ChannelReceiver<Option<T>>)
{
    channel::<Option<T>>()
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
