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
    std::{
        any::{type_name, Any},
        marker::PhantomData,
        sync::Arc,
    },
    tracing::warn,
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
              Type-Erased Lists
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// Element of a list whose item type is only known at runtime.
pub type AnyItem = Arc<dyn Any + Send + Sync>;

fn unpack<T: Clone + 'static>(item: &AnyItem) -> Option<T> {
    item.downcast_ref::<T>().cloned()
}

fn pack<T: Clone + Send + Sync + 'static>(item: &T) -> AnyItem {
    Arc::new(item.clone())
}

impl<T: Clone + Send + Sync + 'static> OuterViewPort<dyn ListView<T>> {
    /// Hide the element type. Writes of items of another type are rejected.
    pub fn erase(&self) -> OuterViewPort<dyn ListView<AnyItem>> {
        let port: ViewPort<dyn ListView<AnyItem>> = ViewPort::new();
        let cast = port.get_cast();

        let proj = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let src = proj_helper.new_list_arg((), self.clone(), |e: &ErasedList<T>, diff| {
                e.cast.notify(&diff.map(pack))
            });
            ErasedList {
                src,
                cast,
                proj_helper,
            }
        });

        publish(port, &proj)
    }
}

impl OuterViewPort<dyn ListView<AnyItem>> {
    /// Recover the element type of an erased list.
    /// Items of another type read as `None` and their messages turn into `Reset`.
    /// They still count towards `len`; iteration skips them.
    pub fn downcast_items<T: Clone + Send + Sync + 'static>(
        &self,
    ) -> OuterViewPort<dyn ListView<T>> {
        let port: ViewPort<dyn ListView<T>> = ViewPort::new();
        let cast = port.get_cast();

        let proj = Arc::new_cyclic(|weak| {
            let proj_helper = ProjectionHelper::new(weak.clone(), demand_of(&cast));
            let src = proj_helper.new_list_arg((), self.clone(), |d: &DowncastList<T>, diff| {
                d.on_src_diff(diff)
            });
            DowncastList {
                src,
                cast,
                proj_helper,
                _phantom: PhantomData,
            }
        });

        publish(port, &proj)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct ErasedList<T>
where
    T: Clone + Send + Sync + 'static,
{
    src: Option<Arc<dyn ListView<T>>>,
    cast: Arc<ObserverBroadcast<dyn ListView<AnyItem>>>,
    proj_helper: ProjectionHelper<(), Self>,
}

impl<T> ErasedList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn writable(&self) -> Result<&dyn MutableList<T>, ViewError> {
        self.src
            .as_ref()
            .and_then(|s| s.as_mutable())
            .ok_or(ViewError::Unsupported("source is read-only"))
    }

    fn typed(val: &AnyItem) -> Result<T, ViewError> {
        unpack(val).ok_or(ViewError::TypeMismatch {
            expected: type_name::<T>(),
        })
    }
}

impl<T> View for ErasedList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<AnyItem>;
}

impl<T> ListView<AnyItem> for ErasedList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.src.len()
    }

    fn get(&self, idx: &usize) -> Option<AnyItem> {
        self.src.get(idx).as_ref().map(pack)
    }

    fn notifies(&self) -> bool {
        self.proj_helper.notifies()
    }

    fn revision(&self) -> u64 {
        self.proj_helper.revision()
    }

    fn as_mutable(&self) -> Option<&dyn MutableList<AnyItem>> {
        Some(self)
    }
}

impl<T> MutableList<AnyItem> for ErasedList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn insert(&self, idx: usize, val: AnyItem) -> Result<(), ViewError> {
        let val = Self::typed(&val)?;
        self.writable()?.insert(idx, val)
    }

    fn remove(&self, idx: usize) -> Result<AnyItem, ViewError> {
        self.writable()?.remove(idx).map(|old| pack(&old))
    }

    fn set(&self, idx: usize, val: AnyItem) -> Result<AnyItem, ViewError> {
        let val = Self::typed(&val)?;
        self.writable()?.set(idx, val).map(|old| pack(&old))
    }

    fn clear(&self) -> Result<(), ViewError> {
        self.writable()?.clear()
    }
}

impl<T> Activation for ErasedList<T>
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

pub struct DowncastList<T>
where
    T: Clone + Send + Sync + 'static,
{
    src: Option<Arc<dyn ListView<AnyItem>>>,
    cast: Arc<ObserverBroadcast<dyn ListView<T>>>,
    proj_helper: ProjectionHelper<(), Self>,
    _phantom: PhantomData<T>,
}

impl<T> DowncastList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn mismatch(&self, idx: usize) {
        warn!(
            "downcast: item at {} is not a `{}`, resetting",
            idx,
            type_name::<T>()
        );
        self.cast.notify(&ListDiff::Reset);
    }

    fn on_src_diff(&self, diff: &ListDiff<AnyItem>) {
        let translated = match diff {
            ListDiff::Insert { idx, val } => match unpack(val) {
                Some(val) => ListDiff::Insert { idx: *idx, val },
                None => return self.mismatch(*idx),
            },
            ListDiff::Remove { idx, old } => ListDiff::Remove {
                idx: *idx,
                old: old.as_ref().and_then(unpack),
            },
            ListDiff::Update { idx, old, val } => match unpack(val) {
                Some(val) => ListDiff::Update {
                    idx: *idx,
                    old: old.as_ref().and_then(unpack),
                    val,
                },
                None => return self.mismatch(*idx),
            },
            ListDiff::Reset => ListDiff::Reset,
        };
        self.cast.notify(&translated);
    }
}

impl<T> View for DowncastList<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T> ListView<T> for DowncastList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.src.len()
    }

    fn get(&self, idx: &usize) -> Option<T> {
        let item = self.src.get(idx)?;
        let val = unpack(&item);
        if val.is_none() {
            warn!("downcast: item at {} is not a `{}`", idx, type_name::<T>());
        }
        val
    }

    fn notifies(&self) -> bool {
        self.proj_helper.notifies()
    }

    fn revision(&self) -> u64 {
        self.proj_helper.revision()
    }

    fn as_mutable(&self) -> Option<&dyn MutableList<T>> {
        Some(self)
    }
}

impl<T> MutableList<T> for DowncastList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn insert(&self, idx: usize, val: T) -> Result<(), ViewError> {
        self.writable()?.insert(idx, pack(&val))
    }

    fn remove(&self, idx: usize) -> Result<T, ViewError> {
        let old = self.writable()?.remove(idx)?;
        unpack(&old).ok_or(ViewError::TypeMismatch {
            expected: type_name::<T>(),
        })
    }

    fn set(&self, idx: usize, val: T) -> Result<T, ViewError> {
        let old = self.writable()?.set(idx, pack(&val))?;
        unpack(&old).ok_or(ViewError::TypeMismatch {
            expected: type_name::<T>(),
        })
    }

    fn clear(&self) -> Result<(), ViewError> {
        self.writable()?.clear()
    }
}

impl<T> DowncastList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn writable(&self) -> Result<&dyn MutableList<AnyItem>, ViewError> {
        self.src
            .as_ref()
            .and_then(|s| s.as_mutable())
            .ok_or(ViewError::Unsupported("source is read-only"))
    }
}

impl<T> Activation for DowncastList<T>
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
    use {
        super::*,
        crate::{
            buffer::{generate, vec::VecBuffer},
            view::list::*,
        },
    };

    #[test]
    fn erase_and_recover() {
        let buffer = VecBuffer::with_data(vec![1u32, 2]);
        let erased = buffer.to_list().erase();
        let typed = erased.downcast_items::<u32>();
        let (_sub, rx) = typed.queue();

        assert_eq!(typed.to_vec(), vec![1, 2]);
        buffer.push(3);
        assert_eq!(rx.drain(), vec![ListDiff::Insert { idx: 2, val: 3 }]);

        typed.set(0, 10).unwrap();
        assert_eq!(buffer.to_vec(), vec![10, 2, 3]);
    }

    #[test]
    fn wrongly_typed_writes_are_rejected() {
        let buffer = VecBuffer::with_data(vec![1u32]);
        let erased = buffer.to_list().erase();

        let wrong: AnyItem = Arc::new("one");
        assert_eq!(
            erased.push(wrong),
            Err(ViewError::TypeMismatch { expected: "u32" })
        );
        assert!(erased.push(Arc::new(2u32)).is_ok());
        assert_eq!(buffer.to_vec(), vec![1, 2]);
    }

    #[test]
    fn wrongly_typed_reads_are_downgraded() {
        let mixed = VecBuffer::<AnyItem>::new();
        let strings = mixed.to_list().downcast_items::<String>();
        let (_sub, rx) = strings.queue();

        mixed.push(Arc::new("a".to_string()));
        mixed.push(Arc::new(7i64));
        assert_eq!(
            rx.drain(),
            vec![ListDiff::Insert { idx: 0, val: "a".to_string() }, ListDiff::Reset]
        );
        assert_eq!(strings.get(&1), None);

        mixed.push(Arc::new("b".to_string()));
        assert_eq!(strings.len(), 3);
        assert_eq!(strings.to_vec(), vec!["a".to_string(), "b".to_string()]);

        let read_only = generate::just(vec![1u8]).erase().downcast_items::<u8>();
        assert!(matches!(read_only.set(0, 2), Err(ViewError::Unsupported(_))));
    }
}
