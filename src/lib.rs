//! Incrementally maintained views over observable lists
//!
//! A *list view* is a read-indexable, countable sequence that may also
//! accept writes and notify observers about its changes.
//! Changes are described by a small protocol of four messages
//! (`Insert`, `Remove`, `Update` and `Reset`, see [`view::list::ListDiff`]).
//!
//! *Projections* derive new list views from existing ones
//! (filtered, sorted, sliced, concatenated, mapped, zipped, permuted, ...).
//! While observed, a projection listens to its sources and translates each of
//! their messages into the smallest set of messages describing its own change,
//! falling back to `Reset` where the change is not cheaply expressible.
//! Without observers a projection holds no subscriptions and recomputes
//! lazily on read.
//!
//! Projections are composed with an interface similar to native rust iterators.
//!
//!# Examples
//!
//! ```
//! use listview::buffer::vec::VecBuffer;
//!
//! let buffer = VecBuffer::<i32>::new();
//! buffer.push(3);
//!
//! let projected_port = buffer.to_list()      // make ListView from Vec
//!                       .map(|x| x + 10)
//!                       .filter(|x| *x > 10);
//!
//! assert_eq!(projected_port.get(&0), Some(13));
//!
//! buffer.push(5);   // maps to 15
//! buffer.push(-9);  // maps to 1, is eliminated by filter
//! buffer.push(1);   // maps to 11
//!
//! assert_eq!(projected_port.to_vec(), vec![13, 15, 11]);
//! ```

pub mod error;
pub mod view;
pub mod buffer;
pub mod projection;
