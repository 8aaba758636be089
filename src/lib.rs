pub mod prqueue;
pub mod cursor;
pub mod iter;
mod compare;

pub use cursor::Cursor;
pub use iter::{IntoIter, Iter};
pub use prqueue::{Priority, PrQueue};
