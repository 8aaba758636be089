use std::{cmp::Ordering, mem};

use log::{debug, trace};
use slab::Slab;

pub type Priority = i32;

#[derive(Debug)]
pub(crate) struct Node<T> {
	pub(crate) priority: Priority,
	pub(crate) value: T,
	pub(crate) parent: Option<usize>,
	pub(crate) left: Option<usize>,
	pub(crate) right: Option<usize>,
	pub(crate) link: Option<usize>
}

impl<T> Node<T> {
	pub(crate) fn new(value: T, priority: Priority, parent: Option<usize>) -> Self {
		Self{priority, value, parent, left: None, right: None, link: None}
	}
}

#[cfg(test)]
#[derive(Debug, PartialEq)]
pub(crate) enum TreeError {
	BrokenParentLink(usize),
	OutOfOrder(usize),
	StrayChainLink(usize),
	LeftoverThread(usize),
	Unreachable,
	WrongCount
}

/// A priority queue stored as an unbalanced binary search tree keyed by an `i32` priority.
/// Values sharing a priority are kept in a FIFO chain hanging off a single tree node, so only one
/// tree node exists per distinct priority.
/// - Enqueue: O(h + m) where h is the height of the tree and m the length of the chain for that priority
/// - Peek / dequeue: O(h)
/// - Len: O(1)
/// No rebalancing is done, so inserting priorities in sorted order degrades h to O(n).
///
/// Queries on an empty queue return a sentinel value (`T::default()` unless set with
/// `PrQueue::with_sentinel`).  A stored value equal to the sentinel can't be told apart from an
/// empty queue that way, so use `PrQueue::len`, or `PrQueue::peek_min` / `PrQueue::pop_min` which return `Option`s.
///
/// Nodes live in an arena and refer to each other by key.  `parent` keys are only back references:
/// they are never used to decide what to free.
pub struct PrQueue<T> {
	pub(crate) arena: Slab<Node<T>>,
	pub(crate) root: Option<usize>,
	pub(crate) len: usize,
	pub(crate) sentinel: T,
	/// Set when a cursor has written threads into the tree that may not have been removed yet
	pub(crate) threaded: bool
}

impl<T: Default> PrQueue<T> {
	/// Create an empty queue whose sentinel is `T::default()`
	pub fn new() -> Self {
		Self::with_sentinel(T::default())
	}
}

impl<T: Default> Default for PrQueue<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> PrQueue<T> {
	/// Create an empty queue that returns `sentinel` from `PrQueue::peek` and `PrQueue::dequeue` when empty
	pub fn with_sentinel(sentinel: T) -> Self {
		Self{arena: Slab::new(), root: None, len: 0, sentinel, threaded: false}
	}

	/// Get the number of values in the queue, counting every duplicate
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn sentinel(&self) -> &T {
		&self.sentinel
	}

	/// Add `value` with the given `priority`.
	/// If the priority is already present, the value goes to the back of that priority's chain.
	pub fn enqueue(&mut self, value: T, priority: Priority) {
		self.settle();
		self.attach(value, priority);
		self.len += 1;
		#[cfg(test)]{
			assert_eq!(self.check(), Ok(()))
		}
	}

	fn attach(&mut self, value: T, priority: Priority) {
		let Some(mut curr) = self.root else {
			self.root = Some(self.arena.insert(Node::new(value, priority, None)));
			return
		};
		loop {
			let node = &self.arena[curr];
			let slot = match priority.cmp(&node.priority) {
				Ordering::Less => node.left,
				Ordering::Greater => node.right,
				Ordering::Equal => {
					let mut tail = curr;
					while let Some(next) = self.arena[tail].link {
						tail = next
					}
					let key = self.arena.insert(Node::new(value, priority, None));
					self.arena[tail].link = Some(key);
					trace!("chained priority {} behind node {}", priority, tail);
					return
				}
			};
			match slot {
				Some(child) => curr = child,
				None => {
					let key = self.arena.insert(Node::new(value, priority, Some(curr)));
					let parent = &mut self.arena[curr];
					if priority < parent.priority {
						parent.left = Some(key)
					} else {
						parent.right = Some(key)
					}
					trace!("placed priority {} under node {}", priority, curr);
					return
				}
			}
		}
	}

	fn leftmost(&self) -> Option<usize> {
		let mut curr = self.root?;
		while let Some(left) = self.arena[curr].left {
			curr = left
		}
		Some(curr)
	}

	/// Get the minimal priority and the first value enqueued with it, without removing it
	pub fn peek_min(&self) -> Option<(Priority, &T)> {
		// threads only ever occupy right slots, so the left spine is safe to follow without settling
		self.leftmost().map(|key|{
			let node = &self.arena[key];
			(node.priority, &node.value)
		})
	}

	/// Remove and return the first value enqueued with the minimal priority, along with that priority
	pub fn pop_min(&mut self) -> Option<(Priority, T)> {
		self.settle();
		let min = self.leftmost()?;
		let Node{priority, value, parent, left, right, link} = self.arena.remove(min);
		// the minimum is the leftmost node, so the two child deletion case can't come up here
		debug_assert!(left.is_none());
		let replacement = match link {
			Some(next) => {
				let promoted = &mut self.arena[next];
				promoted.parent = parent;
				promoted.right = right;
				if let Some(r) = right {
					self.arena[r].parent = Some(next)
				}
				trace!("promoted chain node {} into the slot of {}", next, min);
				Some(next)
			},
			None => {
				if let Some(r) = right {
					self.arena[r].parent = parent
				}
				trace!("spliced {:?} into the slot of {}", right, min);
				right
			}
		};
		match parent {
			Some(p) => {
				debug_assert_eq!(self.arena[p].left, Some(min));
				self.arena[p].left = replacement
			},
			None => self.root = replacement
		}
		self.len -= 1;
		#[cfg(test)]{
			assert_eq!(self.check(), Ok(()))
		}
		Some((priority, value))
	}

	/// Drop every value in the queue.  Does not reset the sentinel.
	pub fn clear(&mut self) {
		debug!("clearing {} values", self.len);
		self.arena.clear();
		self.root = None;
		self.len = 0;
		self.threaded = false;
	}

	/// Key of `key`'s right child, ignoring a thread left in the right slot by an unfinished cursor.
	/// A real right child always points back at its parent, while a thread points up at an ancestor.
	pub(crate) fn real_right(&self, key: usize) -> Option<usize> {
		self.arena[key].right.filter(|&r|self.arena[r].parent == Some(key))
	}

	/// Remove any threads left over from a cursor that was not run to completion
	pub(crate) fn settle(&mut self) {
		if !mem::take(&mut self.threaded) {
			return
		}
		let stale: Vec<usize> = self.arena.iter()
			.filter(|&(key, node)|node.right.is_some_and(|r|self.arena[r].parent != Some(key)))
			.map(|(key, _)|key)
			.collect();
		if !stale.is_empty() {
			debug!("removing {} leftover threads", stale.len());
		}
		for key in stale {
			self.arena[key].right = None
		}
	}

	#[cfg(test)]
	pub(crate) fn check(&self) -> Result<(), TreeError> {
		use TreeError::*;
		#[cfg(feature = "stress_tests")]{
			return Ok(())
		}
		if let Some(root) = self.root {
			if self.arena[root].parent.is_some() {
				return Err(BrokenParentLink(root))
			}
		}
		let mut count = 0;
		let mut todo: Vec<(usize, Option<Priority>, Option<Priority>)> = self.root.map(|r|(r, None, None)).into_iter().collect();
		while let Some((key, lo, hi)) = todo.pop() {
			let node = &self.arena[key];
			if lo.is_some_and(|lo|node.priority <= lo) || hi.is_some_and(|hi|node.priority >= hi) {
				return Err(OutOfOrder(key))
			}
			if let Some(l) = node.left {
				if self.arena[l].parent != Some(key) {
					return Err(BrokenParentLink(l))
				}
				todo.push((l, lo, Some(node.priority)))
			}
			if let Some(r) = node.right {
				if self.arena[r].parent != Some(key) {
					return Err(LeftoverThread(key))
				}
				todo.push((r, Some(node.priority), hi))
			}
			count += 1;
			let mut link = node.link;
			while let Some(member_key) = link {
				let member = &self.arena[member_key];
				if member.priority != node.priority || member.parent.is_some() || member.left.is_some() || member.right.is_some() {
					return Err(StrayChainLink(member_key))
				}
				count += 1;
				link = member.link;
			}
		}
		if count != self.arena.len() {
			Err(Unreachable)
		} else if count != self.len {
			Err(WrongCount)
		} else { Ok(()) }
	}
}

impl<T: Clone> PrQueue<T> {
	/// Get the first value enqueued with the minimal priority, or a clone of the sentinel if the queue is empty
	pub fn peek(&self) -> T {
		self.peek_min().map_or_else(||self.sentinel.clone(), |(_, v)|v.clone())
	}

	/// Remove and return the first value enqueued with the minimal priority,
	/// or a clone of the sentinel if the queue is empty
	pub fn dequeue(&mut self) -> T {
		match self.pop_min() {
			Some((_, v)) => v,
			None => self.sentinel.clone()
		}
	}
}
