use std::iter::FusedIterator;

use crate::prqueue::{Priority, PrQueue};

/// Borrowing in-order iterator over a `PrQueue`.
/// Uses an explicit stack of O(h) keys instead of threading, so it only needs a shared borrow
/// and any number of these can run at once.
pub struct Iter<'a, T> {
	queue: &'a PrQueue<T>,
	stack: Vec<usize>,
	chain: Option<usize>,
	remaining: usize
}

impl<'a, T> Iter<'a, T> {
	fn push_left_spine(&mut self, mut curr: Option<usize>) {
		while let Some(key) = curr {
			self.stack.push(key);
			curr = self.queue.arena[key].left;
		}
	}
}

impl<'a, T> Iterator for Iter<'a, T> {
	type Item = (Priority, &'a T);
	fn next(&mut self) -> Option<Self::Item> {
		let key = match self.chain {
			Some(key) => key,
			None => {
				let key = self.stack.pop()?;
				self.push_left_spine(self.queue.real_right(key));
				key
			}
		};
		let queue = self.queue;
		let node = &queue.arena[key];
		self.chain = node.link;
		self.remaining -= 1;
		Some((node.priority, &node.value))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

/// Consuming iterator that pops a `PrQueue` empty, in the same order as `Iter`
pub struct IntoIter<T> {
	queue: PrQueue<T>
}

impl<T> Iterator for IntoIter<T> {
	type Item = (Priority, T);
	fn next(&mut self) -> Option<Self::Item> {
		self.queue.pop_min()
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.queue.len(), Some(self.queue.len()))
	}
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> PrQueue<T> {
	/// Iterate over (priority, value) pairs by increasing priority, with values sharing a priority
	/// in the order they were enqueued
	pub fn iter(&self) -> Iter<'_, T> {
		let mut res = Iter{queue: self, stack: Vec::new(), chain: None, remaining: self.len};
		res.push_left_spine(self.root);
		res
	}
}

impl<'a, T> IntoIterator for &'a PrQueue<T> {
	type Item = (Priority, &'a T);
	type IntoIter = Iter<'a, T>;
	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl<T> IntoIterator for PrQueue<T> {
	type Item = (Priority, T);
	type IntoIter = IntoIter<T>;
	fn into_iter(self) -> Self::IntoIter {
		IntoIter{queue: self}
	}
}

impl<T> Extend<(T, Priority)> for PrQueue<T> {
	fn extend<I: IntoIterator<Item = (T, Priority)>>(&mut self, iter: I) {
		for (v, p) in iter {
			self.enqueue(v, p)
		}
	}
}

impl<T: Default> FromIterator<(T, Priority)> for PrQueue<T> {
	fn from_iter<I: IntoIterator<Item = (T, Priority)>>(iter: I) -> Self {
		let mut res = Self::new();
		res.extend(iter);
		res
	}
}
