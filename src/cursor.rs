use crate::prqueue::{Priority, PrQueue};

/// In-order cursor over a `PrQueue` that uses O(1) extra memory (Morris traversal).
/// While it walks, the cursor temporarily stores "threads" in unused right slots of the tree,
/// pointing from an in-order predecessor back up at the node to visit after it.  Each thread
/// is removed again when the traversal climbs back through it.
///
/// The cursor holds the queue mutably borrowed, so the queue can't be changed until the cursor
/// is dropped.  Dropping a cursor before it is exhausted removes any threads it left in the tree.
/// Use `PrQueue::iter` for traversals that only need a shared borrow.
pub struct Cursor<'a, T> {
	queue: &'a mut PrQueue<T>,
	/// Node to yield next: a chain head or one of its chain members
	curr: Option<usize>,
	/// Right subtree (or thread) to resume from once `curr` and its chain are used up
	pending: Option<usize>
}

impl<T> PrQueue<T> {
	/// Start a threaded in-order traversal at the minimal priority
	pub fn begin(&mut self) -> Cursor<'_, T> {
		self.settle();
		let root = self.root;
		let mut res = Cursor{queue: self, curr: None, pending: None};
		res.descend(root);
		res
	}
}

impl<'a, T> Cursor<'a, T> {
	/// Reset the cursor back to the minimal priority
	pub fn restart(&mut self) {
		self.queue.settle();
		let root = self.queue.root;
		self.descend(root);
	}

	/// Starting from `start`, find the next chain head to yield, threading predecessors on the way
	/// down and unthreading them when they are found again on the way back up
	fn descend(&mut self, mut start: Option<usize>) {
		while let Some(curr) = start {
			let arena = &mut self.queue.arena;
			let Some(left) = arena[curr].left else {
				self.curr = Some(curr);
				self.pending = arena[curr].right;
				return
			};
			let mut pred = left;
			while let Some(r) = arena[pred].right.filter(|&r|r != curr) {
				pred = r
			}
			if arena[pred].right.is_some() {
				// the left subtree of curr is finished
				arena[pred].right = None;
				self.curr = Some(curr);
				self.pending = arena[curr].right;
				return
			}
			arena[pred].right = Some(curr);
			self.queue.threaded = true;
			start = Some(left);
		}
		self.curr = None;
		self.pending = None;
	}

	/// Get the key of the next node in order and advance past it
	fn advance(&mut self) -> Option<usize> {
		if self.curr.is_none() {
			match self.pending.take() {
				Some(pending) => self.descend(Some(pending)),
				None => {
					// a finished traversal has removed every thread it made
					self.queue.threaded = false;
					return None
				}
			}
		}
		let key = self.curr?;
		self.curr = self.queue.arena[key].link;
		Some(key)
	}

	/// Get the next priority and a reference to its value
	pub fn next_ref(&mut self) -> Option<(Priority, &T)> {
		let key = self.advance()?;
		let node = &self.queue.arena[key];
		Some((node.priority, &node.value))
	}
}

impl<'a, T: Clone> Cursor<'a, T> {
	/// Write the next value and priority into `value` and `priority` and return true,
	/// or return false and leave them alone if the traversal is finished
	pub fn next_entry(&mut self, value: &mut T, priority: &mut Priority) -> bool {
		let Some((p, v)) = self.next_ref() else { return false };
		value.clone_from(v);
		*priority = p;
		true
	}
}

impl<'a, T: Clone> Iterator for Cursor<'a, T> {
	type Item = (Priority, T);
	fn next(&mut self) -> Option<Self::Item> {
		self.next_ref().map(|(p, v)|(p, v.clone()))
	}
}

impl<'a, T> Drop for Cursor<'a, T> {
	fn drop(&mut self) {
		self.queue.settle()
	}
}

#[cfg(test)]
mod tests {
	use std::mem;

	use rand::Rng;

	use crate::prqueue::{Priority, PrQueue};

	fn filled(ents: &[(i32, Priority)]) -> PrQueue<i32> {
		let mut queue = PrQueue::new();
		for &(v, p) in ents {
			queue.enqueue(v, p);
		}
		queue
	}

	#[test]
	fn begin_yields_minimum() {
		let mut queue = filled(&[(20, 2), (10, 1), (30, 3), (40, 4), (50, 5)]);
		let mut cursor = queue.begin();
		let mut value = 0;
		let mut priority = 0;
		assert!(cursor.next_entry(&mut value, &mut priority));
		assert_eq!((value, priority), (10, 1));
	}

	#[test]
	fn next_until_exhausted() {
		let mut queue = filled(&[(10, 1), (20, 2), (30, 3)]);
		let mut cursor = queue.begin();
		let mut value = 0;
		let mut priority = 0;
		for (v, p) in [(10, 1), (20, 2), (30, 3)] {
			assert!(cursor.next_entry(&mut value, &mut priority));
			assert_eq!((value, priority), (v, p));
		}
		assert!(!cursor.next_entry(&mut value, &mut priority));
		assert_eq!((value, priority), (30, 3));
		assert!(!cursor.next_entry(&mut value, &mut priority));
	}

	#[test]
	fn duplicates_in_insertion_order() {
		let mut queue = filled(&[(10, 1), (20, 2), (30, 3), (35, 3), (40, 4), (50, 5)]);
		let got: Vec<i32> = queue.begin().map(|(_, v)|v).collect();
		assert_eq!(got, vec![10, 20, 30, 35, 40, 50]);
		assert_eq!(queue.check(), Ok(()));
	}

	#[test]
	fn empty_cursor() {
		let mut queue: PrQueue<i32> = PrQueue::new();
		let mut cursor = queue.begin();
		assert_eq!(cursor.next(), None);
		assert_eq!(cursor.next(), None);
	}

	#[test]
	fn abandoned_cursor_leaves_tree_intact() {
		let mut queue = filled(&[(50, 5), (20, 2), (80, 8), (100, 10), (70, 7), (10, 1), (40, 4), (45, 4)]);
		for stop in 0..queue.len() {
			{
				let mut cursor = queue.begin();
				for _ in 0..stop {
					cursor.next();
				}
			}
			assert_eq!(queue.check(), Ok(()));
			assert!(!queue.threaded);
		}
		let got: Vec<i32> = queue.iter().map(|(_, &v)|v).collect();
		assert_eq!(got, vec![10, 20, 40, 45, 50, 70, 80, 100]);
	}

	#[test]
	fn leaked_cursor_is_repaired() {
		let mut queue = filled(&[(50, 5), (20, 2), (80, 8), (10, 1), (40, 4), (30, 3)]);
		let mut cursor = queue.begin();
		cursor.next();
		mem::forget(cursor);
		assert!(queue.threaded);
		// shared traversals skip over threads without repairing them
		let got: Vec<i32> = queue.iter().map(|(_, &v)|v).collect();
		assert_eq!(got, vec![10, 20, 30, 40, 50, 80]);
		queue.enqueue(60, 6);
		assert!(!queue.threaded);
		assert_eq!(queue.check(), Ok(()));
		assert_eq!(queue.dequeue(), 10);
	}

	#[test]
	fn restart_from_middle() {
		let mut queue = filled(&[(30, 3), (10, 1), (20, 2), (40, 4)]);
		let mut cursor = queue.begin();
		assert_eq!(cursor.next(), Some((1, 10)));
		assert_eq!(cursor.next(), Some((2, 20)));
		cursor.restart();
		let got: Vec<(Priority, i32)> = cursor.collect();
		assert_eq!(got, vec![(1, 10), (2, 20), (3, 30), (4, 40)]);
		assert_eq!(queue.check(), Ok(()));
	}

	#[test]
	fn random_matches_iter() {
		let mut rng = rand::thread_rng();
		for _ in 0..20 {
			let mut queue = PrQueue::new();
			for i in 0..300 {
				queue.enqueue(i, rng.gen_range(-60..60));
			}
			let expected: Vec<(Priority, i32)> = queue.iter().map(|(p, &v)|(p, v)).collect();
			let got: Vec<(Priority, i32)> = queue.begin().collect();
			assert_eq!(got, expected);
			assert_eq!(queue.check(), Ok(()));
			let partial = rng.gen_range(0..300);
			queue.begin().take(partial).for_each(drop);
			assert_eq!(queue.check(), Ok(()));
		}
	}
}
