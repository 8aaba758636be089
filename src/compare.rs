use std::fmt;

use log::debug;

use crate::prqueue::{Node, PrQueue};

impl<T: Clone> PrQueue<T> {
	/// Append a deep copy of `source`'s tree to this (empty) queue.
	/// Chain heads are copied right subtree first, and every chain is rebuilt from fresh nodes.
	fn copy_tree(&mut self, source: &Self) {
		debug_assert!(self.root.is_none());
		let Some(root) = source.root else { return };
		self.arena.reserve(source.len);
		// (source key, destination parent and whether the copy is its left child)
		let mut todo: Vec<(usize, Option<(usize, bool)>)> = vec![(root, None)];
		while let Some((src, slot)) = todo.pop() {
			let node = &source.arena[src];
			let key = self.arena.insert(Node::new(node.value.clone(), node.priority, slot.map(|(p, _)|p)));
			match slot {
				None => self.root = Some(key),
				Some((p, true)) => self.arena[p].left = Some(key),
				Some((p, false)) => self.arena[p].right = Some(key)
			}
			let mut tail = key;
			let mut link = node.link;
			while let Some(src_member) = link {
				let member = &source.arena[src_member];
				let copy = self.arena.insert(Node::new(member.value.clone(), member.priority, None));
				self.arena[tail].link = Some(copy);
				tail = copy;
				link = member.link;
			}
			if let Some(l) = node.left {
				todo.push((l, Some((key, true))))
			}
			if let Some(r) = source.real_right(src) {
				todo.push((r, Some((key, false))))
			}
		}
		self.len = source.len;
		debug!("copied {} values into {} nodes", self.len, self.arena.len());
	}
}

impl<T: Clone> Clone for PrQueue<T> {
	fn clone(&self) -> Self {
		let mut res = Self::with_sentinel(self.sentinel.clone());
		res.copy_tree(self);
		res
	}

	fn clone_from(&mut self, source: &Self) {
		self.clear();
		self.sentinel.clone_from(&source.sentinel);
		self.copy_tree(source);
	}
}

impl<T> PrQueue<T> {
	/// Walk both trees in lockstep, left then right, and check that they have the same shape
	/// and that `same` holds for every pair of matching chain heads
	fn mirrors(&self, other: &Self, same: impl Fn(&Node<T>, &Node<T>) -> bool) -> bool {
		let mut todo = vec![(self.root, other.root)];
		while let Some(pair) = todo.pop() {
			match pair {
				(None, None) => (),
				(Some(a), Some(b)) => {
					if !same(&self.arena[a], &other.arena[b]) {
						return false
					}
					todo.push((self.real_right(a), other.real_right(b)));
					todo.push((self.arena[a].left, other.arena[b].left));
				},
				_ => return false
			}
		}
		true
	}
}

impl<T: PartialEq> PrQueue<T> {
	/// Check that both queues have the same tree shape with the same priority and value at every
	/// chain head.  Unlike `==`, the rest of each chain is not compared.
	pub fn same_heads(&self, other: &Self) -> bool {
		self.mirrors(other, |a, b|a.priority == b.priority && a.value == b.value)
	}
}

/// Two queues are equal when their trees have the same shape, and every chain holds the same
/// priority and the same values in the same order.
/// Queues holding the same values can compare unequal if they were built in a different order.
impl<T: PartialEq> PartialEq for PrQueue<T> {
	fn eq(&self, other: &Self) -> bool {
		if self.len != other.len {
			return false
		}
		self.mirrors(other, |a, b|{
			if a.priority != b.priority || a.value != b.value {
				return false
			}
			let (mut x, mut y) = (a.link, b.link);
			loop {
				match (x, y) {
					(None, None) => return true,
					(Some(i), Some(j)) => {
						let (m, n) = (&self.arena[i], &other.arena[j]);
						if m.value != n.value {
							return false
						}
						(x, y) = (m.link, n.link);
					},
					_ => return false
				}
			}
		})
	}
}

impl<T: Eq> Eq for PrQueue<T> {}

/// One line per value, `"<priority> value: <value>"`, by increasing priority and then enqueue order
impl<T: fmt::Display> fmt::Display for PrQueue<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (p, v) in self {
			writeln!(f, "{} value: {}", p, v)?;
		}
		Ok(())
	}
}

impl<T: fmt::Debug> fmt::Debug for PrQueue<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.iter()).finish()
	}
}

impl<T: fmt::Display> PrQueue<T> {
	/// Same as `to_string`; empty for an empty queue
	pub fn to_ordered_string(&self) -> String {
		self.to_string()
	}
}
