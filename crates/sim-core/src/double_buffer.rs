/// Two instances of a resource with alternating read/write roles.
///
/// `current` is what the last completed frame produced; `next` is the
/// write target of the frame in flight. The only way to touch both at once is
/// [`split`](Self::split), which hands out the current one shared and the
/// next one exclusive, so a pass can never read what it writes.
#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    slots: [T; 2],
    current_is_a: bool,
}

impl<T> DoubleBuffer<T> {
    pub fn new(a: T, b: T) -> Self {
        Self {
            slots: [a, b],
            current_is_a: true,
        }
    }

    fn current_slot(&self) -> usize {
        if self.current_is_a {
            0
        } else {
            1
        }
    }

    pub fn current(&self) -> &T {
        &self.slots[self.current_slot()]
    }

    /// Mutable access to the current instance, for edits between frames.
    pub fn current_mut(&mut self) -> &mut T {
        let i = self.current_slot();
        &mut self.slots[i]
    }

    pub fn next(&self) -> &T {
        &self.slots[1 - self.current_slot()]
    }

    pub fn split(&mut self) -> (&T, &mut T) {
        let (a, b) = self.slots.split_at_mut(1);
        if self.current_is_a {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    pub fn both_mut(&mut self) -> (&mut T, &mut T) {
        let (a, b) = self.slots.split_at_mut(1);
        (&mut a[0], &mut b[0])
    }

    pub fn swap(&mut self) {
        self.current_is_a = !self.current_is_a;
    }

    pub fn current_is_a(&self) -> bool {
        self.current_is_a
    }

    pub fn reset_roles(&mut self) {
        self.current_is_a = true;
    }
}
