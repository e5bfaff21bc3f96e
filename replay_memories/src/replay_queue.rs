use rand::prelude::{IteratorRandom, SliceRandom};
use rand::Rng;
use replay_data::Transition;
use std::collections::VecDeque;

/// Bounded FIFO of experience. Pushing into a full queue evicts the oldest entry.
pub struct ReplayQueue<T = Transition> {
    transitions: VecDeque<T>,
    max_size: usize,
}

impl<T> ReplayQueue<T> {
    pub fn with_max_size(max_size: usize) -> Self {
        assert!(max_size > 0, "replay queue needs a non-zero capacity");
        Self {
            transitions: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    pub fn add_transition(&mut self, transition: T) {
        if self.transitions.len() >= self.max_size {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Draws `batch_size` distinct entries uniformly at random.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `batch_size` entries are stored; callers gate
    /// sampling on a minimum fill level.
    pub fn sample_batch<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<&T> {
        assert!(
            self.transitions.len() >= batch_size,
            "cannot sample {} transitions from a replay queue holding {}",
            batch_size,
            self.transitions.len()
        );
        let mut batch = self.transitions.iter().choose_multiple(rng, batch_size);
        // choose_multiple does not randomize order
        batch.shuffle(rng);
        batch
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.transitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn never_grows_past_capacity() {
        let mut queue = ReplayQueue::with_max_size(5);
        for i in 0..23 {
            queue.add_transition(i);
            assert!(queue.len() <= 5);
        }
        assert_eq!(queue.len(), 5);
    }

    #[test]
    fn evicts_the_oldest_entries_first() {
        let capacity = 8;
        let extra = 3;
        let mut queue = ReplayQueue::with_max_size(capacity);
        for i in 0..capacity + extra {
            queue.add_transition(i);
        }
        let kept: Vec<usize> = queue.iter().copied().collect();
        assert_eq!(kept, (extra..capacity + extra).collect::<Vec<_>>());
    }

    #[test]
    fn batch_has_no_repeats_within_a_call() {
        let mut queue = ReplayQueue::with_max_size(100);
        for i in 0..100 {
            queue.add_transition(i);
        }
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let batch = queue.sample_batch(32, &mut rng);
            assert_eq!(batch.len(), 32);
            let distinct: HashSet<i32> = batch.iter().map(|t| **t).collect();
            assert_eq!(distinct.len(), 32);
        }
    }

    #[test]
    fn sampling_the_whole_queue_returns_every_entry() {
        let mut queue = ReplayQueue::with_max_size(10);
        for i in 0..10 {
            queue.add_transition(i);
        }
        let mut rng = StdRng::seed_from_u64(1);
        let mut batch: Vec<i32> = queue.sample_batch(10, &mut rng).into_iter().copied().collect();
        batch.sort();
        assert_eq!(batch, (0..10).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "cannot sample")]
    fn sampling_more_than_stored_panics() {
        let mut queue = ReplayQueue::with_max_size(10);
        queue.add_transition(1);
        let mut rng = StdRng::seed_from_u64(1);
        queue.sample_batch(2, &mut rng);
    }
}
