//! 7-bag randomizer and the upcoming-piece queue.

use crate::piece::TetrominoKind;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Pieces per bag.
pub const BAG_SIZE: usize = TetrominoKind::ALL.len();

/// Produces shuffled permutations of all seven kinds.
#[derive(Debug, Clone)]
pub struct Bag {
    rng: StdRng,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Same seed, same sequence of bags.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One uniformly random permutation (Fisher–Yates via `shuffle`).
    pub fn next_bag(&mut self) -> [TetrominoKind; BAG_SIZE] {
        let mut all = TetrominoKind::ALL;
        all.shuffle(&mut self.rng);
        all
    }
}

/// Upcoming pieces. Holds at least [`BAG_SIZE`] entries after every `advance`.
#[derive(Debug, Clone)]
pub struct PieceQueue {
    pieces: VecDeque<TetrominoKind>,
    bag: Bag,
}

impl PieceQueue {
    /// Two bags up front.
    pub fn new(mut bag: Bag) -> Self {
        let mut pieces = VecDeque::with_capacity(BAG_SIZE * 3);
        pieces.extend(bag.next_bag());
        pieces.extend(bag.next_bag());
        Self { pieces, bag }
    }

    pub fn peek_next(&self) -> TetrominoKind {
        // Never below BAG_SIZE, so the head always exists.
        self.pieces[0]
    }

    /// Pop the head; top up with a fresh bag when fewer than seven remain.
    pub fn advance(&mut self) -> TetrominoKind {
        // Topping up first only appends behind the head.
        if self.pieces.len() <= BAG_SIZE {
            let fresh = self.bag.next_bag();
            self.pieces.extend(fresh);
        }
        let head = self.peek_next();
        self.pieces.pop_front();
        head
    }

    /// First `n` upcoming kinds, head first.
    pub fn upcoming(&self, n: usize) -> impl Iterator<Item = TetrominoKind> + '_ {
        self.pieces.iter().copied().take(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_permutation(run: &[TetrominoKind]) -> bool {
        run.len() == BAG_SIZE && run.iter().collect::<HashSet<_>>().len() == BAG_SIZE
    }

    #[test]
    fn test_next_bag_is_permutation() {
        let mut bag = Bag::with_seed(7);
        for _ in 0..50 {
            assert!(is_permutation(&bag.next_bag()));
        }
    }

    #[test]
    fn test_same_seed_same_bags() {
        let mut a = Bag::with_seed(42);
        let mut b = Bag::with_seed(42);
        for _ in 0..10 {
            assert_eq!(a.next_bag(), b.next_bag());
        }
    }

    #[test]
    fn test_bags_are_not_all_identical() {
        let mut bag = Bag::with_seed(1);
        let first = bag.next_bag();
        assert!((0..20).any(|_| bag.next_bag() != first));
    }

    #[test]
    fn test_queue_starts_with_two_bags() {
        let q = PieceQueue::new(Bag::with_seed(3));
        assert_eq!(q.upcoming(usize::MAX).count(), 2 * BAG_SIZE);
        let all: Vec<_> = q.upcoming(2 * BAG_SIZE).collect();
        assert!(is_permutation(&all[..BAG_SIZE]));
        assert!(is_permutation(&all[BAG_SIZE..]));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut q = PieceQueue::new(Bag::with_seed(9));
        let head = q.peek_next();
        assert_eq!(q.peek_next(), head);
        assert_eq!(q.advance(), head);
    }

    #[test]
    fn test_queue_never_runs_low() {
        let mut q = PieceQueue::new(Bag::with_seed(11));
        for _ in 0..500 {
            q.advance();
            assert!(q.upcoming(usize::MAX).count() >= BAG_SIZE);
            assert_eq!(q.upcoming(5).count(), 5);
        }
    }

    #[test]
    fn test_draws_respect_bag_boundaries() {
        let mut q = PieceQueue::new(Bag::with_seed(5));
        let draws: Vec<_> = (0..BAG_SIZE * 20).map(|_| q.advance()).collect();
        for chunk in draws.chunks(BAG_SIZE) {
            assert!(is_permutation(chunk), "{chunk:?}");
        }
    }

    #[test]
    fn test_advance_replays_bags_in_order() {
        let mut q = PieceQueue::new(Bag::with_seed(8));
        let mut bag = Bag::with_seed(8);
        let expected: Vec<_> = (0..30).flat_map(|_| bag.next_bag()).collect();
        let drawn: Vec<_> = (0..expected.len() - 2 * BAG_SIZE).map(|_| q.advance()).collect();
        assert_eq!(drawn[..], expected[..drawn.len()]);
    }

    #[test]
    fn test_default_bag_yields_permutations() {
        assert!(is_permutation(&Bag::default().next_bag()));
    }

    #[test]
    fn test_upcoming_matches_advance_order() {
        let mut q = PieceQueue::new(Bag::with_seed(21));
        let preview: Vec<_> = q.upcoming(5).collect();
        let drawn: Vec<_> = (0..5).map(|_| q.advance()).collect();
        assert_eq!(preview, drawn);
    }
}
