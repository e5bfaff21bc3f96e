mod replay_queue;

pub use replay_queue::ReplayQueue;
