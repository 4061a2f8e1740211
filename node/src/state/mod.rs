mod mempool_state;

pub use mempool_state::MempoolState;
