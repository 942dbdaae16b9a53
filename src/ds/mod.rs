pub mod chain_arena;

pub use chain_arena::{Chain, ChainArena, ChainIter, SlotId};
