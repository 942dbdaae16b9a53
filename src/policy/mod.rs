//! Eviction policies.
//!
//! | Policy | Victim                                          |
//! |--------|-------------------------------------------------|
//! | LRU    | entry touched longest ago                       |
//! | LFU    | lowest access count, least recently touched tie |

pub mod lfu;
pub mod lru;
