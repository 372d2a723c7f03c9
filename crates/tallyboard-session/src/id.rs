//! Session ids.
//!
//! An id names the sidebar's objective and prefixes its team names, so it
//! must be unique among live sidebars for the process lifetime. It is
//! `sb-` plus eight hex digits: a per-process random seed mixed with a
//! counter through an odd multiplier, which is a bijection on `u32`, so no
//! two of the first 2^32 ids collide.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

static SEED: OnceLock<u32> = OnceLock::new();
static COUNTER: AtomicU32 = AtomicU32::new(0);

const MIX: u32 = 0x9E37_79B9;

/// Allocates the next session id.
pub fn next_session_id() -> String {
    let seed = *SEED.get_or_init(rand::random::<u32>);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("sb-{:08x}", seed ^ n.wrapping_mul(MIX))
}
