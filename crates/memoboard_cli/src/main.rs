//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `memoboard_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Tiny CLI probe to validate core crate wiring independently from any
    // server/transport runtime setup.
    println!("memoboard_core ping={}", memoboard_core::ping());
    println!("memoboard_core version={}", memoboard_core::core_version());
}
