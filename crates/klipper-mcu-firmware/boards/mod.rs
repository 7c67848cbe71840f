//! Board pin-map modules, kept outside `src/` since they're per-board data,
//! not control-loop logic. Pulled in from `main.rs` via `#[path]` since
//! Cargo only walks `src/` by default.

pub mod stm32f407;
