//! Domain entities for KeyRelay.
//!
//! This module contains pure state with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! The innermost layer of the code base.  Domain code has no imports from OS
//! APIs, network libraries or UI frameworks, so it compiles and tests on any
//! platform.  Outer layers (application, infrastructure) depend on it, never
//! the other way around.

/// Per-key pressed/released state.
///
/// See [`key_state::KeyStateTracker`] for the main type.
pub mod key_state;
