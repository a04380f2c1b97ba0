// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Parallel rectangle selection for large point clouds.
//!
//! Cloudpick turns a modifier + drag gesture over a render surface into the
//! set of point indices whose screen projection falls inside the dragged
//! rectangle. The scan is split across a fixed pool of worker threads, and
//! the live highlight is handed to the renderer without blocking it.
//!
//! # Key entry points
//!
//! - [`session::SelectionSession`] - wires input, gesture, highlight and
//!   workers together on the coordinating thread
//! - [`selection::SelectionExecutor`] - the worker pool and query API
//! - [`input::GestureMachine`] - the drag-to-select state machine
//! - [`highlight::HighlightReader`] - renderer-side view of the highlight
//!   uniform
//! - [`options::Options`] - runtime configuration (selection, highlight,
//!   camera, keybindings)
//!
//! # Architecture
//!
//! Input, the gesture machine and the highlight coordinator live on one
//! coordinating thread. A released drag becomes a [`selection::SelectionQuery`]
//! that is split into contiguous partitions, one per worker; workers only
//! read the shared point buffer and return ordered index lists, which are
//! merged in partition order. The highlight uniform reaches the render
//! thread through a lock-free triple buffer.

pub mod camera;
pub mod error;
pub mod highlight;
pub mod input;
pub mod options;
pub mod points;
pub mod selection;
pub mod session;
