//! Sane dotfiles: manage a home directory with a detached git repository.
//!
//! The repository's metadata lives in `~/.config/sdf` while its work tree is
//! the home directory itself. The crate keeps a strict split:
//!
//! - **[`core`]**: Pure, deterministic logic (argument vectors, log-line
//!   parsing, arity checks). No I/O.
//! - **[`io`]**: Side-effecting adapters (paths, settings, subprocesses, the
//!   engine, terminal prompts).
//!
//! Command modules ([`repository`], [`delegate`], [`trace`]) combine the two
//! to implement the CLI.

pub mod core;
pub mod delegate;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod repository;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod trace;
