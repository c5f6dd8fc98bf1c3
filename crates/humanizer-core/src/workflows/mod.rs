//! # Workflows Module
//!
//! High-level entry points that tie the `engine` and `core` layers together.
//!
//! - **Humanization** ([`humanize`]) - Builds a chimeric seed from a human sample and greedily
//!   reverts framework positions while the humanness and V-gene targets hold.
//! - **Similar samples** ([`similar`]) - Looks up the closest human reference sequences for
//!   each input.

pub mod humanize;
pub mod similar;
