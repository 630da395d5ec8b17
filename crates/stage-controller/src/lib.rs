//! Limelight Stage Controller Library
//!
//! This library provides the core of the Limelight call surface: it turns
//! the asynchronous event stream of a real-time media session into a
//! bounded, ordered roster of visible participants and computes, on every
//! resize or roster change, the tile layout that maximizes use of the
//! available screen area.
//!
//! # Architecture
//!
//! Data flows one direction:
//!
//! ```text
//! session events -> StageActor (single writer)
//!                   ├── RosterStore      (ordered, deduplicated, page-bounded)
//!                   ├── FocusSelector    (active speaker + screen share)
//!                   └── layout           (geometry solver + mode dispatcher)
//!                        └── Arrangement -> render tree (external)
//! ```
//!
//! The [`actors::StageActor`] owns all mutable state and processes session
//! events and commands one at a time from a single mailbox; external
//! consumers only ever receive read-only snapshots. The pure subsystems
//! ([`roster`], [`focus`], [`layout`]) are synchronous state machines with
//! no I/O, usable and testable on their own.
//!
//! # Modules
//!
//! - [`actors`] - The stage actor: event loop, commands, snapshots
//! - [`config`] - Stage configuration from environment
//! - [`errors`] - Error types
//! - [`focus`] - Active-speaker and screen-share focus selection
//! - [`layout`] - Geometry solver, arrangements, crop tables
//! - [`roster`] - Roster store and event reconciliation

#![warn(clippy::pedantic)]

pub mod actors;
pub mod config;
pub mod errors;
pub mod focus;
pub mod layout;
pub mod roster;
