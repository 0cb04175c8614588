//! Domain entities for the kiosk print pairing screens.
//!
//! This module contains pure logic with no infrastructure dependencies: no
//! sockets, no files, no terminal output.  Everything here can be driven
//! from a unit test by calling plain functions.
//!
//! # Why a reducer? (for beginners)
//!
//! The kiosk display changes what it shows in response to events pushed by
//! the server.  Instead of scattering "set this, clear that" calls across
//! callback closures, every event is a variant of one enum and a single
//! `apply` method turns (state, event) into the next state.  The network code
//! only has to deliver events in order; it never touches the state directly.

/// Kiosk identifier newtype.
pub mod kiosk_id;

/// Startup resolution of the kiosk identifier from query + storage.
pub mod session;

/// Display state record, event enum and reducer.
pub mod display;

/// User scanner mode/result state machine.
pub mod scanner;
