//! This crate contains architecture-agnostic logic for Tritone, a twelve-button keyboard which sounds up to three
//! square waves at once through piezo buzzers and reports what it plays as [MIDI](https://midi.org/midi-1-0) note
//! messages over a serial link. Two rotary encoders transpose the keyboard, one by octaves and one by half steps.
//!
//! Everything here is free of hardware concerns: inputs arrive as button edges, button snapshots and encoder
//! deltas; outputs leave through the [`voicing::ToneOutput`] and [`sink::NoteSink`] traits. The firmware crate
//! supplies the peripherals.

#![deny(missing_docs)]
#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod configuration;
pub mod controller;
pub mod encoder;

/// Data structures for tracking which buttons are held and which notes they sound.
pub mod note_state;

pub mod sink;
pub mod transposition;
pub mod voicing;
