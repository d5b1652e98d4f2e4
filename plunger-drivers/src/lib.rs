//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in plunger-core on top of the plunger-hal pin and timing traits:
//!
//! - Step/direction stepper drivers (A4988, DRV8825, TMC2209 in STEP/DIR mode)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod stepper;

pub use stepper::StepDirDriver;
