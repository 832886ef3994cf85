//! Officeworld avatar simulation library
//!
//! Headless locomotion, collision, and presence logic for the 3D virtual
//! office: the renderer draws, this crate decides where everyone stands.

pub mod config;
pub mod world;
