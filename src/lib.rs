//! # glyph-synth
//!
//! Command line front end for the `fontlib` crate. The `letters` command
//! exports one labeled image per letter, the `render` command renders a
//! single character and runs it through the augmentation steps.

pub mod cli;
