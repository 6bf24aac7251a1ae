//! Infix calculator built on a two stage pipeline: an infix to postfix
//! conversion followed by a postfix stack machine.

pub mod calc_engine;

pub use calc_engine::{calculate, evaluate, evaluate_postfix, CalcError};
