pub mod knot_vector;

pub use knot_vector::*;
