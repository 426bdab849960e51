mod adapt;
mod batch;
mod curve;
mod intersects;
mod knot;
mod misc;
mod pairing;

pub mod prelude {
    pub use crate::adapt::*;
    pub use crate::batch::*;
    pub use crate::curve::*;
    pub use crate::intersects::*;
    pub use crate::knot::*;
    pub use crate::misc::*;
    pub use crate::pairing::*;
}
