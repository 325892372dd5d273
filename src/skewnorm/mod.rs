//! Skew-normal distribution model.
//!
//! A skew-normal distribution generalizes the normal distribution with a
//! skewness parameter `a`. Its density is
//!
//! ```text
//! f(x) = 2/scale · φ(z) · Φ(a·z),   z = (x - loc) / scale
//! ```
//!
//! where φ and Φ are the standard normal PDF and CDF. `a = 0` recovers the
//! normal distribution `N(loc, scale²)`.
//!
//! # Key Types
//!
//! - [`ShapeParams`]: The `(a, loc, scale)` triple being fitted
//! - [`SkewNormal`]: A density function bound to one parameter triple
//! - [`Domain`]: The fixed, evenly spaced grid used for modal estimation
//!
//! # References
//!
//! - Azzalini (1985), "A Class of Distributions Which Includes the Normal Ones"

mod domain;
mod model;

pub use domain::Domain;
pub use model::{ShapeParams, SkewNormal};
