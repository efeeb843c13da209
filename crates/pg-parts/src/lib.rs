//! Part Generators
//!
//! Concrete 3D-printable parts built on `pg-cad`:
//! - Aluminium profile bracket (single or twin profile)
//! - NEMA stepper motor holder
//! - Linear bearing housing
//! - Belt clamp
//!
//! Every generator takes a [`DocumentContext`](pg_cad::DocumentContext)
//! and a parameter struct with defaults, and returns a finished
//! [`Part`](pg_cad::Part).

pub mod bearing;
pub mod belt_clamp;
pub mod bracket;
pub mod nema;
pub mod placement;
pub mod request;

pub use bearing::{BearingHousingParams, bearing_housing};
pub use belt_clamp::{BeltClampParams, belt_clamp};
pub use bracket::{AluProfBracketParams, alu_prof_bracket};
pub use nema::{NemaHolderParams, nema_holder};
pub use placement::PartPlacement;
pub use request::{GENERATORS, PartRequest, RequestError};
