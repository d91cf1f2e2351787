//! Re-export of the move geometry tables from [`ravenchess_base`].

pub use ravenchess_base::geometry::*;
