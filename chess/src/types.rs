//! Re-export of the board vocabulary from [`ravenchess_base`].

pub use ravenchess_base::types::*;
