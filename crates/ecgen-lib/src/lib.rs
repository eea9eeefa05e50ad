pub mod beat;
pub mod compose;
pub mod plot;
pub mod rhythm;
pub mod signal;
pub mod timebase;
pub mod window;

pub use beat::*;
pub use compose::*;
pub use rhythm::*;
pub use signal::*;
pub use timebase::*;
pub use window::*;
