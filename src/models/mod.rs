pub mod analysis;
pub mod document;
pub mod enums;
pub mod healthcare;
pub mod results;

pub use analysis::*;
pub use document::*;
pub use enums::*;
pub use healthcare::*;
pub use results::*;
