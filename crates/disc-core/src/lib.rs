pub mod error;
pub mod instruction;
pub mod scenario;
pub mod value;

pub use error::DiscError;
pub use instruction::*;
pub use scenario::*;
pub use value::*;
