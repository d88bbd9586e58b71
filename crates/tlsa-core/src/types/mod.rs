mod code;
mod dns;
mod record;

pub use code::*;
pub use dns::*;
pub use record::*;
