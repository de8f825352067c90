mod replay;
mod sink;
mod stdin;

pub use replay::*;
pub use sink::*;
pub use stdin::*;
