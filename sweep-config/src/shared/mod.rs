mod base;
mod pipeline;
mod s3;
mod sweeper;

pub use base::*;
pub use pipeline::*;
pub use s3::*;
pub use sweeper::*;
