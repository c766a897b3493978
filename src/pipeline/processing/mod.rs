// Pipeline processing stages, in run order

pub mod parser;
pub mod normalize;
pub mod aggregate;
pub mod values;
