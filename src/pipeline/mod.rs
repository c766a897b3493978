// Data processing pipeline: parsing, normalization and aggregation

pub mod processing;
