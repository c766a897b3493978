pub mod file_source;
pub mod http_client;
pub mod json_output_adapter;
