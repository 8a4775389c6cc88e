pub mod quantization;
pub mod prediction_scheme;
