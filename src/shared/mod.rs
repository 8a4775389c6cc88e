/// Header, attribute manifest and the frame of the stream.
pub mod header;

/// Edgebreaker symbols and topology split events.
pub mod connectivity;

/// Quantization and prediction of attribute values.
pub mod attribute;
