/// Writes an ASCII marker into the stream when the `debug_format` feature is enabled.
#[macro_export]
macro_rules! debug_write {
    ($msg:literal, $writer:expr) => {
        #[cfg(feature = "debug_format")]
        {
            $crate::core::bit_coder::ByteWriter::write_bytes($writer, $msg.as_bytes());
        }
    };
}

/// Consumes the marker written by [debug_write] when the `debug_format` feature is enabled,
/// returning `Err($err)` from the enclosing function if the bytes do not match.
#[macro_export]
macro_rules! debug_expect {
    ($msg:literal, $reader:expr, $err:expr) => {
        #[cfg(feature = "debug_format")]
        {
            for byte in $msg.as_bytes() {
                if *byte != $crate::core::bit_coder::ByteReader::read_u8($reader)? {
                    return Err($err);
                }
            }
        }
    };
}
