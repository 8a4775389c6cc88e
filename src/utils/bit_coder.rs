use crate::core::bit_coder::{ByteReader, ByteWriter, ReaderErr};

pub(crate) fn leb128_read<R>(reader: &mut R) -> Result<u64, ReaderErr>
    where R: ByteReader,
{
    let offset = reader.position();
    let mut result: u64 = 0;
    let mut shift = 0;
    loop {
        let byte = reader.read_u8()?;
        let payload = (byte & 0x7F) as u64;
        if (shift == 63 && payload > 1) || shift > 63 {
            return Err(ReaderErr::Leb128Overflow { offset });
        }
        result |= payload << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    Ok(result)
}

pub(crate) fn leb128_write<W>(mut value: u64, writer: &mut W)
    where W: ByteWriter,
{
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            writer.write_u8(byte);
            break;
        } else {
            writer.write_u8(byte | 0x80);
        }
    }
}
