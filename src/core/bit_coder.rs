/// A sink of bytes. Multi-byte integers and floats are written in little endian.
pub trait ByteWriter: Sized {
    fn write_u8(&mut self, value: u8);
    fn write_u16(&mut self, value: u16) {
        self.write_u8(value as u8);
        self.write_u8((value >> 8) as u8);
    }
    fn write_u32(&mut self, value: u32) {
        self.write_u16(value as u16);
        self.write_u16((value >> 16) as u16);
    }
    fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }
    fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_u8(b);
        }
    }
}

impl ByteWriter for Vec<u8> {
    fn write_u8(&mut self, value: u8) {
        self.push(value);
    }

    fn write_u16(&mut self, value: u16) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn write_u32(&mut self, value: u32) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Packs bit fields into bytes. The first bit written goes to the most significant
/// free bit of the current byte.
pub struct BitWriter<'buffer, Buffer: ByteWriter> {
    buffer: &'buffer mut Buffer,

    /// The position in the current byte where the next bit will be written.
    /// It is always less than 8.
    pos_in_curr_byte: u8,

    /// The current byte being written to. This byte will be written to the buffer when it is full.
    curr_byte: u8,
}

impl<'buffer, Buffer: ByteWriter> BitWriter<'buffer, Buffer> {
    pub fn spown_from(buffer: &'buffer mut Buffer) -> Self {
        BitWriter {
            buffer,
            pos_in_curr_byte: 0,
            curr_byte: 0,
        }
    }

    /// Writes the lowest `size` bits of `value`. `size` must be at most 64.
    /// Writing zero bits is a no-op.
    pub fn write_bits(&mut self, (size, value): (u8, u64)) {
        debug_assert!(size <= 64, "Size must be at most 64 bits.");
        let value = if size < 64 { value & ((1 << size) - 1) } else { value };
        let mut remaining = size;
        while remaining > 0 {
            let num_free = 8 - self.pos_in_curr_byte;
            let n = remaining.min(num_free);
            let chunk = (value >> (remaining - n)) & ((1_u64 << n) - 1);
            self.curr_byte |= (chunk << (num_free - n)) as u8;
            remaining -= n;
            self.pos_in_curr_byte += n;
            if self.pos_in_curr_byte == 8 {
                self.buffer.write_u8(self.curr_byte);
                self.curr_byte = 0;
                self.pos_in_curr_byte = 0;
            }
        }
    }

    /// Pads the current byte with zeros and writes it out, if any bit of it is in use.
    pub fn align_to_byte(&mut self) {
        if self.pos_in_curr_byte > 0 {
            self.buffer.write_u8(self.curr_byte);
            self.curr_byte = 0;
            self.pos_in_curr_byte = 0;
        }
    }
}

impl<Buffer: ByteWriter> Drop for BitWriter<'_, Buffer> {
    fn drop(&mut self) {
        self.align_to_byte();
    }
}

#[remain::sorted]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderErr {
    #[error("Variable length integer starting at byte {offset} does not fit in 64 bits")]
    Leb128Overflow { offset: usize },
    #[error("Not enough data to read: requested {requested} byte(s) at offset {offset}")]
    NotEnoughData { offset: usize, requested: usize },
}

/// A source of bytes. Multi-byte integers and floats are read in little endian.
pub trait ByteReader {
    fn read_u8(&mut self) -> Result<u8, ReaderErr>;

    /// Offset of the next byte to be read, counted from the start of the stream.
    fn position(&self) -> usize;

    fn read_u16(&mut self) -> Result<u16, ReaderErr> {
        let out = [self.read_u8()?, self.read_u8()?];
        Ok(u16::from_le_bytes(out))
    }
    fn read_u32(&mut self) -> Result<u32, ReaderErr> {
        let out = [self.read_u8()?, self.read_u8()?, self.read_u8()?, self.read_u8()?];
        Ok(u32::from_le_bytes(out))
    }
    fn read_f32(&mut self) -> Result<f32, ReaderErr> {
        Ok(f32::from_bits(self.read_u32()?))
    }
}

/// Reads bytes from a borrowed slice. Offsets in errors are absolute, i.e. a reader
/// obtained by [SliceReader::split_section] reports offsets within the outer stream.
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn not_enough(&self, requested: usize) -> ReaderErr {
        ReaderErr::NotEnoughData {
            offset: self.base + self.pos,
            requested,
        }
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ReaderErr> {
        if len > self.remaining() {
            return Err(self.not_enough(len));
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Consumes the next `len` bytes and returns a reader confined to them.
    pub fn split_section(&mut self, len: usize) -> Result<SliceReader<'a>, ReaderErr> {
        let base = self.base + self.pos;
        let data = self.read_slice(len)?;
        Ok(SliceReader { data, pos: 0, base })
    }
}

impl ByteReader for SliceReader<'_> {
    fn read_u8(&mut self) -> Result<u8, ReaderErr> {
        let out = *self.data.get(self.pos).ok_or_else(|| self.not_enough(1))?;
        self.pos += 1;
        Ok(out)
    }

    fn position(&self) -> usize {
        self.base + self.pos
    }

    fn read_u16(&mut self) -> Result<u16, ReaderErr> {
        let s = self.read_slice(2)?;
        Ok(u16::from_le_bytes([s[0], s[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, ReaderErr> {
        let s = self.read_slice(4)?;
        Ok(u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
    }
}

/// Reads the bit fields written by a [BitWriter].
pub struct BitReader<'buffer, Buffer> {
    buffer: &'buffer mut Buffer,

    /// The position in the current byte where the next bit will be read.
    /// It is always less than 8. When it is 0, the next read fetches a new byte.
    pos_in_curr_byte: u8,

    curr_byte: u8,
}

impl<'buffer, Buffer: ByteReader> BitReader<'buffer, Buffer> {
    pub fn spown_from(buffer: &'buffer mut Buffer) -> Self {
        BitReader {
            buffer,
            pos_in_curr_byte: 0,
            curr_byte: 0,
        }
    }

    /// Reads `size` bits from the buffer and returns them as a `u64`.
    /// `size` must be at most 64. Reading zero bits returns `0` without touching the buffer.
    pub fn read_bits(&mut self, size: u8) -> Result<u64, ReaderErr> {
        debug_assert!(size <= 64, "Size must be at most 64 bits.");
        let mut value: u64 = 0;
        let mut num_read = 0;
        while num_read < size {
            if self.pos_in_curr_byte == 0 {
                self.curr_byte = self.buffer.read_u8()?;
            }
            let num_left = 8 - self.pos_in_curr_byte;
            let n = (size - num_read).min(num_left);
            let chunk = (self.curr_byte as u64 >> (num_left - n)) & ((1_u64 << n) - 1);
            value = (value << n) | chunk;
            num_read += n;
            self.pos_in_curr_byte = (self.pos_in_curr_byte + n) & 7;
        }
        Ok(value)
    }

    /// Discards the unread bits of the current byte.
    pub fn align_to_byte(&mut self) {
        self.pos_in_curr_byte = 0;
    }
}
