use crate::core::bit_coder::{BitReader, ByteReader, ReaderErr};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Symbol {
    C,
    S,
    L,
    R,
    E,
}

impl Symbol {
    /// Position of the symbol in the evaluation histogram.
    #[cfg(feature = "evaluation")]
    #[inline]
    pub(crate) fn get_id(self) -> usize {
        match self {
            Symbol::C => 0,
            Symbol::S => 1,
            Symbol::L => 2,
            Symbol::R => 3,
            Symbol::E => 4,
        }
    }
}

pub(crate) trait SymbolEncoder {
    /// Returns the code of the symbol as `(size, value)`.
    fn encode_symbol(symbol: Symbol) -> (u8, u64);

    fn decode_symbol<R>(reader: &mut BitReader<R>) -> Result<Symbol, ReaderErr>
        where R: ByteReader;
}

/// `C` takes one bit, since about half of the faces of a mesh are `C` faces.
/// The rest take three bits: `S` = `100`, `L` = `101`, `R` = `110`, `E` = `111`.
pub(crate) struct CrLight;

impl SymbolEncoder for CrLight {
    fn encode_symbol(symbol: Symbol) -> (u8, u64) {
        match symbol {
            Symbol::C => (1, 0),
            Symbol::S => (3, 0b100),
            Symbol::L => (3, 0b101),
            Symbol::R => (3, 0b110),
            Symbol::E => (3, 0b111),
        }
    }

    fn decode_symbol<R>(reader: &mut BitReader<R>) -> Result<Symbol, ReaderErr>
        where R: ByteReader
    {
        if reader.read_bits(1)? == 0 {
            return Ok(Symbol::C);
        }
        let out = match reader.read_bits(2)? {
            0b00 => Symbol::S,
            0b01 => Symbol::L,
            0b10 => Symbol::R,
            _ => Symbol::E,
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bit_coder::{BitWriter, SliceReader};

    #[test]
    fn test_cr_light() {
        let symbols = [Symbol::C, Symbol::S, Symbol::C, Symbol::L, Symbol::R, Symbol::E, Symbol::C];
        let mut buffer = Vec::new();
        {
            let mut writer: BitWriter<_> = BitWriter::spown_from(&mut buffer);
            for s in symbols {
                writer.write_bits(CrLight::encode_symbol(s));
            }
        }
        // 0 100 0 101 | 110 111 0 (padding)
        assert_eq!(buffer, vec![0b01000101, 0b11011100]);
        let mut reader = SliceReader::new(&buffer);
        let mut reader: BitReader<_> = BitReader::spown_from(&mut reader);
        for s in symbols {
            assert_eq!(CrLight::decode_symbol(&mut reader).unwrap(), s);
        }
    }
}
