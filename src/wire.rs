//! The `Wire` trait: one codec per fixed-size record
//!
//! Every fixed-size protocol struct implements `Wire` once, declaring its
//! wire size and element alignment and providing field-order read/write.
//! Runs of records, padding, and iteration are then generic over the trait
//! instead of being restated per type.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{Error, Result};

/// A fixed-size wire record
///
/// `SIZE` is the exact encoded size in bytes, including any interior pad
/// fields. `ALIGN` is the alignment of the record's widest scalar, used to
/// pad before a run of these records.
pub trait Wire: Sized + Copy {
    /// Encoded size in bytes
    const SIZE: usize;
    /// Required alignment of the record's start offset
    const ALIGN: usize;

    /// Decode one record at the cursor position
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self>;

    /// Encode one record at the cursor position
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()>;
}

impl Wire for u8 {
    const SIZE: usize = 1;
    const ALIGN: usize = 1;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        cur.get_u8()
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u8(*self)
    }
}

impl Wire for u16 {
    const SIZE: usize = 2;
    const ALIGN: usize = 2;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        cur.get_u16()
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u16(*self)
    }
}

impl Wire for u32 {
    const SIZE: usize = 4;
    const ALIGN: usize = 4;

    #[inline]
    fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
        cur.get_u32()
    }

    #[inline]
    fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
        cur.put_u32(*self)
    }
}

/// Wire length of a run of `n` records, without leading pad
#[inline]
pub fn run_len<T: Wire>(n: usize) -> Result<usize> {
    n.checked_mul(T::SIZE).ok_or(Error::Overflow)
}

/// Pad to the run's element alignment, then encode every record
#[inline]
pub fn put_run<T: Wire>(cur: &mut WriteCursor<'_>, items: &[T]) -> Result<()> {
    cur.pad_to(T::ALIGN)?;
    for item in items {
        item.write(cur)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Pair {
        a: u8,
        b: u16,
    }

    impl Wire for Pair {
        const SIZE: usize = 4;
        const ALIGN: usize = 2;

        fn read(cur: &mut ReadCursor<'_>) -> Result<Self> {
            let a = cur.get_u8()?;
            cur.skip(1)?;
            let b = cur.get_u16()?;
            Ok(Self { a, b })
        }

        fn write(&self, cur: &mut WriteCursor<'_>) -> Result<()> {
            cur.put_u8(self.a)?;
            cur.put_u8(0)?;
            cur.put_u16(self.b)
        }
    }

    #[test]
    fn test_scalar_roundtrip() {
        let mut buf = [0u8; 8];
        let mut wr = WriteCursor::new(&mut buf);
        0xABu8.write(&mut wr).unwrap();
        0x1234u16.write(&mut wr).unwrap();

        let mut rd = ReadCursor::new(&buf);
        assert_eq!(u8::read(&mut rd).unwrap(), 0xAB);
        assert_eq!(u16::read(&mut rd).unwrap(), 0x1234);
    }

    #[test]
    fn test_struct_roundtrip() {
        let v = Pair { a: 3, b: 0x0708 };
        let mut buf = [0u8; Pair::SIZE];
        let mut wr = WriteCursor::new(&mut buf);
        v.write(&mut wr).unwrap();
        assert_eq!(wr.position(), Pair::SIZE);

        let mut rd = ReadCursor::new(&buf);
        assert_eq!(Pair::read(&mut rd).unwrap(), v);
    }

    #[test]
    fn test_put_run_pads_first() {
        let mut buf = [0xFFu8; 12];
        let mut wr = WriteCursor::new(&mut buf);
        wr.put_u8(1).unwrap();
        put_run(&mut wr, &[Pair { a: 1, b: 2 }, Pair { a: 3, b: 4 }]).unwrap();
        assert_eq!(wr.position(), 10);
        assert_eq!(buf[1], 0);
    }

    #[test]
    fn test_run_len_overflow() {
        assert_eq!(run_len::<u32>(usize::MAX), Err(Error::Overflow));
        assert_eq!(run_len::<u16>(3).unwrap(), 6);
    }
}
