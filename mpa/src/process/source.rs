use std::io::{self, Read, Seek, SeekFrom};

/// Byte-oriented input consumed by [`Locator`](super::locate::Locator).
///
/// Every source reports its read position. Random access is optional: a
/// source that cannot reposition answers `false` from [`Source::can_seek`]
/// and fails [`Source::set_position`].
pub trait Source {
    /// Reads up to `buf.len()` bytes, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Current read position in bytes from the start of the stream.
    fn position(&mut self) -> io::Result<u64>;

    fn can_seek(&self) -> bool;

    fn set_position(&mut self, position: u64) -> io::Result<()>;

    /// Reads until `buf` is full or the source is exhausted.
    ///
    /// A count below `buf.len()` means end of input.
    fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;

        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(filled)
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn position(&mut self) -> io::Result<u64> {
        (**self).position()
    }

    fn can_seek(&self) -> bool {
        (**self).can_seek()
    }

    fn set_position(&mut self, position: u64) -> io::Result<()> {
        (**self).set_position(position)
    }
}

/// Random access source over anything implementing [`Read`] and [`Seek`].
#[derive(Debug)]
pub struct Seekable<R> {
    inner: R,
}

impl<R: Read + Seek> Seekable<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Source for Seekable<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    fn can_seek(&self) -> bool {
        true
    }

    fn set_position(&mut self, position: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(position)).map(|_| ())
    }
}

/// Forward-only source, e.g. a pipe.
///
/// The position is the number of bytes read so far.
#[derive(Debug)]
pub struct Sequential<R> {
    inner: R,
    position: u64,
}

impl<R: Read> Sequential<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Source for Sequential<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }

    fn can_seek(&self) -> bool {
        false
    }

    fn set_position(&mut self, _position: u64) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "sequential source cannot be repositioned",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most two bytes per read.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(2).min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn read_full_joins_short_reads() -> io::Result<()> {
        let mut source = Sequential::new(Trickle(&[1, 2, 3, 4, 5]));
        let mut buf = [0u8; 4];

        assert_eq!(source.read_full(&mut buf)?, 4);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(source.position()?, 4);

        assert_eq!(source.read_full(&mut buf)?, 1);
        assert_eq!(source.position()?, 5);
        assert_eq!(source.read_full(&mut buf)?, 0);

        Ok(())
    }

    #[test]
    fn sequential_cannot_seek() {
        let mut source = Sequential::new(&[0u8; 8][..]);
        assert!(!source.can_seek());
        assert!(source.set_position(2).is_err());
    }

    #[test]
    fn seekable_repositions() -> io::Result<()> {
        let mut source: Box<dyn Source> = Box::new(Seekable::new(Cursor::new(vec![9u8, 8, 7, 6])));
        assert!(source.can_seek());

        source.set_position(2)?;
        let mut buf = [0u8; 4];
        assert_eq!(source.read_full(&mut buf)?, 2);
        assert_eq!(&buf[..2], &[7, 6]);
        assert_eq!(source.position()?, 4);

        Ok(())
    }
}
