//! Byte-level program I/O.
//!
//! `,` pulls one byte from a [`ByteSource`]; `.` pushes one byte into a
//! [`ByteSink`]. End of input is `None`, which the machine stores as 255.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};

use crate::error::{EvalError, EvalResult};

pub trait ByteSource {
    /// Next input byte, or `None` at end of input.
    fn read_byte(&mut self) -> EvalResult<Option<u8>>;
}

pub trait ByteSink {
    fn write_byte(&mut self, byte: u8) -> EvalResult<()>;
}

impl<'a> ByteSource for &'a [u8] {
    fn read_byte(&mut self) -> EvalResult<Option<u8>> {
        let slice: &'a [u8] = *self;
        match slice.split_first() {
            Some((&byte, rest)) => {
                *self = rest;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }
}

impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> EvalResult<Option<u8>> {
        Ok(self.pop_front())
    }
}

impl ByteSink for Vec<u8> {
    fn write_byte(&mut self, byte: u8) -> EvalResult<()> {
        self.push(byte);
        Ok(())
    }
}

/// Adapts any [`Read`] (stdin, a file) into a [`ByteSource`].
pub struct IoSource<R>(pub R);

impl<R: Read> ByteSource for IoSource<R> {
    fn read_byte(&mut self) -> EvalResult<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.0.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(EvalError::Io(e.to_string())),
            }
        }
    }
}

/// Adapts any [`Write`] (stdout, a file) into a [`ByteSink`].
pub struct IoSink<W>(pub W);

impl<W: Write> ByteSink for IoSink<W> {
    fn write_byte(&mut self, byte: u8) -> EvalResult<()> {
        self.0
            .write_all(&[byte])
            .map_err(|e| EvalError::Io(e.to_string()))
    }
}
