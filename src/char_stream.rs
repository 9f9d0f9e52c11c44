use std::io::{self, Read, Seek, SeekFrom};

/// Read-only, forward-only byte source with exactly one byte of lookahead.
///
/// The stream wraps any `io::Read` and exposes the minimal contract a
/// single-lookahead lexer needs: [`peek`](CharStream::peek) observes the next
/// byte without consuming it, [`advance`](CharStream::advance) consumes it,
/// and [`is_eof`](CharStream::is_eof) probes for exhaustion (possibly reading
/// one byte into the lookahead buffer to find out).
///
/// Anything richer is deliberately unsupported: the stream cannot be read in
/// bulk, iterated, or rewound. The one operation trait it does implement,
/// [`Seek`], always fails with [`io::ErrorKind::Unsupported`] so that callers
/// probing for seekability get a clean error rather than silent misbehavior.
pub struct CharStream<R> {
    source: R,
    lookahead: Option<u8>,
    eof: bool,
}

impl<R: Read> CharStream<R> {
    pub fn new(source: R) -> CharStream<R> {
        CharStream {
            source,
            lookahead: None,
            eof: false,
        }
    }

    /// Returns the next byte without consuming it, or `None` at end of input.
    pub fn peek(&mut self) -> io::Result<Option<u8>> {
        self.fill()
    }

    /// Consumes the byte last reported by [`peek`](CharStream::peek).
    ///
    /// At end of input this is a silent no-op; the tokenizer relies on that
    /// to flush its final token without special-casing EOF in every state.
    pub fn advance(&mut self) -> io::Result<()> {
        if self.fill()?.is_some() {
            self.lookahead = None;
        }
        Ok(())
    }

    /// True iff no further byte will ever be produced.
    ///
    /// May read one byte into the lookahead buffer; it never consumes input
    /// that a later `peek`/`advance` pair would have seen.
    pub fn is_eof(&mut self) -> io::Result<bool> {
        Ok(self.fill()?.is_none())
    }

    fn fill(&mut self) -> io::Result<Option<u8>> {
        if self.lookahead.is_none() && !self.eof {
            let mut buf = [0u8; 1];
            loop {
                match self.source.read(&mut buf) {
                    Ok(0) => {
                        self.eof = true;
                        break;
                    }
                    Ok(_) => {
                        self.lookahead = Some(buf[0]);
                        break;
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(self.lookahead)
    }
}

impl<R> Seek for CharStream<R> {
    /// Always fails: the stream is forward-only. This also makes
    /// `stream_position` (the `tell` analogue) report the same error.
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "CharStream cannot seek",
        ))
    }
}
