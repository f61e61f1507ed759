mod store_reader;
mod store_writer;

pub use store_reader::StoreReader;
pub use store_writer::StoreWriter;

use crate::error::ArborError;
use bincode::Options;
use std::io::ErrorKind;

/// Upper bound on the encoded size of a single primitive. A length prefix
/// past it is rejected before anything is allocated.
const MAX_PRIMITIVE_BYTES: u64 = 1 << 24;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_varint_encoding()
        .with_little_endian()
        .with_limit(MAX_PRIMITIVE_BYTES)
}

fn store_error(err: bincode::Error) -> ArborError {
    match *err {
        bincode::ErrorKind::Io(e) if e.kind() == ErrorKind::UnexpectedEof => {
            ArborError::Malformed("unexpected end of record".into())
        }
        bincode::ErrorKind::Io(e) => ArborError::Io(e),
        bincode::ErrorKind::SizeLimit => {
            ArborError::Malformed(format!("value larger than {MAX_PRIMITIVE_BYTES} bytes"))
        }
        other => ArborError::Malformed(other.to_string()),
    }
}
