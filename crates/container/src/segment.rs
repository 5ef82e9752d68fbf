use std::io::{self, Read, Seek, SeekFrom};
use tracing::warn;

use crate::ContainerError;

/// Reads `size` bytes starting at `offset`.
///
/// The returned buffer is always exactly `size` bytes long. Bytes that lie
/// past the physical end of the container are left as zero; running into
/// end-of-file is not an error. A warning is logged when that happens since
/// an oversized range may also mean a damaged header.
///
/// # Errors
///
/// Returns [`ContainerError::Io`] for read or seek failures other than
/// end-of-file, and with kind `OutOfMemory` if a buffer of `size` bytes
/// cannot be allocated.
pub fn read_segment<R: Read + Seek>(
    r: &mut R,
    offset: u64,
    size: u64,
) -> Result<Vec<u8>, ContainerError> {
    let len = usize::try_from(size).map_err(|_| oversized(size))?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| oversized(size))?;
    buf.resize(len, 0);

    // never seek at or past the end: some files reject huge offsets
    let physical = r.seek(SeekFrom::End(0))?;
    let mut filled = 0;
    if offset < physical {
        r.seek(SeekFrom::Start(offset))?;
        while filled < len {
            match r.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ContainerError::Io(e)),
            }
        }
    }

    if filled < len {
        warn!(
            offset,
            size,
            zero_filled = len - filled,
            "segment extends past end of container"
        );
    }

    Ok(buf)
}

fn oversized(size: u64) -> ContainerError {
    ContainerError::Io(io::Error::new(
        io::ErrorKind::OutOfMemory,
        format!("cannot allocate segment of {size} bytes"),
    ))
}
