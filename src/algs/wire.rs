//! Fixed little-endian wire types and blocking point-to-point helpers.
//!
//! Cells travel as native `f64` (all ranks of a run share one architecture);
//! integer headers are stored pre-LE with `.to_le()` and decoded with
//! `.from_le()`.

use crate::algs::communicator::{CommTag, Communicator, Wait};
use crate::heatsim_error::{CommError, HeatsimError};
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

pub fn expect_exact_len(actual: usize, expected: usize) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {expected} bytes, got {actual}"))
    }
}

/// Sub-grid header sent ahead of the cell payload: `(width, height, padding)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct WireGridParams {
    pub width_le: u32,
    pub height_le: u32,
    pub padding_le: u32,
}

impl WireGridParams {
    /// # Errors
    /// `GridShape` if an extent does not fit the `u32` header field.
    pub fn new(width: usize, height: usize, padding: usize) -> Result<Self, HeatsimError> {
        let field = |name: &str, v: usize| {
            u32::try_from(v).map(u32::to_le).map_err(|_| {
                HeatsimError::GridShape(format!("{name} {v} does not fit a u32 header"))
            })
        };
        Ok(Self {
            width_le: field("width", width)?,
            height_le: field("height", height)?,
            padding_le: field("padding", padding)?,
        })
    }

    pub fn width(&self) -> usize {
        u32::from_le(self.width_le) as usize
    }

    pub fn height(&self) -> usize {
        u32::from_le(self.height_le) as usize
    }

    pub fn padding(&self) -> usize {
        u32::from_le(self.padding_le) as usize
    }
}

fn check_peer<C: Communicator>(comm: &C, peer: usize) -> Result<(), CommError> {
    if peer < comm.size() {
        Ok(())
    } else {
        Err(CommError::PeerOutOfRange {
            peer,
            size: comm.size(),
        })
    }
}

/// Blocking send of a slice of plain-old-data values.
pub fn send<C, T>(comm: &C, peer: usize, tag: CommTag, values: &[T]) -> Result<(), CommError>
where
    C: Communicator,
    T: Pod,
{
    check_peer(comm, peer)?;
    log::trace!(
        "rank {} -> {peer}: {} bytes, tag {}",
        comm.rank(),
        size_of::<T>() * values.len(),
        tag.as_u16()
    );
    let _ = comm.isend(peer, tag.as_u16(), cast_slice(values)).wait();
    Ok(())
}

/// Blocking receive filling `out` exactly.
///
/// # Errors
/// `RecvFailed` if nothing arrives, `LengthMismatch` if the payload is not
/// `size_of::<T>() * out.len()` bytes.
pub fn recv_into<C, T>(comm: &C, peer: usize, tag: CommTag, out: &mut [T]) -> Result<(), CommError>
where
    C: Communicator,
    T: Pod,
{
    check_peer(comm, peer)?;
    let bytes = cast_slice_mut(out);
    let expected = bytes.len();
    let data = comm
        .irecv(peer, tag.as_u16(), bytes)
        .wait()
        .ok_or(CommError::RecvFailed {
            peer,
            tag: tag.as_u16(),
        })?;
    expect_exact_len(data.len(), expected).map_err(|_| CommError::LengthMismatch {
        peer,
        tag: tag.as_u16(),
        expected,
        actual: data.len(),
    })?;
    bytes.copy_from_slice(&data);
    log::trace!(
        "rank {} <- {peer}: {expected} bytes, tag {}",
        comm.rank(),
        tag.as_u16()
    );
    Ok(())
}
