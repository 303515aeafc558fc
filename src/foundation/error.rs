/// Convenience result type used across the crate.
pub type WmfResult<T> = Result<T, WmfError>;

/// Top-level error taxonomy for decoding, encoding and replaying metafile records.
#[derive(thiserror::Error, Debug)]
pub enum WmfError {
    /// A record has the wrong length, an illegal enumerated value or an impossible offset.
    #[error("malformed record 0x{opcode:04x}: {reason}")]
    Malformed {
        /// Function code of the offending record.
        opcode: u16,
        /// What was wrong with it.
        reason: String,
    },

    /// The command is decode-only and cannot be written back to a record.
    #[error("record 0x{opcode:04x} ({name}) cannot be encoded")]
    UnsupportedEncoding {
        /// Function code of the command.
        opcode: u16,
        /// Human-readable record name.
        name: &'static str,
    },

    /// `RestoreDC` asked for a snapshot that is not on the stack.
    #[error("RestoreDC({requested}) with {depth} saved state(s)")]
    DcStackUnderflow {
        /// The raw saved-DC id from the record.
        requested: i16,
        /// Stack depth when the restore was attempted.
        depth: usize,
    },

    /// A record referenced an object-table slot that holds nothing usable.
    #[error("invalid object handle {handle}: {reason}")]
    InvalidHandle {
        /// Object-table index.
        handle: u16,
        /// Why the lookup failed.
        reason: String,
    },

    /// Stream-level problems: bad placeable key, truncated header, checksum mismatch.
    #[error("metafile header error: {0}")]
    Header(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WmfError {
    /// Build a [`WmfError::Malformed`] value.
    pub fn malformed(opcode: u16, reason: impl Into<String>) -> Self {
        Self::Malformed {
            opcode,
            reason: reason.into(),
        }
    }

    /// Build a [`WmfError::UnsupportedEncoding`] value.
    pub fn unsupported_encoding(opcode: u16, name: &'static str) -> Self {
        Self::UnsupportedEncoding { opcode, name }
    }

    /// Build a [`WmfError::InvalidHandle`] value.
    pub fn invalid_handle(handle: u16, reason: impl Into<String>) -> Self {
        Self::InvalidHandle {
            handle,
            reason: reason.into(),
        }
    }

    /// Build a [`WmfError::Header`] value.
    pub fn header(msg: impl Into<String>) -> Self {
        Self::Header(msg.into())
    }

    /// Function code attached to record-level errors, if any.
    pub fn opcode(&self) -> Option<u16> {
        match self {
            Self::Malformed { opcode, .. } | Self::UnsupportedEncoding { opcode, .. } => {
                Some(*opcode)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
