//! Error kinds shared by every service error.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// The distinguishable categories a caller can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed input. Nothing was written.
    Validation,

    /// An item, sale or cart line does not exist.
    NotFound,

    /// The requested quantity exceeds the available stock.
    InsufficientStock,

    /// A uniqueness constraint rejected the write.
    Conflict,

    /// A store, cache, publisher or remote call failed.
    Io,
}

impl ErrorKind {
    /// HTTP status an outer transport should answer with.
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InsufficientStock => 422,
            Self::Io => 500,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::InsufficientStock => "insufficient_stock",
            Self::Conflict => "conflict",
            Self::Io => "io",
        };

        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::NotFound,
            ErrorKind::InsufficientStock,
            ErrorKind::Conflict,
        ] {
            let status = kind.http_status();

            assert!((400..500).contains(&status), "{kind} mapped to {status}");
        }

        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::Conflict.http_status(), 409);
    }

    #[test]
    fn io_maps_to_5xx() {
        assert_eq!(ErrorKind::Io.http_status(), 500);
    }
}
