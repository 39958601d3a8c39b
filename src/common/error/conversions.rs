//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the unified Error type.

use super::types::Error;

impl From<crate::ooxml::opc::error::OpcError> for Error {
    fn from(err: crate::ooxml::opc::error::OpcError) -> Self {
        match err {
            crate::ooxml::opc::error::OpcError::PackageNotFound(path) => {
                Error::NotFound(path.into())
            },
            crate::ooxml::opc::error::OpcError::IoError(e) => Error::Io(e),
            other => Error::Ooxml(other.into()),
        }
    }
}

impl From<serde_saphyr::Error> for Error {
    fn from(err: serde_saphyr::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::error::OpcError;

    #[test]
    fn test_missing_package_maps_to_not_found() {
        let err: Error = OpcError::PackageNotFound("/tmp/none.pptx".to_string()).into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_xml_error_is_internal() {
        let err: Error = OpcError::XmlError("bad".to_string()).into();
        assert!(!err.is_not_found());
        assert!(matches!(err, Error::Ooxml(_)));
    }
}
