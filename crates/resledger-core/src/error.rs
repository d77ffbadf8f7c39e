//! Resource validation errors.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::resource::Resource;

/// Result type alias for resource validation.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// The invariant a resource violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceErrorKind {
    IllegalName,
    IllegalType,
    UnsupportedType,
    IllegalScalar,
    IllegalRanges,
    IllegalSet,
    IllegalDisk,
    IllegalReservation,
}

impl ResourceErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::IllegalName => "missing or illegal resource name",
            Self::IllegalType => "missing or illegal resource type",
            Self::UnsupportedType => "unsupported resource type",
            Self::IllegalScalar => "illegal scalar resource",
            Self::IllegalRanges => "illegal ranges resource",
            Self::IllegalSet => "illegal set resource",
            Self::IllegalDisk => "illegal disk resource",
            Self::IllegalReservation => "illegal resource reservation",
        }
    }

    /// Build an error of this kind. An empty `detail` yields the bare kind
    /// message as the reason.
    pub fn error(self, detail: impl Into<String>) -> ResourceError {
        let detail = detail.into();
        let reason = if detail.is_empty() {
            self.message().to_string()
        } else {
            format!("{}: {detail}", self.message())
        };
        ResourceError {
            kind: self,
            reason,
            resource: None,
        }
    }
}

impl fmt::Display for ResourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A resource failed validation.
#[derive(Debug, Clone, Error)]
#[error("resource error: {reason}")]
pub struct ResourceError {
    kind: ResourceErrorKind,
    reason: String,
    resource: Option<Box<Resource>>,
}

impl ResourceError {
    pub fn kind(&self) -> ResourceErrorKind {
        self.kind
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The offending resource, when the caller attached one.
    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_deref()
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(Box::new(resource));
        self
    }
}

/// True if `err`, or any error in its source chain, is a [`ResourceError`].
pub fn is_resource_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<ResourceError>() {
            return true;
        }
        current = e.source();
    }
    false
}
