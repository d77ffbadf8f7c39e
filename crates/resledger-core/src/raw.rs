//! Wire-shaped resources, as decoded from an offer before validation.
//!
//! [`RawResource`] mirrors the message layout: a numeric type discriminant
//! next to three optional payload fields. Converting it into a
//! [`Resource`] checks that exactly the payload named by the discriminant
//! is present, then runs [`Resource::validate`].

use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, ResourceErrorKind};
use crate::ranges::{Range, Ranges};
use crate::resource::{DEFAULT_ROLE, DiskInfo, ReservationInfo, Resource, Value};
use crate::scalar::Scalar;
use crate::set::Set;

pub const TYPE_SCALAR: i32 = 0;
pub const TYPE_RANGES: i32 = 1;
pub const TYPE_SET: i32 = 2;
/// Known to the protocol but not supported as a resource payload.
pub const TYPE_TEXT: i32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScalar {
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRanges {
    #[serde(default)]
    pub range: Vec<Range>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSet {
    #[serde(default)]
    pub item: Vec<String>,
}

/// Presence marker; carries no payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocableInfo {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResource {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<RawScalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<RawRanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<RawSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<ReservationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocable: Option<RevocableInfo>,
}

impl TryFrom<RawResource> for Resource {
    type Error = ResourceError;

    fn try_from(raw: RawResource) -> Result<Self, Self::Error> {
        if raw.name.is_empty() {
            return Err(ResourceErrorKind::IllegalName.error(""));
        }

        let value = match (raw.value_type, raw.scalar, raw.ranges, raw.set) {
            (TYPE_SCALAR, Some(s), None, None) => Value::Scalar(Scalar::new(s.value)),
            (TYPE_SCALAR, ..) => return Err(ResourceErrorKind::IllegalScalar.error("")),
            (TYPE_RANGES, None, Some(r), None) => Value::Ranges(Ranges::new(r.range)),
            (TYPE_RANGES, ..) => return Err(ResourceErrorKind::IllegalRanges.error("")),
            (TYPE_SET, None, None, Some(s)) => Value::Set(Set::new(s.item)),
            (TYPE_SET, ..) => return Err(ResourceErrorKind::IllegalSet.error("")),
            (TYPE_TEXT, ..) => return Err(ResourceErrorKind::UnsupportedType.error("")),
            (other, ..) => {
                return Err(ResourceErrorKind::IllegalType.error(format!("unknown type {other}")));
            }
        };

        let resource = Resource {
            name: raw.name,
            role: raw.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            reservation: raw.reservation,
            disk: raw.disk,
            revocable: raw.revocable.is_some(),
            value,
        };
        resource.validate()?;
        Ok(resource)
    }
}

impl From<Resource> for RawResource {
    fn from(r: Resource) -> Self {
        let mut raw = RawResource {
            name: r.name,
            value_type: TYPE_SCALAR,
            scalar: None,
            ranges: None,
            set: None,
            role: Some(r.role),
            reservation: r.reservation,
            disk: r.disk,
            revocable: r.revocable.then(RevocableInfo::default),
        };
        match r.value {
            Value::Scalar(s) => {
                raw.scalar = Some(RawScalar { value: s.value() });
            }
            Value::Ranges(ranges) => {
                raw.value_type = TYPE_RANGES;
                raw.ranges = Some(RawRanges {
                    range: ranges.into_inner(),
                });
            }
            Value::Set(set) => {
                raw.value_type = TYPE_SET;
                raw.set = Some(RawSet {
                    item: set.items().to_vec(),
                });
            }
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, value_type: i32) -> RawResource {
        RawResource {
            name: name.to_string(),
            value_type,
            ..Default::default()
        }
    }

    #[test]
    fn converts_scalar() {
        let mut r = raw("cpus", TYPE_SCALAR);
        r.scalar = Some(RawScalar { value: 2.0 });
        let res = Resource::try_from(r).unwrap();
        assert_eq!(res, Resource::scalar("cpus", 2.0));
    }

    #[test]
    fn rejects_unknown_and_unsupported_types() {
        let err = Resource::try_from(raw("cpus", 42)).unwrap_err();
        assert_eq!(err.kind(), ResourceErrorKind::IllegalType);

        let err = Resource::try_from(raw("cpus", TYPE_TEXT)).unwrap_err();
        assert_eq!(err.kind(), ResourceErrorKind::UnsupportedType);
    }

    #[test]
    fn rejects_missing_or_extra_payload() {
        let err = Resource::try_from(raw("cpus", TYPE_SCALAR)).unwrap_err();
        assert_eq!(err.kind(), ResourceErrorKind::IllegalScalar);

        let mut r = raw("ports", TYPE_RANGES);
        r.ranges = Some(RawRanges::default());
        r.set = Some(RawSet::default());
        let err = Resource::try_from(r).unwrap_err();
        assert_eq!(err.kind(), ResourceErrorKind::IllegalRanges);

        let mut r = raw("gpus", TYPE_SET);
        r.scalar = Some(RawScalar { value: 1.0 });
        let err = Resource::try_from(r).unwrap_err();
        assert_eq!(err.kind(), ResourceErrorKind::IllegalSet);
    }

    #[test]
    fn runs_full_validation() {
        let mut r = raw("cpus", TYPE_SCALAR);
        r.scalar = Some(RawScalar { value: 1.0 });
        r.reservation = Some(ReservationInfo::new("ops"));
        let err = Resource::try_from(r).unwrap_err();
        assert_eq!(err.kind(), ResourceErrorKind::IllegalReservation);
    }

    #[test]
    fn decodes_offer_json() {
        let json = r#"{
            "name": "ports",
            "type": 1,
            "ranges": {"range": [{"begin": 31000, "end": 32000}]},
            "role": "web",
            "revocable": {}
        }"#;
        let r: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(r.to_string(), "ports(web):[31000-32000]");
        assert!(r.is_revocable());
    }

    #[test]
    fn decode_rejects_invalid_offer() {
        let json = r#"{"name": "gpus", "type": 2, "set": {"item": ["a", "a"]}}"#;
        let err = serde_json::from_str::<Resource>(json).unwrap_err();
        assert!(err.to_string().contains("duplicated elements"));
    }

    #[test]
    fn encodes_set_payload() {
        let value = serde_json::to_value(Resource::set("gpus", ["a", "b"])).unwrap();
        assert_eq!(value["type"], 2);
        assert_eq!(value["set"]["item"][1], "b");
        assert_eq!(value["role"], "*");
        assert!(value.get("scalar").is_none());
    }
}
