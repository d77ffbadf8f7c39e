//! A single named, typed, attributed resource quantity.
//!
//! A [`Resource`] pairs a payload ([`Value`]) with the attributes that
//! decide its identity in a ledger: role, dynamic reservation, disk
//! persistence and the revocable marker. Two resources can only be merged
//! or subtracted when those attributes line up; see [`Resource::addable`]
//! and [`Resource::subtractable`].

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ResourceErrorKind, ResourceResult};
use crate::ranges::{Range, Ranges};
use crate::raw::RawResource;
use crate::scalar::Scalar;
use crate::set::Set;

/// The unreserved default role.
pub const DEFAULT_ROLE: &str = "*";

/// The only resource name allowed to carry [`DiskInfo`].
pub const DISK_RESOURCE: &str = "disk";

// ── Attributes ─────────────────────────────────────────────────────

/// Dynamic reservation of a resource on behalf of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationInfo {
    pub principal: String,
}

impl ReservationInfo {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
        }
    }
}

/// Identity of a persistent volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persistence {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolumeMode {
    Ro,
    Rw,
}

impl fmt::Display for VolumeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ro => f.write_str("ro"),
            Self::Rw => f.write_str("rw"),
        }
    }
}

/// How a disk resource is mounted into a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub container_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<VolumeMode>,
}

/// Disk-specific attributes. Only legal on resources named `disk`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence: Option<Persistence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Volume>,
}

impl DiskInfo {
    pub fn persistent(id: impl Into<String>) -> Self {
        Self {
            persistence: Some(Persistence { id: id.into() }),
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Compares persistence ids only. The volume describes how the disk is
    /// used, not which disk it is, and may differ between uses.
    pub fn equivalent(left: Option<&DiskInfo>, right: Option<&DiskInfo>) -> bool {
        match (left, right) {
            (None, None) => true,
            (Some(a), Some(b)) => match (&a.persistence, &b.persistence) {
                (None, None) => true,
                (Some(pa), Some(pb)) => pa.id == pb.id,
                _ => false,
            },
            _ => false,
        }
    }
}

// ── Payload ────────────────────────────────────────────────────────

/// Discriminant of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Scalar,
    Ranges,
    Set,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("SCALAR"),
            Self::Ranges => f.write_str("RANGES"),
            Self::Set => f.write_str("SET"),
        }
    }
}

/// The quantity carried by a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Ranges(Ranges),
    Set(Set),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Scalar(_) => ValueType::Scalar,
            Self::Ranges(_) => ValueType::Ranges,
            Self::Set(_) => ValueType::Set,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_zero(),
            Self::Ranges(r) => r.is_empty(),
            Self::Set(s) => s.is_empty(),
        }
    }

    /// Containment comparison between payloads of the same type. Mismatched
    /// types compare as `Greater` (never contained).
    fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a.compare(b),
            (Self::Ranges(a), Self::Ranges(b)) => a.compare(b),
            (Self::Set(a), Self::Set(b)) => a.compare(b),
            _ => Ordering::Greater,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Ranges(r) => write!(f, "{r}"),
            Self::Set(s) => write!(f, "{s}"),
        }
    }
}

// ── Resource ───────────────────────────────────────────────────────

/// A single resource quantity, e.g. `cpus(*):4` or `ports(*):[31000-32000]`.
///
/// Resources are plain values. `add` and `subtract` mutate in place and
/// must not be called concurrently on the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResource", into = "RawResource")]
pub struct Resource {
    pub name: String,
    pub role: String,
    pub reservation: Option<ReservationInfo>,
    pub disk: Option<DiskInfo>,
    pub revocable: bool,
    pub value: Value,
}

impl Resource {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            role: DEFAULT_ROLE.to_string(),
            reservation: None,
            disk: None,
            revocable: false,
            value,
        }
    }

    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, Value::Scalar(Scalar::new(value)))
    }

    pub fn ranges<I>(name: impl Into<String>, ranges: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        Self::new(
            name,
            Value::Ranges(ranges.into_iter().map(Range::from).collect()),
        )
    }

    pub fn set<I, S>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, Value::Set(items.into_iter().collect()))
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_reservation(mut self, principal: impl Into<String>) -> Self {
        self.reservation = Some(ReservationInfo::new(principal));
        self
    }

    pub fn with_disk(mut self, disk: DiskInfo) -> Self {
        self.disk = Some(disk);
        self
    }

    pub fn with_revocable(mut self) -> Self {
        self.revocable = true;
        self
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ranges(&self) -> Option<&Ranges> {
        match &self.value {
            Value::Ranges(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Set> {
        match &self.value {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Checks the resource invariants, returning the first violation.
    ///
    /// Never mutates the resource. Type and payload agreement is structural
    /// here; wire-shaped input is checked by `Resource::try_from(RawResource)`.
    pub fn validate(&self) -> ResourceResult<()> {
        if self.name.is_empty() {
            return Err(ResourceErrorKind::IllegalName.error(""));
        }

        match &self.value {
            Value::Scalar(s) if s.value() < 0.0 || s.value().is_nan() => {
                return Err(ResourceErrorKind::IllegalScalar.error("value < 0"));
            }
            Value::Ranges(r) => {
                if let Some(defect) = r.defect() {
                    return Err(ResourceErrorKind::IllegalRanges.error(defect));
                }
            }
            Value::Set(s) if s.has_duplicates() => {
                return Err(ResourceErrorKind::IllegalSet.error("duplicated elements"));
            }
            _ => {}
        }

        if self.disk.is_some() && self.name != DISK_RESOURCE {
            return Err(ResourceErrorKind::IllegalDisk.error(format!(
                "DiskInfo should not be set for \"{}\" resource",
                self.name
            )));
        }

        if self.role == DEFAULT_ROLE && self.reservation.is_some() {
            return Err(ResourceErrorKind::IllegalReservation
                .error("default role cannot be dynamically assigned"));
        }

        Ok(())
    }

    /// Name, type, role, reservation, disk identity and revocability agree.
    fn same_identity(&self, other: &Resource) -> bool {
        self.name == other.name
            && self.value_type() == other.value_type()
            && self.role == other.role
            && self.reservation == other.reservation
            && DiskInfo::equivalent(self.disk.as_ref(), other.disk.as_ref())
            && self.revocable == other.revocable
    }

    /// Deep semantic equality. Volume configuration is ignored; ranges and
    /// sets are compared as sets.
    pub fn equivalent(&self, other: &Resource) -> bool {
        if !self.same_identity(other) {
            return false;
        }
        match (&self.value, &other.value) {
            (Value::Scalar(a), Value::Scalar(b)) => a.compare(b) == Ordering::Equal,
            (Value::Ranges(a), Value::Ranges(b)) => a.equivalent(b),
            (Value::Set(a), Value::Set(b)) => a.compare(b) == Ordering::Equal,
            _ => false,
        }
    }

    /// True if `other` can be merged into this resource as one entry.
    /// Persistent volumes are never merge targets.
    pub fn addable(&self, other: &Resource) -> bool {
        self.same_identity(other) && !self.is_persistent_volume()
    }

    /// True if `other` can be taken out of this resource. Set subtraction is
    /// always well defined, so this does not imply [`Resource::contains`].
    /// A persistent volume can only be subtracted by an equivalent volume.
    pub fn subtractable(&self, other: &Resource) -> bool {
        if !self.same_identity(other) {
            return false;
        }
        !self.is_persistent_volume() || self.equivalent(other)
    }

    /// True if `other` is subtractable and its quantity fits within this one.
    pub fn contains(&self, other: &Resource) -> bool {
        self.subtractable(other) && other.value.compare(&self.value) != Ordering::Greater
    }

    /// Adds `other`'s payload to this resource in place.
    ///
    /// # Panics
    ///
    /// Panics if the payload types differ. Check [`Resource::addable`]
    /// first.
    pub fn add(&mut self, other: &Resource) {
        let expected = self.value_type();
        match (&mut self.value, &other.value) {
            (Value::Scalar(a), Value::Scalar(b)) => *a = a.add(b),
            (Value::Ranges(a), Value::Ranges(b)) => *a = a.add(b),
            (Value::Set(a), Value::Set(b)) => *a = a.add(b),
            (_, v) => panic!("expected type {expected} instead of {}", v.value_type()),
        }
    }

    /// Subtracts `other`'s payload from this resource in place. The result
    /// may be negative (scalars) or empty; callers re-validate.
    ///
    /// # Panics
    ///
    /// Panics if the payload types differ. Check
    /// [`Resource::subtractable`] first.
    pub fn subtract(&mut self, other: &Resource) {
        let expected = self.value_type();
        match (&mut self.value, &other.value) {
            (Value::Scalar(a), Value::Scalar(b)) => *a = a.subtract(b),
            (Value::Ranges(a), Value::Ranges(b)) => *a = a.subtract(b),
            (Value::Set(a), Value::Set(b)) => *a = a.subtract(b),
            (_, v) => panic!("expected type {expected} instead of {}", v.value_type()),
        }
    }

    /// Zero scalar, no ranges, or no set items.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Neither statically (non-default role) nor dynamically reserved.
    pub fn is_unreserved(&self) -> bool {
        self.role == DEFAULT_ROLE && self.reservation.is_none()
    }

    /// With `Some(role)`, true if reserved for that role. With `None`, true
    /// if reserved for any role.
    pub fn is_reserved(&self, role: Option<&str>) -> bool {
        match role {
            Some(role) => !self.is_unreserved() && self.role == role,
            None => !self.is_unreserved(),
        }
    }

    pub fn is_dynamically_reserved(&self) -> bool {
        self.reservation.is_some()
    }

    pub fn is_revocable(&self) -> bool {
        self.revocable
    }

    pub fn is_persistent_volume(&self) -> bool {
        self.disk
            .as_ref()
            .is_some_and(|d| d.persistence.is_some())
    }
}

/// Renders `name(role[, principal])[disk]:value`, for diagnostics only.
impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}", self.name, self.role)?;
        if let Some(reservation) = &self.reservation {
            write!(f, ", {}", reservation.principal)?;
        }
        f.write_str(")")?;

        if let Some(disk) = &self.disk {
            f.write_str("[")?;
            if let Some(p) = &disk.persistence {
                f.write_str(&p.id)?;
            }
            if let Some(v) = &disk.volume {
                f.write_str(":")?;
                if let Some(host) = v.host_path.as_deref().filter(|h| !h.is_empty()) {
                    write!(f, "{host}:")?;
                }
                f.write_str(&v.container_path)?;
                if let Some(mode) = v.mode {
                    write!(f, ":{mode}")?;
                }
            }
            f.write_str("]")?;
        }

        write!(f, ":{}", self.value)
    }
}
