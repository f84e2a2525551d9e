use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidAssignmentFlag;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(EmployeeId);
id_newtype!(ProjectId);
id_newtype!(ClientId);
id_newtype!(ItemCode);
id_newtype!(SkillId);

/// Client-evaluation status of a finished project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvalStatus {
    #[serde(rename = "완료")]
    Completed,
    #[serde(rename = "미완료")]
    Pending,
}

impl EvalStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "완료",
            Self::Pending => "미완료",
        }
    }
}

impl fmt::Display for EvalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Staffing flag carried on the wire as `project_assignment_yn` (0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum AssignmentStatus {
    Available,
    Assigned,
}

impl AssignmentStatus {
    pub fn is_assigned(self) -> bool {
        self == Self::Assigned
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "투입 가능",
            Self::Assigned => "참여 중",
        }
    }
}

impl TryFrom<i64> for AssignmentStatus {
    type Error = InvalidAssignmentFlag;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Available),
            1 => Ok(Self::Assigned),
            other => Err(InvalidAssignmentFlag(other)),
        }
    }
}

impl From<AssignmentStatus> for i64 {
    fn from(value: AssignmentStatus) -> Self {
        match value {
            AssignmentStatus::Available => 0,
            AssignmentStatus::Assigned => 1,
        }
    }
}

/// Client credit grade.
///
/// The API has served this both as a number and as text. It is kept as text:
/// numbers are rendered with their plain decimal form (`3` -> `"3"`,
/// `2.5` -> `"2.5"`) and the value always serializes back as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "GradeRepr", into = "String")]
pub struct Grade(String);

impl Grade {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Grade> for String {
    fn from(value: Grade) -> Self {
        value.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GradeRepr {
    Text(String),
    Whole(i64),
    Fractional(f64),
}

impl From<GradeRepr> for Grade {
    fn from(value: GradeRepr) -> Self {
        match value {
            GradeRepr::Text(text) => Self(text.trim().to_string()),
            GradeRepr::Whole(n) => Self(n.to_string()),
            GradeRepr::Fractional(n) => Self(n.to_string()),
        }
    }
}
