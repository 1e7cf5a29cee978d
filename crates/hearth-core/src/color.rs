use crate::model::FamilyMember;

pub const UNASSIGNED_COLOR: &str = "#9CA3AF";
pub const SYSTEM_COLOR: &str = "#D97452";

/// Who an item belongs to, as far as coloring is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberColorRef<'a> {
    Unassigned,
    /// The shared "Everyone" member.
    System,
    Member { color: Option<&'a str> },
}

impl<'a> MemberColorRef<'a> {
    #[must_use]
    pub fn from_member(member: Option<&'a FamilyMember>) -> Self {
        match member {
            None => Self::Unassigned,
            Some(member) if member.is_system => Self::System,
            Some(member) => Self::Member {
                color: member.color.as_deref(),
            },
        }
    }
}

/// The system check runs before the stored color is looked at.
#[must_use]
pub fn resolve_color<'a>(member: MemberColorRef<'a>) -> &'a str {
    match member {
        MemberColorRef::Unassigned => UNASSIGNED_COLOR,
        MemberColorRef::System => SYSTEM_COLOR,
        MemberColorRef::Member { color } => color
            .filter(|color| !color.trim().is_empty())
            .unwrap_or(UNASSIGNED_COLOR),
    }
}
