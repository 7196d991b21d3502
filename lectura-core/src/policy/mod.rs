//! Centralized role policy guard.
//!
//! `enforce` is a pure decision over the caller's profile, the requested
//! action and the resource scope. Facts that need a store lookup are gathered
//! by the calling service and passed in through [`ResourceScope`].

use crate::domain::{Profile, Role, StringUuid};
use crate::error::AppError;

pub type PolicyResult<T> = std::result::Result<T, AppError>;

/// Authenticated caller, resolved once per request and passed explicitly to
/// every service call
#[derive(Debug, Clone, PartialEq)]
pub struct CallerContext {
    pub profile: Profile,
}

impl CallerContext {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn id(&self) -> StringUuid {
        self.profile.id
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    InstitutionRead,
    InstitutionWrite,
    UserRead,
    UserWrite,
    ProfileSelf,
    ClassroomList,
    ClassroomRead,
    TeacherList,
    TeacherRemove,
    SessionPublish,
    SessionRead,
    SessionClose,
    AttemptCodeRead,
    AttemptCodeRegenerate,
    TemplateWrite,
    TutorAssignmentRemove,
    TutorChildUpdate,
    StudentHistoryRead,
}

impl PolicyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyAction::InstitutionRead => "institution_read",
            PolicyAction::InstitutionWrite => "institution_write",
            PolicyAction::UserRead => "user_read",
            PolicyAction::UserWrite => "user_write",
            PolicyAction::ProfileSelf => "profile_self",
            PolicyAction::ClassroomList => "classroom_list",
            PolicyAction::ClassroomRead => "classroom_read",
            PolicyAction::TeacherList => "teacher_list",
            PolicyAction::TeacherRemove => "teacher_remove",
            PolicyAction::SessionPublish => "session_publish",
            PolicyAction::SessionRead => "session_read",
            PolicyAction::SessionClose => "session_close",
            PolicyAction::AttemptCodeRead => "attempt_code_read",
            PolicyAction::AttemptCodeRegenerate => "attempt_code_regenerate",
            PolicyAction::TemplateWrite => "template_write",
            PolicyAction::TutorAssignmentRemove => "tutor_assignment_remove",
            PolicyAction::TutorChildUpdate => "tutor_child_update",
            PolicyAction::StudentHistoryRead => "student_history_read",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceScope {
    Global,
    /// A specific institution
    Institution(StringUuid),
    /// Optional institution filter requested by the caller
    InstitutionFilter(Option<StringUuid>),
    Classroom {
        institution_id: StringUuid,
    },
    Session {
        institution_id: StringUuid,
        owner_id: StringUuid,
    },
    Template {
        institution_id: Option<StringUuid>,
    },
    /// Change of another profile's assignment; `requested_role` is the role
    /// being written, `None` when the role is left unchanged
    RoleChange {
        target_id: StringUuid,
        requested_role: Option<Role>,
    },
    Profile(StringUuid),
    Student {
        caller_teaches_student: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyInput {
    pub action: PolicyAction,
    pub scope: ResourceScope,
}

impl PolicyInput {
    pub fn new(action: PolicyAction, scope: ResourceScope) -> Self {
        Self { action, scope }
    }
}

/// Row scope the store operation must apply after an ALLOW
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    Unrestricted,
    Institution(StringUuid),
    AssignedTeacher(StringUuid),
    OwnedSessions(StringUuid),
    SelfOnly(StringUuid),
}

pub fn enforce(profile: &Profile, input: &PolicyInput) -> PolicyResult<ScopeFilter> {
    let decision = decide(profile, input);
    if let Err(AppError::Unauthorized(reason)) = &decision {
        tracing::debug!(
            profile_id = %profile.id,
            role = %profile.role,
            action = input.action.as_str(),
            reason = %reason,
            "Policy denied"
        );
        metrics::counter!(
            "lectura_policy_denials_total",
            "action" => input.action.as_str()
        )
        .increment(1);
    }
    decision
}

/// Like [`enforce`], but reports a denial as `NotFound` so that reads never
/// reveal resources outside the caller's scope
pub fn enforce_read(
    profile: &Profile,
    input: &PolicyInput,
    not_found: impl FnOnce() -> String,
) -> PolicyResult<ScopeFilter> {
    match enforce(profile, input) {
        Err(AppError::Unauthorized(_)) => Err(AppError::NotFound(not_found())),
        other => other,
    }
}

fn decide(profile: &Profile, input: &PolicyInput) -> PolicyResult<ScopeFilter> {
    match input.action {
        PolicyAction::InstitutionRead | PolicyAction::InstitutionWrite | PolicyAction::UserRead => {
            require_master(profile)
        }
        PolicyAction::UserWrite => {
            let (target_id, requested_role) = match &input.scope {
                ResourceScope::RoleChange {
                    target_id,
                    requested_role,
                } => (*target_id, *requested_role),
                _ => return Err(scope_mismatch(input)),
            };
            require_master(profile)?;
            if target_id == profile.id && requested_role.is_some_and(|r| r != Role::Master) {
                return Err(deny("A master cannot change their own role"));
            }
            Ok(ScopeFilter::Unrestricted)
        }
        PolicyAction::ProfileSelf => {
            let target_id = require_profile_scope(input)?;
            require_self(profile, target_id)
        }
        PolicyAction::TutorChildUpdate => {
            let target_id = require_profile_scope(input)?;
            if profile.role != Role::Tutor {
                return Err(deny("Only tutors can update child information"));
            }
            require_self(profile, target_id)
        }
        PolicyAction::ClassroomList => {
            let filter = match &input.scope {
                ResourceScope::InstitutionFilter(filter) => *filter,
                _ => return Err(scope_mismatch(input)),
            };
            match profile.role {
                Role::Master => Ok(filter
                    .map(ScopeFilter::Institution)
                    .unwrap_or(ScopeFilter::Unrestricted)),
                Role::Admin => {
                    let own = require_institution(profile)?;
                    match filter {
                        Some(requested) if requested != own => {
                            Err(deny("Admins can only list classrooms of their institution"))
                        }
                        _ => Ok(ScopeFilter::Institution(own)),
                    }
                }
                Role::Maestro => Ok(ScopeFilter::AssignedTeacher(profile.id)),
                Role::Tutor => Err(deny("Tutors cannot list classrooms")),
            }
        }
        PolicyAction::ClassroomRead => {
            let institution_id = require_classroom_scope(input)?;
            match profile.role {
                Role::Master => Ok(ScopeFilter::Unrestricted),
                Role::Admin => require_same_institution(profile, institution_id),
                Role::Maestro => Ok(ScopeFilter::AssignedTeacher(profile.id)),
                Role::Tutor => Err(deny("Tutors cannot read classrooms")),
            }
        }
        PolicyAction::TeacherList => {
            let institution_id = match &input.scope {
                ResourceScope::Institution(id) => *id,
                _ => return Err(scope_mismatch(input)),
            };
            match profile.role {
                Role::Master => Ok(ScopeFilter::Unrestricted),
                Role::Admin => require_same_institution(profile, institution_id),
                _ => Err(deny("Admin access required to list teachers")),
            }
        }
        PolicyAction::TeacherRemove => {
            let institution_id = require_classroom_scope(input)?;
            match profile.role {
                Role::Master => Ok(ScopeFilter::Unrestricted),
                Role::Admin => require_same_institution(profile, institution_id),
                _ => Err(deny("Admin access required to remove teachers")),
            }
        }
        PolicyAction::SessionPublish => match profile.role {
            Role::Master => Ok(ScopeFilter::Unrestricted),
            Role::Admin => require_institution(profile).map(ScopeFilter::Institution),
            Role::Maestro => {
                require_institution(profile)?;
                Ok(ScopeFilter::OwnedSessions(profile.id))
            }
            Role::Tutor => Err(deny("Tutors cannot publish evaluation sessions")),
        },
        PolicyAction::SessionRead | PolicyAction::SessionClose => {
            let (institution_id, owner_id) = require_session_scope(input)?;
            match profile.role {
                Role::Master => Ok(ScopeFilter::Unrestricted),
                Role::Admin => require_same_institution(profile, institution_id),
                Role::Maestro => require_session_owner(profile, owner_id),
                Role::Tutor => Err(deny("Tutors cannot manage evaluation sessions")),
            }
        }
        PolicyAction::AttemptCodeRead | PolicyAction::AttemptCodeRegenerate => {
            let (_, owner_id) = require_session_scope(input)?;
            match profile.role {
                Role::Maestro => require_session_owner(profile, owner_id),
                _ => Err(deny("Only the session's teacher can manage access codes")),
            }
        }
        PolicyAction::TemplateWrite => {
            let template_institution = match &input.scope {
                ResourceScope::Template { institution_id } => *institution_id,
                _ => return Err(scope_mismatch(input)),
            };
            match profile.role {
                Role::Master => Ok(ScopeFilter::Unrestricted),
                Role::Admin | Role::Maestro => match template_institution {
                    Some(institution_id) => require_same_institution(profile, institution_id),
                    None => Err(deny("Platform templates can only be edited by a master")),
                },
                Role::Tutor => Err(deny("Tutors cannot edit templates")),
            }
        }
        PolicyAction::TutorAssignmentRemove => {
            let caller_teaches_student = match &input.scope {
                ResourceScope::Student {
                    caller_teaches_student,
                } => *caller_teaches_student,
                _ => return Err(scope_mismatch(input)),
            };
            match profile.role {
                Role::Maestro if caller_teaches_student => {
                    Ok(ScopeFilter::AssignedTeacher(profile.id))
                }
                Role::Maestro => Err(deny("Student is not enrolled in one of your classrooms")),
                _ => Err(deny("Only teachers can remove tutor assignments")),
            }
        }
        PolicyAction::StudentHistoryRead => match profile.role {
            Role::Master => Ok(ScopeFilter::Unrestricted),
            Role::Maestro => Ok(ScopeFilter::OwnedSessions(profile.id)),
            _ => Err(deny("Attempt history is restricted to teachers")),
        },
    }
}

fn deny(reason: &str) -> AppError {
    AppError::Unauthorized(reason.to_string())
}

fn scope_mismatch(input: &PolicyInput) -> AppError {
    AppError::Internal(anyhow::anyhow!(
        "Policy action {} received incompatible scope {:?}",
        input.action.as_str(),
        input.scope
    ))
}

fn require_master(profile: &Profile) -> PolicyResult<ScopeFilter> {
    if profile.is_master() {
        Ok(ScopeFilter::Unrestricted)
    } else {
        Err(deny("Master access required"))
    }
}

fn require_self(profile: &Profile, target_id: StringUuid) -> PolicyResult<ScopeFilter> {
    if profile.id == target_id {
        Ok(ScopeFilter::SelfOnly(profile.id))
    } else {
        Err(deny("Access limited to your own profile"))
    }
}

fn require_institution(profile: &Profile) -> PolicyResult<StringUuid> {
    profile
        .institution_id
        .ok_or_else(|| deny("Profile has no institution"))
}

fn require_same_institution(
    profile: &Profile,
    institution_id: StringUuid,
) -> PolicyResult<ScopeFilter> {
    let own = require_institution(profile)?;
    if own == institution_id {
        Ok(ScopeFilter::Institution(own))
    } else {
        Err(deny("Resource belongs to another institution"))
    }
}

fn require_session_owner(profile: &Profile, owner_id: StringUuid) -> PolicyResult<ScopeFilter> {
    if owner_id == profile.id {
        Ok(ScopeFilter::OwnedSessions(profile.id))
    } else {
        Err(deny("Session belongs to another teacher"))
    }
}

fn require_profile_scope(input: &PolicyInput) -> PolicyResult<StringUuid> {
    match &input.scope {
        ResourceScope::Profile(id) => Ok(*id),
        _ => Err(scope_mismatch(input)),
    }
}

fn require_classroom_scope(input: &PolicyInput) -> PolicyResult<StringUuid> {
    match &input.scope {
        ResourceScope::Classroom { institution_id } => Ok(*institution_id),
        _ => Err(scope_mismatch(input)),
    }
}

fn require_session_scope(input: &PolicyInput) -> PolicyResult<(StringUuid, StringUuid)> {
    match &input.scope {
        ResourceScope::Session {
            institution_id,
            owner_id,
        } => Ok((*institution_id, *owner_id)),
        _ => Err(scope_mismatch(input)),
    }
}
