//! API integration test infrastructure
//!
//! In-memory implementations of every repository trait plus the stored
//! procedures, mirroring the visibility and ordering rules of the SQL
//! implementations closely enough to exercise the handlers end to end.

pub mod http;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use lectura_core::domain::{
    AccessCodeRedemption, AttemptHistoryEntry, AttemptRosterEntry, AttemptStatus, Classroom,
    ClassroomFilter, CreateInstitutionInput, EvaluationAttempt, EvaluationSession, Institution,
    Profile, ProfileAssignment, ProfileFilter, ProfileRow, PublishSessionInput, Role,
    SequenceItem, SequenceItemInput, SessionStatus, SoftDeletable, Student, StringUuid, Template,
    UpdateInstitutionInput, VocabularyItem, VocabularyItemInput,
};
use lectura_core::error::{AppError, Result};
use lectura_core::repository::{
    ClassroomRepository, EvaluationProcedures, EvaluationRepository, InstitutionRepository,
    ProfileRepository, StudentRepository, TemplateRepository,
};
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================================================
// Fixtures
// ============================================================================

pub fn test_profile(role: Role, institution_id: Option<StringUuid>) -> Profile {
    Profile {
        role,
        institution_id,
        email: Some(format!("{}@lectura.test", role)),
        full_name: Some(format!("Test {}", role)),
        ..Default::default()
    }
}

pub fn test_institution(name: &str, code: Option<&str>) -> Institution {
    Institution {
        name: name.to_string(),
        code: code.map(str::to_string),
        ..Default::default()
    }
}

pub fn test_classroom(institution_id: StringUuid, grade: i32, name: &str) -> Classroom {
    Classroom {
        institution_id,
        grade,
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn test_student(institution_id: StringUuid, first_name: &str, last_name: &str) -> Student {
    Student {
        institution_id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        national_id: format!("ID-{}-{}", first_name, last_name),
        ..Default::default()
    }
}

// ============================================================================
// Profiles
// ============================================================================

#[derive(Default)]
pub struct TestProfileRepository {
    rows: RwLock<Vec<ProfileRow>>,
}

impl TestProfileRepository {
    pub async fn add(&self, profile: Profile) {
        self.rows.write().await.push(profile.into());
    }

    /// Store a raw directory row, e.g. one with an unrecognized role
    pub async fn add_row(&self, row: ProfileRow) {
        self.rows.write().await.push(row);
    }

    pub async fn get(&self, id: StringUuid) -> Option<ProfileRow> {
        self.rows.read().await.iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl ProfileRepository for TestProfileRepository {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<ProfileRow>> {
        Ok(self.get(id).await)
    }

    async fn list(&self, filter: &ProfileFilter) -> Result<Vec<ProfileRow>> {
        let mut rows: Vec<ProfileRow> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|r| filter.role.map_or(true, |role| r.role == role.as_str()))
            .filter(|r| {
                filter
                    .institution_id
                    .map_or(true, |id| r.institution_id == Some(id))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (&a.full_name, &a.email, a.id).cmp(&(&b.full_name, &b.email, b.id))
        });
        Ok(rows)
    }

    async fn update_assignment(
        &self,
        id: StringUuid,
        assignment: &ProfileAssignment,
    ) -> Result<u64> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.role = assignment.role.as_str().to_string();
                row.institution_id = assignment.institution_id;
                row.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_child_info(
        &self,
        id: StringUuid,
        child_name: Option<String>,
        child_grade: Option<i32>,
    ) -> Result<u64> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.child_name = child_name;
                row.child_grade = child_grade;
                row.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

// ============================================================================
// Institutions
// ============================================================================

#[derive(Default)]
pub struct TestInstitutionRepository {
    institutions: RwLock<Vec<Institution>>,
}

impl TestInstitutionRepository {
    pub async fn add(&self, institution: Institution) {
        self.institutions.write().await.push(institution);
    }

    /// Raw row lookup, including soft-deleted institutions
    pub async fn get_raw(&self, id: StringUuid) -> Option<Institution> {
        self.institutions
            .read()
            .await
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    /// The unique index spans soft-deleted rows as well
    fn code_taken(rows: &[Institution], code: &str, except: Option<StringUuid>) -> bool {
        rows.iter()
            .any(|i| i.code.as_deref() == Some(code) && Some(i.id) != except)
    }
}

#[async_trait]
impl InstitutionRepository for TestInstitutionRepository {
    async fn create(&self, input: &CreateInstitutionInput) -> Result<Institution> {
        let mut rows = self.institutions.write().await;
        if let Some(code) = input.code.as_deref() {
            if Self::code_taken(&rows, code, None) {
                return Err(AppError::Conflict(
                    "An institution with this code already exists".to_string(),
                ));
            }
        }
        let institution = Institution {
            name: input.name.trim().to_string(),
            code: input.code.clone(),
            ..Default::default()
        };
        rows.push(institution.clone());
        Ok(institution)
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Institution>> {
        Ok(self.get_raw(id).await.filter(|i| i.is_visible()))
    }

    async fn list(&self) -> Result<Vec<Institution>> {
        let mut rows: Vec<Institution> = self
            .institutions
            .read()
            .await
            .iter()
            .filter(|i| i.is_visible())
            .cloned()
            .collect();
        rows.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(rows)
    }

    async fn update(&self, id: StringUuid, input: &UpdateInstitutionInput) -> Result<Institution> {
        let mut rows = self.institutions.write().await;
        if let Some(Some(code)) = input.code.as_ref() {
            if Self::code_taken(&rows, code, Some(id)) {
                return Err(AppError::Conflict(
                    "An institution with this code already exists".to_string(),
                ));
            }
        }
        let institution = rows
            .iter_mut()
            .find(|i| i.id == id && i.is_visible())
            .ok_or_else(|| AppError::NotFound(format!("Institution {} not found", id)))?;
        if let Some(name) = &input.name {
            institution.name = name.trim().to_string();
        }
        if let Some(code) = &input.code {
            institution.code = code.clone();
        }
        institution.updated_at = Utc::now();
        Ok(institution.clone())
    }

    async fn soft_delete(&self, id: StringUuid) -> Result<u64> {
        let mut rows = self.institutions.write().await;
        match rows.iter_mut().find(|i| i.id == id && i.is_visible()) {
            Some(institution) => {
                institution.deleted_at = Some(Utc::now());
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

// ============================================================================
// Classrooms
// ============================================================================

#[derive(Debug, Clone)]
struct TeacherAssignment {
    classroom_id: StringUuid,
    teacher_id: StringUuid,
    removed: bool,
}

#[derive(Debug, Clone)]
struct Enrollment {
    classroom_id: StringUuid,
    student_id: StringUuid,
    active: bool,
}

#[derive(Default)]
pub struct TestClassroomRepository {
    classrooms: RwLock<Vec<Classroom>>,
    assignments: RwLock<Vec<TeacherAssignment>>,
    enrollments: RwLock<Vec<Enrollment>>,
}

impl TestClassroomRepository {
    pub async fn add(&self, classroom: Classroom) {
        self.classrooms.write().await.push(classroom);
    }

    pub async fn assign_teacher(&self, classroom_id: StringUuid, teacher_id: StringUuid) {
        self.assignments.write().await.push(TeacherAssignment {
            classroom_id,
            teacher_id,
            removed: false,
        });
    }

    pub async fn enroll(&self, classroom_id: StringUuid, student_id: StringUuid, active: bool) {
        self.enrollments.write().await.push(Enrollment {
            classroom_id,
            student_id,
            active,
        });
    }

    pub async fn active_students(&self, classroom_id: StringUuid) -> Vec<StringUuid> {
        self.enrollments
            .read()
            .await
            .iter()
            .filter(|e| e.classroom_id == classroom_id && e.active)
            .map(|e| e.student_id)
            .collect()
    }
}

#[async_trait]
impl ClassroomRepository for TestClassroomRepository {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Classroom>> {
        Ok(self
            .classrooms
            .read()
            .await
            .iter()
            .find(|c| c.id == id && c.is_visible())
            .cloned())
    }

    async fn list(&self, filter: &ClassroomFilter) -> Result<Vec<Classroom>> {
        let assignments = self.assignments.read().await;
        let mut rows: Vec<Classroom> = self
            .classrooms
            .read()
            .await
            .iter()
            .filter(|c| c.is_visible())
            .filter(|c| filter.institution_id.map_or(true, |id| c.institution_id == id))
            .filter(|c| {
                filter.teacher_id.map_or(true, |teacher_id| {
                    assignments.iter().any(|a| {
                        a.classroom_id == c.id && a.teacher_id == teacher_id && !a.removed
                    })
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.grade, &a.name, a.id).cmp(&(b.grade, &b.name, b.id)));
        Ok(rows)
    }

    async fn is_teacher_assigned(
        &self,
        classroom_id: StringUuid,
        teacher_id: StringUuid,
    ) -> Result<bool> {
        Ok(self.assignments.read().await.iter().any(|a| {
            a.classroom_id == classroom_id && a.teacher_id == teacher_id && !a.removed
        }))
    }

    async fn remove_teacher(
        &self,
        classroom_id: StringUuid,
        teacher_id: StringUuid,
    ) -> Result<u64> {
        let mut assignments = self.assignments.write().await;
        let mut affected = 0;
        for a in assignments.iter_mut().filter(|a| {
            a.classroom_id == classroom_id && a.teacher_id == teacher_id && !a.removed
        }) {
            a.removed = true;
            affected += 1;
        }
        Ok(affected)
    }

    async fn teacher_has_active_student(
        &self,
        teacher_id: StringUuid,
        student_id: StringUuid,
    ) -> Result<bool> {
        let assignments = self.assignments.read().await;
        let enrollments = self.enrollments.read().await;
        Ok(assignments
            .iter()
            .filter(|a| a.teacher_id == teacher_id && !a.removed)
            .any(|a| {
                enrollments.iter().any(|e| {
                    e.classroom_id == a.classroom_id && e.student_id == student_id && e.active
                })
            }))
    }
}

// ============================================================================
// Students
// ============================================================================

#[derive(Debug, Clone)]
struct TutorLink {
    student_id: StringUuid,
    tutor_id: StringUuid,
    removed: bool,
}

#[derive(Default)]
pub struct TestStudentRepository {
    students: RwLock<Vec<Student>>,
    tutors: RwLock<Vec<TutorLink>>,
}

impl TestStudentRepository {
    pub async fn add(&self, student: Student) {
        self.students.write().await.push(student);
    }

    pub async fn assign_tutor(&self, student_id: StringUuid, tutor_id: StringUuid) {
        self.tutors.write().await.push(TutorLink {
            student_id,
            tutor_id,
            removed: false,
        });
    }

    pub async fn has_tutor(&self, student_id: StringUuid, tutor_id: StringUuid) -> bool {
        self.tutors
            .read()
            .await
            .iter()
            .any(|t| t.student_id == student_id && t.tutor_id == tutor_id && !t.removed)
    }

    pub async fn get(&self, id: StringUuid) -> Option<Student> {
        self.students
            .read()
            .await
            .iter()
            .find(|s| s.id == id && s.is_visible())
            .cloned()
    }
}

#[async_trait]
impl StudentRepository for TestStudentRepository {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Student>> {
        Ok(self.get(id).await)
    }

    async fn remove_tutor_assignment(
        &self,
        student_id: StringUuid,
        tutor_id: StringUuid,
    ) -> Result<u64> {
        let mut tutors = self.tutors.write().await;
        let mut affected = 0;
        for link in tutors
            .iter_mut()
            .filter(|t| t.student_id == student_id && t.tutor_id == tutor_id && !t.removed)
        {
            link.removed = true;
            affected += 1;
        }
        Ok(affected)
    }
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Default)]
pub struct TestTemplateRepository {
    templates: RwLock<Vec<Template>>,
    sequence_items: RwLock<Vec<SequenceItem>>,
    vocabulary_items: RwLock<Vec<VocabularyItem>>,
}

impl TestTemplateRepository {
    pub async fn add(&self, template: Template) {
        self.templates.write().await.push(template);
    }

    pub async fn sequence_count(&self, template_id: StringUuid) -> usize {
        self.sequence_items
            .read()
            .await
            .iter()
            .filter(|i| i.template_id == template_id)
            .count()
    }
}

#[async_trait]
impl TemplateRepository for TestTemplateRepository {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Template>> {
        Ok(self
            .templates
            .read()
            .await
            .iter()
            .find(|t| t.id == id && t.is_visible())
            .cloned())
    }

    async fn add_sequence_items(
        &self,
        template_id: StringUuid,
        items: &[SequenceItemInput],
    ) -> Result<Vec<SequenceItem>> {
        let created: Vec<SequenceItem> = items
            .iter()
            .map(|item| SequenceItem {
                id: StringUuid::new_v4(),
                template_id,
                position: item.position,
                content: item.content.clone(),
                created_at: Utc::now(),
            })
            .collect();
        self.sequence_items
            .write()
            .await
            .extend(created.iter().cloned());
        Ok(created)
    }

    async fn add_vocabulary_items(
        &self,
        template_id: StringUuid,
        items: &[VocabularyItemInput],
    ) -> Result<Vec<VocabularyItem>> {
        let created: Vec<VocabularyItem> = items
            .iter()
            .map(|item| VocabularyItem {
                id: StringUuid::new_v4(),
                template_id,
                word: item.word.clone(),
                definition: item.definition.clone(),
                created_at: Utc::now(),
            })
            .collect();
        self.vocabulary_items
            .write()
            .await
            .extend(created.iter().cloned());
        Ok(created)
    }
}

// ============================================================================
// Evaluation sessions, attempts and access codes
// ============================================================================

#[derive(Debug, Clone)]
struct StoredCode {
    attempt_id: StringUuid,
    /// Kept verbatim here; the SQL procedure stores a SHA-256 digest
    code: String,
    issued_at: chrono::DateTime<Utc>,
    revoked: bool,
}

/// Shared by the evaluation repository and the procedure double so that
/// procedure writes are visible to repository reads
#[derive(Default)]
pub struct EvaluationStore {
    sessions: RwLock<Vec<EvaluationSession>>,
    attempts: RwLock<Vec<EvaluationAttempt>>,
    codes: RwLock<Vec<StoredCode>>,
}

impl EvaluationStore {
    pub async fn add_session(&self, session: EvaluationSession) {
        self.sessions.write().await.push(session);
    }

    pub async fn add_attempt(&self, attempt: EvaluationAttempt) {
        self.attempts.write().await.push(attempt);
    }

    pub async fn session(&self, id: StringUuid) -> Option<EvaluationSession> {
        self.sessions.read().await.iter().find(|s| s.id == id).cloned()
    }

    pub async fn attempts_of(&self, session_id: StringUuid) -> Vec<EvaluationAttempt> {
        self.attempts
            .read()
            .await
            .iter()
            .filter(|a| a.session_id == session_id)
            .cloned()
            .collect()
    }

    pub async fn active_code_count(&self, attempt_id: StringUuid) -> usize {
        self.codes
            .read()
            .await
            .iter()
            .filter(|c| c.attempt_id == attempt_id && !c.revoked)
            .count()
    }
}

pub struct TestEvaluationRepository {
    store: Arc<EvaluationStore>,
    students: Arc<TestStudentRepository>,
}

impl TestEvaluationRepository {
    pub fn new(store: Arc<EvaluationStore>, students: Arc<TestStudentRepository>) -> Self {
        Self { store, students }
    }
}

#[async_trait]
impl EvaluationRepository for TestEvaluationRepository {
    async fn find_session(&self, id: StringUuid) -> Result<Option<EvaluationSession>> {
        Ok(self.store.session(id).await.filter(|s| s.is_visible()))
    }

    async fn close_session(&self, id: StringUuid, actor_id: StringUuid) -> Result<u64> {
        let mut sessions = self.store.sessions.write().await;
        match sessions
            .iter_mut()
            .find(|s| s.id == id && s.is_visible() && s.status == SessionStatus::Open)
        {
            Some(session) => {
                session.status = SessionStatus::Closed;
                session.closed_at = Some(Utc::now());
                session.updated_by = Some(actor_id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_attempt(&self, id: StringUuid) -> Result<Option<EvaluationAttempt>> {
        Ok(self
            .store
            .attempts
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_session_attempts(
        &self,
        session_id: StringUuid,
    ) -> Result<Vec<AttemptRosterEntry>> {
        let codes = self.store.codes.read().await.clone();
        let mut entries = Vec::new();
        for attempt in self.store.attempts_of(session_id).await {
            let Some(student) = self.students.get(attempt.student_id).await else {
                continue;
            };
            let code_issued_at = codes
                .iter()
                .find(|c| c.attempt_id == attempt.id && !c.revoked)
                .map(|c| c.issued_at);
            entries.push(AttemptRosterEntry {
                attempt_id: attempt.id,
                student_id: student.id,
                student_first_name: student.first_name,
                student_last_name: student.last_name,
                status: attempt.status,
                score_percent: attempt.score_percent,
                submitted_at: attempt.submitted_at,
                code_issued_at,
            });
        }
        entries.sort_by(|a, b| {
            (&a.student_last_name, &a.student_first_name, a.attempt_id).cmp(&(
                &b.student_last_name,
                &b.student_first_name,
                b.attempt_id,
            ))
        });
        Ok(entries)
    }

    async fn list_student_attempts(
        &self,
        student_id: StringUuid,
        owner_id: Option<StringUuid>,
    ) -> Result<Vec<AttemptHistoryEntry>> {
        let sessions = self.store.sessions.read().await;
        let mut entries: Vec<AttemptHistoryEntry> = self
            .store
            .attempts
            .read()
            .await
            .iter()
            .filter(|a| a.student_id == student_id)
            .filter_map(|a| {
                let session = sessions
                    .iter()
                    .find(|s| s.id == a.session_id && s.is_visible())?;
                if owner_id.is_some_and(|owner| session.teacher_profile_id != owner) {
                    return None;
                }
                Some(AttemptHistoryEntry {
                    attempt_id: a.id,
                    session_id: session.id,
                    classroom_id: session.classroom_id,
                    teacher_profile_id: session.teacher_profile_id,
                    session_status: session.status,
                    status: a.status,
                    score_percent: a.score_percent,
                    correct_count: a.correct_count,
                    total_questions: a.total_questions,
                    reading_time_ms: a.reading_time_ms,
                    submitted_at: a.submitted_at,
                    created_at: a.created_at,
                })
            })
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.attempt_id.cmp(&b.attempt_id)));
        Ok(entries)
    }

    async fn find_redeemable_attempt(&self, code: &str) -> Result<Option<AccessCodeRedemption>> {
        let now = Utc::now();
        let codes = self.store.codes.read().await;
        let Some(stored) = codes.iter().find(|c| c.code == code && !c.revoked) else {
            return Ok(None);
        };
        let Some(attempt) = self.find_attempt(stored.attempt_id).await? else {
            return Ok(None);
        };
        if attempt.status != AttemptStatus::Pending {
            return Ok(None);
        }
        let accepts = self
            .store
            .session(attempt.session_id)
            .await
            .is_some_and(|s| s.accepts_entries(now));
        Ok(accepts.then(|| AccessCodeRedemption {
            attempt_id: attempt.id,
            session_id: attempt.session_id,
            student_id: attempt.student_id,
        }))
    }
}

/// Stands in for the stored procedures, signalling the same error kinds
pub struct TestEvaluationProcedures {
    store: Arc<EvaluationStore>,
    classrooms: Arc<TestClassroomRepository>,
    profiles: Arc<TestProfileRepository>,
}

impl TestEvaluationProcedures {
    pub fn new(
        store: Arc<EvaluationStore>,
        classrooms: Arc<TestClassroomRepository>,
        profiles: Arc<TestProfileRepository>,
    ) -> Self {
        Self {
            store,
            classrooms,
            profiles,
        }
    }
}

#[async_trait]
impl EvaluationProcedures for TestEvaluationProcedures {
    async fn publish_evaluation_session(
        &self,
        actor_id: StringUuid,
        input: &PublishSessionInput,
    ) -> Result<StringUuid> {
        let classroom = self
            .classrooms
            .find_by_id(input.classroom_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Classroom not found".to_string()))?;
        let actor = self
            .profiles
            .get(actor_id)
            .await
            .ok_or_else(|| AppError::Unauthorized("Unknown actor".to_string()))?;

        let allowed = match actor.role.as_str() {
            "master" => true,
            "admin" => actor.institution_id == Some(classroom.institution_id),
            "maestro" => {
                self.classrooms
                    .is_teacher_assigned(classroom.id, actor_id)
                    .await?
            }
            _ => false,
        };
        if !allowed {
            return Err(AppError::Unauthorized(
                "Not allowed to publish for this classroom".to_string(),
            ));
        }

        let now = Utc::now();
        let session = EvaluationSession {
            id: StringUuid::new_v4(),
            institution_id: classroom.institution_id,
            classroom_id: classroom.id,
            teacher_profile_id: actor_id,
            text_id: input.text_id,
            quiz_id: input.quiz_id,
            status: SessionStatus::Open,
            expires_at: input
                .expires_in_minutes
                .map(|minutes| now + Duration::minutes(i64::from(minutes))),
            closed_at: None,
            updated_by: None,
            created_at: now,
            deleted_at: None,
        };
        let session_id = session.id;
        self.store.add_session(session).await;

        for student_id in self.classrooms.active_students(classroom.id).await {
            self.store
                .add_attempt(EvaluationAttempt {
                    id: StringUuid::new_v4(),
                    session_id,
                    student_id,
                    status: AttemptStatus::Pending,
                    created_at: now,
                    ..Default::default()
                })
                .await;
        }
        Ok(session_id)
    }

    async fn regenerate_attempt_code(
        &self,
        _actor_id: StringUuid,
        attempt_id: StringUuid,
        new_code_plain: &str,
    ) -> Result<()> {
        let attempt = self
            .store
            .attempts
            .read()
            .await
            .iter()
            .find(|a| a.id == attempt_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;
        let session_open = self
            .store
            .session(attempt.session_id)
            .await
            .is_some_and(|s| s.status == SessionStatus::Open);
        if !session_open {
            return Err(AppError::Conflict("Evaluation session is closed".to_string()));
        }

        let mut codes = self.store.codes.write().await;
        for code in codes.iter_mut().filter(|c| c.attempt_id == attempt_id) {
            code.revoked = true;
        }
        codes.push(StoredCode {
            attempt_id,
            code: new_code_plain.to_string(),
            issued_at: Utc::now(),
            revoked: false,
        });
        Ok(())
    }
}
