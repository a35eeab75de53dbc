//! In-memory implementations of the persistence seams, used by unit and router tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::admin::session::{AdminUser, AuthError, AuthProvider};
use crate::applications::repository::ApplicationRepository;
use crate::applications::validation::ApplicantDetails;
use crate::errors::AppError;
use crate::jobs::JobRepository;
use crate::models::application::{Application, ApplicationKind, AreaOfInterest};
use crate::models::job::{JobDraft, JobPosting};
use crate::resumes::{ObjectStore, ResumeRef, StoredObject};

fn unavailable() -> AppError {
    AppError::Transport("in-memory backend marked unavailable".to_string())
}

/// Newest first; ties keep reverse insertion order.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

#[derive(Default)]
pub struct MemoryJobs {
    rows: Mutex<Vec<JobPosting>>,
    unavailable: AtomicBool,
    mutations: AtomicUsize,
}

impl MemoryJobs {
    pub fn with_postings(postings: Vec<JobPosting>) -> Self {
        Self {
            rows: Mutex::new(postings),
            ..Self::default()
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn title_of(&self, id: Uuid) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.id == id)
            .map(|j| j.title.clone())
    }

    fn with_job<T>(&self, id: Uuid, f: impl FnOnce(&mut JobPosting) -> T) -> Result<T, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let job = rows
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
        let out = f(job);
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(out)
    }
}

#[async_trait]
impl JobRepository for MemoryJobs {
    async fn list_active(&self) -> Result<Vec<JobPosting>, AppError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        let active: Vec<_> = rows.iter().filter(|j| j.is_active).cloned().collect();
        Ok(newest_first(&active, |j| j.created_at))
    }

    async fn list_all(&self) -> Result<Vec<JobPosting>, AppError> {
        self.check()?;
        Ok(newest_first(&self.rows.lock().unwrap(), |j| j.created_at))
    }

    async fn find(&self, id: Uuid) -> Result<JobPosting, AppError> {
        self.check()?;
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
    }

    async fn create(&self, draft: &JobDraft) -> Result<JobPosting, AppError> {
        self.check()?;
        let job = JobPosting {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            department: draft.department.clone(),
            location: draft.location.clone(),
            employment_type: draft.employment_type.clone(),
            salary: draft.salary.clone(),
            description: draft.description.clone(),
            requirements: draft.requirements.clone(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.rows.lock().unwrap().push(job.clone());
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(job)
    }

    async fn update(&self, id: Uuid, draft: &JobDraft) -> Result<(), AppError> {
        self.with_job(id, |job| {
            job.title = draft.title.clone();
            job.department = draft.department.clone();
            job.location = draft.location.clone();
            job.employment_type = draft.employment_type.clone();
            job.salary = draft.salary.clone();
            job.description = draft.description.clone();
            job.requirements = draft.requirements.clone();
            job.updated_at = Some(Utc::now());
        })
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AppError> {
        self.with_job(id, |job| job.is_active = active)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|j| j.id != id);
        if rows.len() == before {
            return Err(AppError::NotFound(format!("Job {id} not found")));
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Both application tables. Job titles are joined live from the shared `MemoryJobs`.
pub struct MemoryApplications {
    jobs: Arc<MemoryJobs>,
    job_targeted: Mutex<Vec<Application>>,
    spontaneous: Mutex<Vec<Application>>,
    inserts: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryApplications {
    pub fn new(jobs: Arc<MemoryJobs>) -> Self {
        Self {
            jobs,
            job_targeted: Mutex::new(Vec::new()),
            spontaneous: Mutex::new(Vec::new()),
            inserts: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn build(
        &self,
        kind: ApplicationKind,
        details: &ApplicantDetails,
        resume: Option<&ResumeRef>,
    ) -> Application {
        Application {
            id: Uuid::new_v4(),
            kind,
            name: details.name.clone(),
            email: details.email.clone(),
            phone: details.phone.clone(),
            message: details.message.clone(),
            resume_url: resume.map(|r| r.as_str().to_string()),
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ApplicationRepository for MemoryApplications {
    async fn submit_for_job(
        &self,
        job_id: Uuid,
        details: &ApplicantDetails,
        resume: Option<&ResumeRef>,
    ) -> Result<Application, AppError> {
        self.check()?;
        let kind = ApplicationKind::JobTargeted {
            job_id,
            job_title: self.jobs.title_of(job_id),
        };
        let application = self.build(kind, details, resume);
        self.job_targeted.lock().unwrap().push(application.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(application)
    }

    async fn submit_spontaneous(
        &self,
        details: &ApplicantDetails,
        area: AreaOfInterest,
        resume: Option<&ResumeRef>,
    ) -> Result<Application, AppError> {
        self.check()?;
        let application = self.build(ApplicationKind::Spontaneous { area }, details, resume);
        self.spontaneous.lock().unwrap().push(application.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(application)
    }

    async fn list_job_targeted(&self) -> Result<Vec<Application>, AppError> {
        self.check()?;
        let rows: Vec<Application> = self
            .job_targeted
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(|mut app| {
                if let ApplicationKind::JobTargeted { job_id, job_title } = &mut app.kind {
                    *job_title = self.jobs.title_of(*job_id);
                }
                app
            })
            .collect();
        Ok(newest_first(&rows, |a| a.created_at))
    }

    async fn list_spontaneous(&self) -> Result<Vec<Application>, AppError> {
        self.check()?;
        Ok(newest_first(&self.spontaneous.lock().unwrap(), |a| {
            a.created_at
        }))
    }
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    puts: AtomicUsize,
    fail_next: AtomicBool,
}

impl MemoryObjectStore {
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    /// The next `put` fails with a transport error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn remove(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::Transport("object store rejected upload".to_string()));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: Some(content_type.to_string()),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, AppError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Resume {key} not found")))
    }
}

/// Accepts a fixed set of tokens and records sign-outs.
#[derive(Default)]
pub struct MemoryAuth {
    tokens: Mutex<HashSet<String>>,
    signed_out: Mutex<Vec<String>>,
}

impl MemoryAuth {
    pub fn with_token(token: &str) -> Self {
        let auth = Self::default();
        auth.tokens.lock().unwrap().insert(token.to_string());
        auth
    }

    pub fn signed_out(&self) -> Vec<String> {
        self.signed_out.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn verify(&self, access_token: &str) -> Result<AdminUser, AuthError> {
        if self.tokens.lock().unwrap().contains(access_token) {
            Ok(AdminUser {
                id: "admin-1".to_string(),
                email: Some("admin@example.com".to_string()),
            })
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        if !self.tokens.lock().unwrap().remove(access_token) {
            return Err(AuthError::InvalidToken);
        }
        self.signed_out.lock().unwrap().push(access_token.to_string());
        Ok(())
    }
}
