use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::application::ApplicationRecord;
use super::capacity::CapacityGuard;
use super::domain::{ApplicationId, Company, CompanyId, StudentId, StudentRecord};
use super::repository::{
    ApplicationFilter, PlacementRepository, RepositoryError, StudentDirectory,
};
use super::tenant::{TenantId, TenantScope};

type Keyed<K> = (TenantId, K);

#[derive(Debug, Default)]
struct StoreState {
    companies: HashMap<Keyed<CompanyId>, Company>,
    applications: HashMap<Keyed<ApplicationId>, ApplicationRecord>,
    students: HashMap<Keyed<StudentId>, StudentRecord>,
}

/// Process-local store backing the API service, demos, and tests.
///
/// One mutex covers every tenant, so `create_application` is a single
/// critical section.
#[derive(Debug, Default)]
pub struct InMemoryPlacementStore {
    state: Mutex<StoreState>,
}

impl InMemoryPlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load student records owned by the student-management subsystem.
    pub fn seed_students<I>(
        &self,
        scope: &TenantScope,
        students: I,
    ) -> Result<usize, RepositoryError>
    where
        I: IntoIterator<Item = StudentRecord>,
    {
        let mut state = self.lock()?;
        let mut loaded = 0;
        for student in students {
            state
                .students
                .insert((scope.tenant().clone(), student.id.clone()), student);
            loaded += 1;
        }
        Ok(loaded)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

fn key<K: Clone>(scope: &TenantScope, id: &K) -> Keyed<K> {
    (scope.tenant().clone(), id.clone())
}

fn same_name(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

impl PlacementRepository for InMemoryPlacementStore {
    fn insert_company(
        &self,
        scope: &TenantScope,
        company: Company,
    ) -> Result<Company, RepositoryError> {
        let mut state = self.lock()?;
        let duplicate = state.companies.iter().any(|((tenant, _), existing)| {
            scope.owns(tenant) && same_name(&existing.name, &company.name)
        });
        if duplicate || state.companies.contains_key(&key(scope, &company.id)) {
            return Err(RepositoryError::Conflict);
        }

        state
            .companies
            .insert(key(scope, &company.id), company.clone());
        Ok(company)
    }

    fn update_company(
        &self,
        scope: &TenantScope,
        mut company: Company,
        guard: &CapacityGuard,
    ) -> Result<Company, RepositoryError> {
        let mut state = self.lock()?;
        let stored = state
            .companies
            .get_mut(&key(scope, &company.id))
            .ok_or(RepositoryError::NotFound)?;

        company.visit.current_applications = stored.visit.current_applications;
        guard.validate_cap(
            company.visit.max_applications,
            company.visit.current_applications,
        )?;

        *stored = company.clone();
        Ok(company)
    }

    fn fetch_company(
        &self,
        scope: &TenantScope,
        id: &CompanyId,
    ) -> Result<Option<Company>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.companies.get(&key(scope, id)).cloned())
    }

    fn companies(&self, scope: &TenantScope) -> Result<Vec<Company>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .companies
            .iter()
            .filter(|((tenant, _), _)| scope.owns(tenant))
            .map(|(_, company)| company.clone())
            .collect())
    }

    fn create_application(
        &self,
        scope: &TenantScope,
        record: ApplicationRecord,
        guard: &CapacityGuard,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut state = self.lock()?;

        let duplicate = state.applications.iter().any(|((tenant, _), existing)| {
            scope.owns(tenant)
                && existing.student_id == record.student_id
                && existing.company_id == record.company_id
        });
        if duplicate {
            return Err(RepositoryError::DuplicateApplication);
        }
        if state.applications.contains_key(&key(scope, &record.id)) {
            return Err(RepositoryError::Conflict);
        }

        let company = state
            .companies
            .get_mut(&key(scope, &record.company_id))
            .ok_or(RepositoryError::NotFound)?;
        guard.reserve(&mut company.visit)?;

        state
            .applications
            .insert(key(scope, &record.id), record.clone());
        Ok(record)
    }

    fn update_application<E, F>(
        &self,
        scope: &TenantScope,
        id: &ApplicationId,
        change: F,
    ) -> Result<Result<ApplicationRecord, E>, RepositoryError>
    where
        F: FnOnce(&mut ApplicationRecord) -> Result<(), E>,
    {
        let mut state = self.lock()?;
        let stored = state
            .applications
            .get_mut(&key(scope, id))
            .ok_or(RepositoryError::NotFound)?;

        let mut draft = stored.clone();
        if let Err(err) = change(&mut draft) {
            return Ok(Err(err));
        }
        *stored = draft.clone();
        Ok(Ok(draft))
    }

    fn fetch_application(
        &self,
        scope: &TenantScope,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.applications.get(&key(scope, id)).cloned())
    }

    fn applications(
        &self,
        scope: &TenantScope,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .applications
            .iter()
            .filter(|((tenant, _), record)| scope.owns(tenant) && filter.matches(record))
            .map(|(_, record)| record.clone())
            .collect())
    }
}

impl StudentDirectory for InMemoryPlacementStore {
    fn fetch_student(
        &self,
        scope: &TenantScope,
        id: &StudentId,
    ) -> Result<Option<StudentRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.students.get(&key(scope, id)).cloned())
    }

    fn active_students(&self, scope: &TenantScope) -> Result<Vec<StudentRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .students
            .iter()
            .filter(|((tenant, _), student)| scope.owns(tenant) && student.is_active)
            .map(|(_, student)| student.clone())
            .collect())
    }
}
