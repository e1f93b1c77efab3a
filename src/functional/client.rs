use tracing::{debug, info};

use super::marshal::{JsonMarshaller, Marshaller};
use super::types::{
    BatchResult, CreateResponse, DeleteId, DeleteRequest, DeleteResponse, JobCollection,
    JobRecord,
};
use super::url::{Scope, collection_url, item_url, phase_url};
use crate::environment::{Environment, Registrar, RightType, RightValue, ServiceInfo, ServiceType};
use crate::error::ClientError;
use crate::state_machine::{Job, validate_name};
use crate::transport::{MethodOverride, Paging, RequestOptions, Transport, TransportError};

/// Caller-supplied payload for a phase operation. Phase bodies are opaque
/// to the client and are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseRequest {
    pub body: Option<String>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
}

impl PhaseRequest {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }

    fn options(&self, method_override: Option<MethodOverride>) -> RequestOptions {
        RequestOptions {
            method_override,
            content_type: self.content_type.clone(),
            accept: self.accept.clone(),
        }
    }
}

/// Client for job resources of a remote functional service.
///
/// Every operation checks registration, then validates and authorizes the
/// job against the target zone's service descriptor before any request is
/// sent. Only [`register`](Self::register) and
/// [`unregister`](Self::unregister) mutate the client.
pub struct FunctionalServiceClient<T, R, M = JsonMarshaller> {
    transport: T,
    registrar: R,
    marshaller: M,
    template: Environment,
    environment: Option<Environment>,
}

impl<T: Transport, R: Registrar> FunctionalServiceClient<T, R, JsonMarshaller> {
    pub fn new(transport: T, registrar: R, template: Environment) -> Self {
        Self::with_marshaller(transport, registrar, JsonMarshaller, template)
    }
}

impl<T: Transport, R: Registrar, M: Marshaller> FunctionalServiceClient<T, R, M> {
    pub fn with_marshaller(transport: T, registrar: R, marshaller: M, template: Environment) -> Self {
        Self {
            transport,
            registrar,
            marshaller,
            template,
            environment: None,
        }
    }

    pub fn template(&self) -> &Environment {
        &self.template
    }

    /// The resolved environment, present only while registered.
    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    pub fn is_registered(&self) -> bool {
        self.registrar.is_registered() && self.environment.is_some()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn register(&mut self) -> Result<&Environment, ClientError> {
        let environment = self.registrar.register(&self.template).await?;
        info!(solution = %environment.solution_id, "functional service client registered");
        Ok(&*self.environment.insert(environment))
    }

    pub async fn unregister(&mut self, remove: bool) -> Result<(), ClientError> {
        self.registrar.unregister(remove).await?;
        self.environment = None;
        info!(remove, "functional service client unregistered");
        Ok(())
    }

    fn session(&self) -> Result<(&Environment, &str), ClientError> {
        if !self.registrar.is_registered() {
            return Err(ClientError::NotRegistered);
        }
        let environment = self.environment.as_ref().ok_or(ClientError::NotRegistered)?;
        let token = self
            .registrar
            .authorisation_token()
            .ok_or(ClientError::NotRegistered)?;
        Ok((environment, token))
    }

    fn base_url<'a>(&self, environment: &'a Environment) -> Result<&'a str, ClientError> {
        environment
            .service_url(ServiceType::Functional)
            .ok_or_else(|| {
                ClientError::Validation("no functional service URL in this environment".into())
            })
    }

    fn options(&self, method_override: Option<MethodOverride>) -> RequestOptions {
        RequestOptions {
            method_override,
            content_type: Some(self.marshaller.media_type().to_string()),
            accept: Some(self.marshaller.media_type().to_string()),
        }
    }

    /// Existence check: the job has a name and its resource is provisioned
    /// as a functional service in the target zone. No rights are consulted.
    pub fn validate_resource(&self, job: &Job, scope: &Scope) -> Result<&ServiceInfo, ClientError> {
        let (environment, _) = self.session()?;
        if job.name().is_empty() {
            return Err(ClientError::Validation("job has no name".into()));
        }
        let zone = environment
            .target_zone(scope.zone.as_ref())
            .ok_or_else(|| ClientError::Validation("no target zone for this request".into()))?;
        let resource = job.resource_name();
        environment
            .resolve_service(
                zone,
                &resource,
                ServiceType::Functional,
                scope.context.as_ref(),
            )
            .ok_or_else(|| {
                ClientError::Validation(format!(
                    "no functional service {resource} in zone {}",
                    zone.id
                ))
            })
    }

    /// Existence check plus id presence (unless `ignore_id`) and the right
    /// gate. An absent right counts as rejected.
    pub fn authorize_operation(
        &self,
        job: &Job,
        right: RightType,
        scope: &Scope,
        ignore_id: bool,
    ) -> Result<(), ClientError> {
        let service = self.validate_resource(job, scope)?;

        if !ignore_id && right != RightType::Create && job.id().is_none() {
            return Err(ClientError::Validation(format!(
                "{right} on {} requires a job id",
                service.name
            )));
        }

        match service.rights.get(right) {
            Some(RightValue::Rejected) | None => Err(ClientError::Unauthorized {
                right,
                service: service.name.clone(),
            }),
            Some(RightValue::Permitted) | Some(RightValue::Supported) => Ok(()),
        }
    }

    /// Authorizes every job in a batch and returns the job name they share.
    pub fn authorize_batch(
        &self,
        jobs: &[Job],
        right: RightType,
        scope: &Scope,
    ) -> Result<String, ClientError> {
        self.authorize_all(jobs, right, scope, false)
    }

    fn authorize_all(
        &self,
        jobs: &[Job],
        right: RightType,
        scope: &Scope,
        ignore_id: bool,
    ) -> Result<String, ClientError> {
        self.session()?;
        let first = jobs
            .first()
            .ok_or_else(|| ClientError::Validation("job list is empty".into()))?;
        for job in jobs {
            self.authorize_operation(job, right, scope, ignore_id)?;
        }
        if let Some(other) = jobs.iter().find(|j| j.name() != first.name()) {
            return Err(ClientError::Validation(format!(
                "batch mixes job names {} and {}",
                first.name(),
                other.name()
            )));
        }
        Ok(first.name().to_string())
    }

    /// The id becomes a URL path segment, so it must not carry delimiters.
    fn require_id(job: &Job) -> Result<&str, ClientError> {
        let id = job
            .id()
            .ok_or_else(|| ClientError::Validation(format!("job {} has no id", job.name())))?;
        validate_name(id).map_err(|_| {
            ClientError::Validation(format!("job {} has an unusable id {id:?}", job.name()))
        })?;
        Ok(id)
    }

    fn decode_job(&self, body: &str) -> Result<Job, ClientError> {
        let record: JobRecord = self.marshaller.deserialize(body)?;
        Ok(Job::try_from(record)?)
    }

    fn decode_jobs(&self, body: &str) -> Result<Vec<Job>, ClientError> {
        let collection: JobCollection = self.marshaller.deserialize(body)?;
        collection
            .jobs
            .into_iter()
            .map(|record| Job::try_from(record).map_err(ClientError::from))
            .collect()
    }

    /// POST the job to its collection; returns the job as the service sees it.
    pub async fn create_job(&self, job: &Job, scope: &Scope) -> Result<Job, ClientError> {
        self.authorize_operation(job, RightType::Create, scope, false)?;
        let (environment, token) = self.session()?;
        let url = collection_url(self.base_url(environment)?, job.name(), scope);

        let body = self.marshaller.serialize(&JobRecord::from(job))?;
        let response = self
            .transport
            .post(&url, token, &body, &self.options(None))
            .await?;
        self.decode_job(&response)
    }

    pub async fn create_jobs(&self, jobs: &[Job], scope: &Scope) -> Result<BatchResult, ClientError> {
        let name = self.authorize_batch(jobs, RightType::Create, scope)?;
        let (environment, token) = self.session()?;
        let url = collection_url(self.base_url(environment)?, &name, scope);

        let collection = JobCollection {
            jobs: jobs.iter().map(JobRecord::from).collect(),
        };
        let body = self.marshaller.serialize(&collection)?;
        let response = self
            .transport
            .post(&url, token, &body, &self.options(None))
            .await?;
        let created: CreateResponse = self.marshaller.deserialize(&response)?;
        Ok(created.into())
    }

    /// GET a single job by the example's id. `None` when the service
    /// answers 404; every other failure propagates.
    pub async fn query_job(&self, job: &Job, scope: &Scope) -> Result<Option<Job>, ClientError> {
        self.authorize_operation(job, RightType::Query, scope, false)?;
        let (environment, token) = self.session()?;
        let url = item_url(
            self.base_url(environment)?,
            job.name(),
            Self::require_id(job)?,
            scope,
        );

        match self.transport.get(&url, token, None).await {
            Ok(response) => self.decode_job(&response).map(Some),
            Err(TransportError::NotFound { .. }) => {
                debug!(%url, "job not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// GET the whole collection the example job belongs to. The example's
    /// id is not required.
    pub async fn query_jobs(
        &self,
        job: &Job,
        paging: Option<Paging>,
        scope: &Scope,
    ) -> Result<Vec<Job>, ClientError> {
        self.authorize_operation(job, RightType::Query, scope, true)?;
        let (environment, token) = self.session()?;
        let url = collection_url(self.base_url(environment)?, job.name(), scope);

        let response = self.transport.get(&url, token, paging).await?;
        self.decode_jobs(&response)
    }

    /// Query by body: POST the example to the collection with a GET override.
    pub async fn query_by_example(&self, example: &Job, scope: &Scope) -> Result<Vec<Job>, ClientError> {
        self.authorize_operation(example, RightType::Query, scope, true)?;
        let (environment, token) = self.session()?;
        let url = collection_url(self.base_url(environment)?, example.name(), scope);

        let body = self.marshaller.serialize(&JobRecord::from(example))?;
        let response = self
            .transport
            .post(&url, token, &body, &self.options(Some(MethodOverride::Get)))
            .await?;
        self.decode_jobs(&response)
    }

    /// Jobs cannot be updated through the collection. The right is still
    /// checked first, so a rejected UPDATE reports as unauthorized.
    pub async fn update_job(&self, job: &Job, scope: &Scope) -> Result<Job, ClientError> {
        self.authorize_operation(job, RightType::Update, scope, true)?;
        Err(ClientError::Unsupported(format!(
            "{} cannot be updated; change its phases instead",
            job.resource_name()
        )))
    }

    pub async fn update_jobs(&self, jobs: &[Job], scope: &Scope) -> Result<BatchResult, ClientError> {
        let name = self.authorize_all(jobs, RightType::Update, scope, true)?;
        Err(ClientError::Unsupported(format!(
            "{name}s cannot be updated; change their phases instead"
        )))
    }

    pub async fn delete_job(&self, job: &Job, scope: &Scope) -> Result<(), ClientError> {
        self.authorize_operation(job, RightType::Delete, scope, false)?;
        let (environment, token) = self.session()?;
        let url = item_url(
            self.base_url(environment)?,
            job.name(),
            Self::require_id(job)?,
            scope,
        );

        self.transport
            .delete(&url, token, None, &self.options(None))
            .await?;
        Ok(())
    }

    /// One PUT with a DELETE override whose body lists every id.
    pub async fn delete_jobs(&self, jobs: &[Job], scope: &Scope) -> Result<BatchResult, ClientError> {
        let name = self.authorize_batch(jobs, RightType::Delete, scope)?;
        let (environment, token) = self.session()?;
        let url = collection_url(self.base_url(environment)?, &name, scope);

        let deletes = jobs
            .iter()
            .map(|job| Self::require_id(job).map(|id| DeleteId { id: id.to_string() }))
            .collect::<Result<Vec<_>, _>>()?;
        let body = self.marshaller.serialize(&DeleteRequest { deletes })?;
        let response = self
            .transport
            .put(&url, token, &body, &self.options(Some(MethodOverride::Delete)))
            .await?;
        let deleted: DeleteResponse = self.marshaller.deserialize(&response)?;
        Ok(deleted.into())
    }

    fn phase_target(&self, job: &Job, phase: &str, scope: &Scope) -> Result<(String, &str), ClientError> {
        self.validate_resource(job, scope)?;
        validate_name(phase)
            .map_err(|_| ClientError::Validation(format!("unusable phase name {phase:?}")))?;
        let (environment, token) = self.session()?;
        let url = phase_url(
            self.base_url(environment)?,
            job.name(),
            Self::require_id(job)?,
            phase,
            scope,
        );
        Ok((url, token))
    }

    pub async fn create_to_phase(
        &self,
        job: &Job,
        phase: &str,
        request: &PhaseRequest,
        scope: &Scope,
    ) -> Result<String, ClientError> {
        let (url, token) = self.phase_target(job, phase, scope)?;
        let body = request.body.as_deref().unwrap_or_default();
        Ok(self
            .transport
            .post(&url, token, body, &request.options(None))
            .await?)
    }

    pub async fn retrieve_to_phase(
        &self,
        job: &Job,
        phase: &str,
        request: &PhaseRequest,
        scope: &Scope,
    ) -> Result<String, ClientError> {
        let (url, token) = self.phase_target(job, phase, scope)?;
        let body = request.body.as_deref().unwrap_or_default();
        Ok(self
            .transport
            .post(&url, token, body, &request.options(Some(MethodOverride::Get)))
            .await?)
    }

    pub async fn update_to_phase(
        &self,
        job: &Job,
        phase: &str,
        request: &PhaseRequest,
        scope: &Scope,
    ) -> Result<String, ClientError> {
        let (url, token) = self.phase_target(job, phase, scope)?;
        let body = request.body.as_deref().unwrap_or_default();
        Ok(self
            .transport
            .put(&url, token, body, &request.options(None))
            .await?)
    }

    pub async fn delete_to_phase(
        &self,
        job: &Job,
        phase: &str,
        request: &PhaseRequest,
        scope: &Scope,
    ) -> Result<String, ClientError> {
        let (url, token) = self.phase_target(job, phase, scope)?;
        Ok(self
            .transport
            .delete(&url, token, request.body.as_deref(), &request.options(None))
            .await?)
    }
}
