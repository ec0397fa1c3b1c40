use crate::api::models::{
    ActivityItem, ApiResponse, Appointment, DashboardStats, DepartmentWorkload, Doctor, MedicalRecord,
    NewDoctor, NewMedicalRecord, NewPatient, Patient, PatientUpdate,
};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Thin JSON client for the dashboard REST backend.
pub struct ApiClient {
    pub http: HttpClient,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(),
            base: Url::parse(base_url.trim_end_matches('/'))?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path);
        let result = self.send(method.clone(), &url, body).await;
        if let Err(e) = &result {
            log::error!("API request {} {} failed: {}", method, url, e);
        }
        result
    }

    async fn send<T, B>(&self, method: Method, url: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut req = self.http.request(method, url).header("Content-Type", "application/json");
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    pub async fn patients(&self) -> Result<ApiResponse<Vec<Patient>>, ApiError> {
        self.get("/patients").await
    }

    pub async fn patient(&self, id: &str) -> Result<ApiResponse<Patient>, ApiError> {
        self.get(&format!("/patients/{}", id)).await
    }

    pub async fn create_patient(&self, patient: &NewPatient) -> Result<ApiResponse<Patient>, ApiError> {
        self.request(Method::POST, "/patients", Some(patient)).await
    }

    pub async fn update_patient(&self, id: &str, update: &PatientUpdate) -> Result<ApiResponse<Patient>, ApiError> {
        self.request(Method::PUT, &format!("/patients/{}", id), Some(update)).await
    }

    pub async fn delete_patient(&self, id: &str) -> Result<ApiResponse<Option<()>>, ApiError> {
        self.request::<_, ()>(Method::DELETE, &format!("/patients/{}", id), None).await
    }

    pub async fn doctors(&self) -> Result<ApiResponse<Vec<Doctor>>, ApiError> {
        self.get("/doctors").await
    }

    pub async fn doctor(&self, id: &str) -> Result<ApiResponse<Doctor>, ApiError> {
        self.get(&format!("/doctors/{}", id)).await
    }

    pub async fn create_doctor(&self, doctor: &NewDoctor) -> Result<ApiResponse<Doctor>, ApiError> {
        self.request(Method::POST, "/doctors", Some(doctor)).await
    }

    pub async fn medical_records(&self) -> Result<ApiResponse<Vec<MedicalRecord>>, ApiError> {
        self.get("/records").await
    }

    pub async fn medical_record(&self, id: &str) -> Result<ApiResponse<MedicalRecord>, ApiError> {
        self.get(&format!("/records/{}", id)).await
    }

    pub async fn create_medical_record(&self, record: &NewMedicalRecord) -> Result<ApiResponse<MedicalRecord>, ApiError> {
        self.request(Method::POST, "/records", Some(record)).await
    }

    pub async fn dashboard_stats(&self) -> Result<ApiResponse<DashboardStats>, ApiError> {
        self.get("/dashboard/stats").await
    }

    pub async fn recent_activity(&self) -> Result<ApiResponse<Vec<ActivityItem>>, ApiError> {
        self.get("/dashboard/activity").await
    }

    pub async fn upcoming_appointments(&self) -> Result<ApiResponse<Vec<Appointment>>, ApiError> {
        self.get("/dashboard/appointments").await
    }

    pub async fn department_workload(&self) -> Result<ApiResponse<Vec<DepartmentWorkload>>, ApiError> {
        self.get("/dashboard/workload").await
    }
}
