use crate::error::ClientResult;

use super::models::{AdminMetrics, AuditLogPage};
use super::pipeline::{ApiClient, ApiRequest};

#[derive(Debug, Clone)]
pub struct AdminApi {
    client: ApiClient,
}

impl AdminApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn metrics(&self) -> ClientResult<AdminMetrics> {
        self.client.send_json(ApiRequest::get("/admin/metrics")).await
    }

    /// A zero limit is left to the server default.
    pub async fn audit_logs(&self, limit: Option<u64>, offset: Option<u64>) -> ClientResult<AuditLogPage> {
        let mut req = ApiRequest::get("/admin/audit-logs");
        if let Some(l) = limit.filter(|l| *l > 0) {
            req = req.query("limit", l);
        }
        if let Some(o) = offset {
            req = req.query("offset", o);
        }
        self.client.send_json(req).await
    }
}
