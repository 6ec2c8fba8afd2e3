use serde_json::json;

use crate::error::ClientResult;

use super::models::{
    ClosedResults, MessageResponse, Poll, PollDraft, PollEnvelope, PollListEnvelope, PollResults, PollStatus, VoteReceipt, VoteStatus,
};
use super::pipeline::{ApiClient, ApiRequest};

fn poll_path(id: &str) -> String { format!("/polls/{}", urlencoding::encode(id)) }

/// Poll, vote and voter-facing endpoints.
#[derive(Debug, Clone)]
pub struct PollsApi {
    client: ApiClient,
}

impl PollsApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn list(&self, status: Option<PollStatus>) -> ClientResult<Vec<Poll>> {
        let mut req = ApiRequest::get("/polls/");
        if let Some(s) = status {
            req = req.query("status", s.as_api_str());
        }
        Ok(self.client.send_json::<PollListEnvelope>(req).await?.into_polls())
    }

    pub async fn get(&self, id: &str) -> ClientResult<Poll> {
        Ok(self.client.send_json::<PollEnvelope>(ApiRequest::get(poll_path(id))).await?.into_poll())
    }

    pub async fn create(&self, draft: &PollDraft) -> ClientResult<Poll> {
        let req = ApiRequest::post("/polls/").json(draft.to_wire());
        Ok(self.client.send_json::<PollEnvelope>(req).await?.into_poll())
    }

    pub async fn update(&self, id: &str, draft: &PollDraft) -> ClientResult<Poll> {
        let req = ApiRequest::put(poll_path(id)).json(draft.to_wire());
        Ok(self.client.send_json::<PollEnvelope>(req).await?.into_poll())
    }

    pub async fn delete(&self, id: &str) -> ClientResult<String> {
        let resp: MessageResponse = self.client.send_json(ApiRequest::delete(poll_path(id))).await?;
        Ok(resp.message)
    }

    pub async fn publish(&self, id: &str) -> ClientResult<Poll> {
        let req = ApiRequest::post(format!("{}/publish", poll_path(id)));
        Ok(self.client.send_json::<PollEnvelope>(req).await?.into_poll())
    }

    pub async fn close(&self, id: &str) -> ClientResult<Poll> {
        let req = ApiRequest::post(format!("{}/close", poll_path(id)));
        Ok(self.client.send_json::<PollEnvelope>(req).await?.into_poll())
    }

    pub async fn results(&self, id: &str) -> ClientResult<PollResults> {
        self.client.send_json(ApiRequest::get(format!("{}/results", poll_path(id)))).await
    }

    pub async fn vote(&self, id: &str, option_id: &str) -> ClientResult<VoteReceipt> {
        let req = ApiRequest::post(format!("{}/vote", poll_path(id))).json(json!({ "option_id": option_id }));
        self.client.send_json(req).await
    }

    pub async fn vote_status(&self, id: &str) -> ClientResult<VoteStatus> {
        self.client.send_json(ApiRequest::get(format!("{}/vote/status", poll_path(id)))).await
    }

    pub async fn voter_active(&self) -> ClientResult<Vec<Poll>> {
        Ok(self.client.send_json::<PollListEnvelope>(ApiRequest::get("/polls/voter/active")).await?.into_polls())
    }

    pub async fn voter_closed(&self) -> ClientResult<Vec<Poll>> {
        Ok(self.client.send_json::<PollListEnvelope>(ApiRequest::get("/polls/voter/closed")).await?.into_polls())
    }

    pub async fn closed_results(&self) -> ClientResult<ClosedResults> {
        self.client.send_json(ApiRequest::get("/polls/closed")).await
    }
}
