use log::debug;
use reqwest::{Response, StatusCode};
use thiserror::Error;
use todo_shared::{MessageResponse, Task, TodoPayload, ValidationError};
use url::Url;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("todo not found")]
    NotFound,

    #[error("no todo is being edited")]
    NotEditing,

    #[error("rejected by server: {0}")]
    Rejected(String),

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("invalid api url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// The four calls the client makes against `/api/todos`.
#[allow(async_fn_in_trait)]
pub trait TodoApi {
    async fn list(&self) -> Result<Vec<Task>, ClientError>;
    async fn create(&self, payload: &TodoPayload) -> Result<Task, ClientError>;
    async fn update(&self, id: Uuid, payload: &TodoPayload) -> Result<Task, ClientError>;
    async fn delete(&self, id: Uuid) -> Result<(), ClientError>;
}

pub struct HttpTodoApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpTodoApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    fn collection_url(&self) -> Result<Url, ClientError> {
        Ok(self.base.join("api/todos")?)
    }

    fn item_url(&self, id: Uuid) -> Result<Url, ClientError> {
        Ok(self.base.join(&format!("api/todos/{id}"))?)
    }
}

impl TodoApi for HttpTodoApi {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        let url = self.collection_url()?;
        debug!("GET {url}");
        let response = checked(self.client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, payload: &TodoPayload) -> Result<Task, ClientError> {
        let url = self.collection_url()?;
        debug!("POST {url}");
        let response = checked(self.client.post(url).json(payload).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, id: Uuid, payload: &TodoPayload) -> Result<Task, ClientError> {
        let url = self.item_url(id)?;
        debug!("PUT {url}");
        let response = checked(self.client.put(url).json(payload).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        let url = self.item_url(id)?;
        debug!("DELETE {url}");
        checked(self.client.delete(url).send().await?).await?;
        Ok(())
    }
}

async fn checked(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<MessageResponse>().await {
        Ok(body) => body.message,
        Err(_) => status.to_string(),
    };

    Err(match status {
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::BAD_REQUEST => ClientError::Rejected(message),
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    })
}
