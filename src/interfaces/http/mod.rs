use crate::application::{ChatUseCase, DatasetUploadUseCase};
use crate::domain::chat::ChatRequest;
use crate::domain::error::AppError;
use crate::infrastructure::config::ServerConfig;
use actix_cors::Cors;
use actix_web::{
    dev::Server, get, http::StatusCode, post, web, App, HttpResponse, HttpServer, Responder, Scope,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

/// Uploads above this size are rejected before they reach the loader
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub struct HttpState {
    pub upload_use_case: DatasetUploadUseCase,
    pub chat_use_case: ChatUseCase,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub name: String,
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[post("/datasets")]
async fn upload_dataset(
    data: web::Data<HttpState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> impl Responder {
    info!(file_name = %query.name, bytes = body.len(), "Uploading dataset");

    match data.upload_use_case.execute(&query.name, &body).await {
        Ok(outcome) => HttpResponse::Created().json(outcome),
        Err(e) => error_response(&e),
    }
}

#[get("/datasets")]
async fn list_datasets(data: web::Data<HttpState>) -> impl Responder {
    match data.upload_use_case.list().await {
        Ok(datasets) => HttpResponse::Ok().json(datasets),
        Err(e) => error_response(&e),
    }
}

#[get("/datasets/{id}/messages")]
async fn dataset_messages(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    match data.chat_use_case.history(&path).await {
        Ok(messages) => HttpResponse::Ok().json(messages),
        Err(e) => error_response(&e),
    }
}

#[post("/chat")]
async fn chat(data: web::Data<HttpState>, req: web::Json<ChatRequest>) -> impl Responder {
    info!(
        dataset_id = req.dataset_id.as_deref().unwrap_or("-"),
        "Handling chat message"
    );

    match data.chat_use_case.execute(req.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(&e),
    }
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::ParseError(_) | AppError::ValidationError(_) | AppError::EmptyDataset => {
            StatusCode::BAD_REQUEST
        }
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::LLMError(_) => StatusCode::BAD_GATEWAY,
        AppError::Internal(_) | AppError::DatabaseError(_) | AppError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// JSON error body; loader failures also carry every issue found
pub fn error_response(err: &AppError) -> HttpResponse {
    let status = status_for(err);
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    } else {
        warn!(error = %err, "Request rejected");
    }

    let body = match err {
        AppError::ParseError(issues) => json!({ "error": err.to_string(), "issues": issues }),
        _ => json!({ "error": err.to_string() }),
    };
    HttpResponse::build(status).json(body)
}

pub fn api_scope() -> Scope {
    web::scope("/api")
        .service(health)
        .service(upload_dataset)
        .service(list_datasets)
        .service(dataset_messages)
        .service(chat)
}

pub fn start_server(state: web::Data<HttpState>, config: &ServerConfig) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .service(api_scope())
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    info!(host = %config.host, port = config.port, "HTTP server listening");
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::DatasetAnalyzer;
    use crate::domain::error::Result;
    use crate::domain::llm_config::LLMConfig;
    use crate::infrastructure::db::sqlite::DatasetRepository;
    use crate::infrastructure::llm_clients::LLMClient;
    use actix_web::test as actix_test;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    struct EchoLLM;

    #[async_trait]
    impl LLMClient for EchoLLM {
        async fn generate(&self, _config: &LLMConfig, _system: &str, _user: &str) -> Result<String> {
            Ok("Here is what the data shows.".to_string())
        }
    }

    async fn state() -> web::Data<HttpState> {
        let repository = Arc::new(DatasetRepository::connect("sqlite::memory:").await.unwrap());
        web::Data::new(HttpState {
            upload_use_case: DatasetUploadUseCase::new(repository.clone()),
            chat_use_case: ChatUseCase::new(
                repository,
                Arc::new(EchoLLM),
                LLMConfig::default(),
                DatasetAnalyzer::default(),
            ),
        })
    }

    #[actix_web::test]
    async fn test_health() {
        let app = actix_test::init_service(App::new().service(api_scope())).await;
        let req = actix_test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn test_upload_then_chat() {
        let app =
            actix_test::init_service(App::new().app_data(state().await).service(api_scope())).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/datasets?name=patients.csv")
            .set_payload("patient_id,age,gender\n1,30,F\n2,20,M\n")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let uploaded: Value = actix_test::read_body_json(resp).await;
        assert_eq!(uploaded["rowCount"], 2);
        let id = uploaded["id"].as_str().unwrap().to_string();

        let req = actix_test::TestRequest::post()
            .uri("/api/chat")
            .set_json(json!({ "message": "Any trend?", "datasetId": id }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Here is what the data shows.");
        assert_eq!(
            body["analysis"]["summary"],
            "Analyzed 2 records with 2 numeric and 1 categorical variables."
        );
        assert_eq!(body["analysis"]["statistics"]["age_mean"], 25.0);

        let req = actix_test::TestRequest::get()
            .uri(&format!("/api/datasets/{}/messages", id))
            .to_request();
        let messages: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(messages.as_array().unwrap().len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[actix_web::test]
    async fn test_malformed_upload_lists_issues() {
        let app =
            actix_test::init_service(App::new().app_data(state().await).service(api_scope())).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/datasets?name=bad.csv")
            .set_payload("a,b\n1,2,3\n4,5\n6,7,8\n")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["issues"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_unknown_dataset_history_is_404() {
        let app =
            actix_test::init_service(App::new().app_data(state().await).service(api_scope())).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/datasets/missing/messages")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AppError::EmptyDataset), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&AppError::LLMError("down".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AppError::DatabaseError("locked".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
