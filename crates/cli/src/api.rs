//! JSON endpoints over the resolution and creation pipelines.

use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use resolver_core::models::{CreateOutcome, CreateRequest};
use resolver_core::Services;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryElementRequest {
    pub uuid: Option<String>,
    #[serde(default)]
    pub standard_name: Option<String>,
    pub data_element_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateElementRequest {
    pub uuid: String,
    pub standard_name: String,
    pub data_element_name: String,
}

/// `isSuccess` is 0 on success and 1 on failure.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateElementResponse {
    pub is_success: u8,
    pub data_ele_category: Option<String>,
    pub data_ele_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<CreateOutcome> for CreateElementResponse {
    fn from(outcome: CreateOutcome) -> Self {
        match outcome {
            CreateOutcome::Created {
                category,
                description,
            } => Self {
                is_success: 0,
                data_ele_category: Some(category),
                data_ele_desc: Some(description),
                error: None,
            },
            CreateOutcome::Failed { error } => Self {
                is_success: 1,
                data_ele_category: None,
                data_ele_desc: None,
                error: Some(error),
            },
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/queryDataElement", web::get().to(query_data_element))
        .route("/createDataElement", web::post().to(create_data_element));
}

pub async fn serve(services: Services, host: &str, port: u16) -> std::io::Result<()> {
    let services = web::Data::new(services);
    info!(host, port, "listening");
    HttpServer::new(move || App::new().app_data(services.clone()).configure(configure))
        .bind((host, port))?
        .run()
        .await
}

async fn query_data_element(
    services: web::Data<Services>,
    req: web::Json<QueryElementRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    info!(
        name = %req.data_element_name,
        uuid = ?req.uuid,
        standard_name = ?req.standard_name,
        "queryDataElement"
    );
    match resolver_core::resolve(&services, &req.data_element_name, req.uuid.as_deref()).await {
        Ok(matches) => Ok(HttpResponse::Ok().json(matches)),
        Err(e) => {
            error!(error = %e, "queryDataElement failed");
            Ok(HttpResponse::BadGateway().json(serde_json::json!({
                "error": e.to_string()
            })))
        }
    }
}

async fn create_data_element(
    services: web::Data<Services>,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    // Decode failures are reported in the create response body.
    let req = match serde_json::from_slice::<CreateElementRequest>(&body) {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "createDataElement: invalid body");
            let outcome = CreateOutcome::Failed {
                error: format!("invalid request body: {e}"),
            };
            return Ok(HttpResponse::Ok().json(CreateElementResponse::from(outcome)));
        }
    };
    info!(uuid = %req.uuid, name = %req.data_element_name, "createDataElement");
    let request = CreateRequest {
        external_id: req.uuid,
        data_source: req.standard_name,
        name: req.data_element_name,
        category: None,
    };
    let outcome = resolver_core::create(&services, &request).await;
    Ok(HttpResponse::Ok().json(CreateElementResponse::from(outcome)))
}
