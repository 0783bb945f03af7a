//! Router and HTTP handlers for the directory endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use ecoleta_core::model::{Item, ItemId, NewPoint, Point, PointDetails, PointId};
use ecoleta_core::service::EcoletaService;

use crate::error::ApiError;
use crate::upload;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Registration/query service facade.
    pub service: Arc<EcoletaService>,
    /// Directory where uploaded images are stored.
    pub upload_dir: PathBuf,
}

/// Build the application router with trace and CORS layers applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/items", get(list_items))
        .route("/points", get(search_points).post(create_point))
        .route("/points/{id}", get(show_point))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    Ok(Json(state.service.items().await?))
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    uf: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    items: String,
}

async fn search_points(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Point>>, ApiError> {
    let points = state
        .service
        .search_points(&params.uf, &params.city, &params.items)
        .await?;
    Ok(Json(points))
}

async fn show_point(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PointDetails>, ApiError> {
    Ok(Json(state.service.point_details(PointId(id)).await?))
}

#[derive(Debug, Default)]
struct RegistrationForm {
    name: Option<String>,
    email: Option<String>,
    whatsapp: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    city: Option<String>,
    uf: Option<String>,
    items: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

async fn create_point(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Point>), ApiError> {
    let form = read_form(multipart).await?;

    let (image_name, image_bytes) = form
        .image
        .ok_or_else(|| ApiError::bad_request("Missing image file"))?;

    let latitude = parse_coordinate(form.latitude.as_deref(), "latitude")?;
    let longitude = parse_coordinate(form.longitude.as_deref(), "longitude")?;
    let items = parse_registration_items(form.items.as_deref().unwrap_or(""))?;

    let image = upload::save_image(&state.upload_dir, &image_name, &image_bytes)
        .await
        .map_err(ApiError::internal)?;

    let draft = NewPoint {
        name: form.name.unwrap_or_default(),
        email: form.email.unwrap_or_default(),
        whatsapp: form.whatsapp.unwrap_or_default(),
        latitude,
        longitude,
        city: form.city.unwrap_or_default(),
        uf: form.uf.unwrap_or_default(),
        image,
    };

    let point = state.service.register_point(draft, &items).await?;
    Ok((StatusCode::CREATED, Json(point)))
}

async fn read_form(mut multipart: Multipart) -> Result<RegistrationForm, ApiError> {
    let mut form = RegistrationForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("Malformed multipart body: {err}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::bad_request(format!("Unreadable image field: {err}")))?;
            form.image = Some((file_name, bytes.to_vec()));
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|err| ApiError::bad_request(format!("Unreadable field {name}: {err}")))?;
        match name.as_str() {
            "name" => form.name = Some(value),
            "email" => form.email = Some(value),
            "whatsapp" => form.whatsapp = Some(value),
            "latitude" => form.latitude = Some(value),
            "longitude" => form.longitude = Some(value),
            "city" => form.city = Some(value),
            "uf" => form.uf = Some(value),
            "items" => form.items = Some(value),
            // Unknown fields are ignored.
            _ => {}
        }
    }
    Ok(form)
}

fn parse_coordinate(raw: Option<&str>, field: &str) -> Result<f64, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::bad_request(format!("Missing required field: {field}")))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ApiError::bad_request(format!("Field {field} must be a number")))
}

/// Strict id parsing for registration: a malformed token rejects the request,
/// unlike the tolerant filter-query parsing. Duplicates are collapsed.
fn parse_registration_items(raw: &str) -> Result<Vec<ItemId>, ApiError> {
    let mut ids: Vec<ItemId> = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let id = token
            .parse::<i64>()
            .map_err(|_| ApiError::bad_request(format!("Invalid item id: {token}")))?;
        let id = ItemId(id);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use ecoleta_core::memory::MemoryStore;

    const BOUNDARY: &str = "ecoleta-test-boundary";

    fn test_router() -> Router {
        let store = Arc::new(MemoryStore::with_catalog());
        router(AppState {
            service: Arc::new(EcoletaService::new(store)),
            upload_dir: std::env::temp_dir(),
        })
    }

    fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str)>) -> Body {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        if let Some((file_name, content)) = image {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    fn registration_request(fields: &[(&str, &str)], image: Option<(&str, &str)>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/points")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart_body(fields, image))
            .expect("request builds")
    }

    fn valid_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("name", "Ecoponto Centro"),
            ("email", "contact@example.com"),
            ("whatsapp", "+55 11 99999-0000"),
            ("latitude", "-23.55"),
            ("longitude", "-46.63"),
            ("city", "São Paulo"),
            ("uf", "SP"),
            ("items", "1,3"),
        ]
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn items_endpoint_lists_the_seeded_catalog() {
        let response = test_router()
            .oneshot(Request::builder().uri("/items").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let items = json_body(response).await;
        let items = items.as_array().expect("array body");
        assert_eq!(items.len(), 6);
        assert_eq!(items[0]["title"], "lampadas");
    }

    #[tokio::test]
    async fn unknown_point_id_yields_not_found_with_message() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/points/42")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], "Point not found");
    }

    #[tokio::test]
    async fn registration_returns_created_point_and_search_finds_it() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(registration_request(&valid_fields(), Some(("photo.jpg", "fake-bytes"))))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["name"], "Ecoponto Centro");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/points?uf=SP&city=S%C3%A3o%20Paulo&items=1,abc,3")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        let found = json_body(response).await;
        assert_eq!(found.as_array().expect("array body").len(), 1);
    }

    #[tokio::test]
    async fn registration_without_image_is_rejected() {
        let response = test_router()
            .oneshot(registration_request(&valid_fields(), None))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn registration_with_malformed_item_id_is_rejected() {
        let mut fields = valid_fields();
        fields[7] = ("items", "1,abc");
        let response = test_router()
            .oneshot(registration_request(&fields, Some(("photo.jpg", "fake-bytes"))))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_without_items_parameter_matches_nothing() {
        let app = test_router();
        app.clone()
            .oneshot(registration_request(&valid_fields(), Some(("photo.jpg", "x"))))
            .await
            .expect("router responds");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/points?uf=SP&city=S%C3%A3o%20Paulo")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await.as_array().expect("array body").is_empty());
    }

    #[test]
    fn registration_item_parsing_is_strict_but_collapses_duplicates() {
        assert_eq!(
            parse_registration_items("1, 3, 1").expect("valid list"),
            vec![ItemId(1), ItemId(3)]
        );
        assert!(parse_registration_items("1,abc").is_err());
        assert!(parse_registration_items("").expect("empty ok").is_empty());
    }
}
