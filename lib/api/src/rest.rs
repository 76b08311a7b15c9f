use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use webfilmz_core::{Error, MovieStore, UserId};
use webfilmz_similarity::{Ranker, SimilarityEngine};
use webfilmz_storage::StorageManager;

/// Shared state handed to every handler
pub struct AppState {
    pub storage: Arc<StorageManager>,
    pub engine: SimilarityEngine,
    pub ranker: Ranker,
    /// Directory holding `movies.dat` and `user_ratedmovies.dat`
    pub dataset_dir: PathBuf,
}

#[derive(Deserialize)]
struct RecommendationQuery {
    limit: Option<usize>,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: AppState, port: u16) -> std::io::Result<()> {
        let state = web::Data::new(state);
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(state.clone())
                .configure(configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Register every route; shared by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/movies", web::get().to(list_movies))
        .route("/recommendations/{user_id}", web::get().to(list_recommendations))
        .route("/tools/import-data", web::get().to(import_data))
        .route("/tools/build-comparison", web::get().to(build_comparison));
}

fn error_response(e: &Error) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        Error::DataShape { .. } | Error::Import { .. } | Error::InvalidConfig(_) => {
            HttpResponse::BadRequest().json(body)
        }
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn blocking_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": "Worker thread failed"
    }))
}

async fn index() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "name": "webfilmz",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

async fn list_movies(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let storage = state.storage.clone();
    match web::block(move || storage.store().fetch_all_movies()).await {
        Ok(Ok(movies)) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": movies
        }))),
        Ok(Err(e)) => Ok(error_response(&e)),
        Err(_) => Ok(blocking_error()),
    }
}

async fn list_recommendations(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
    query: web::Query<RecommendationQuery>,
) -> ActixResult<HttpResponse> {
    let user_id = path.into_inner();
    let limit = query.limit.unwrap_or(state.ranker.howmany());

    let storage = state.storage.clone();
    let ranker = state.ranker;
    let result = web::block(move || ranker.recommend_top(storage.store(), user_id, limit)).await;

    match result {
        Ok(Ok(rankings)) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": rankings
        }))),
        Ok(Err(e)) => {
            error!(user_id, error = %e, "Recommendation failed");
            Ok(error_response(&e))
        }
        Err(_) => Ok(blocking_error()),
    }
}

async fn import_data(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let storage = state.storage.clone();
    let dataset_dir = state.dataset_dir.clone();
    info!(dir = ?dataset_dir, "Import requested");

    match web::block(move || storage.import(&dataset_dir)).await {
        Ok(Ok(report)) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": report
        }))),
        Ok(Err(e)) => {
            error!(error = %e, "Import failed");
            Ok(error_response(&e))
        }
        Err(_) => Ok(blocking_error()),
    }
}

async fn build_comparison(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let storage = state.storage.clone();
    let engine = state.engine.clone();
    info!("Similarity run requested");

    match web::block(move || engine.run(storage.store())).await {
        Ok(Ok(report)) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": report
        }))),
        Ok(Err(e)) => {
            error!(error = %e, "Similarity run failed");
            Ok(error_response(&e))
        }
        Err(_) => Ok(blocking_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use webfilmz_core::{Movie, Rating, RatingStore};

    fn state_with(ratings: &[(u64, u64, f64)]) -> web::Data<AppState> {
        let storage = Arc::new(StorageManager::in_memory());
        for &(user, movie, value) in ratings {
            storage
                .store()
                .insert_rating(&Rating::new(user, movie, value).unwrap())
                .unwrap();
        }
        web::Data::new(AppState {
            storage,
            engine: SimilarityEngine::default(),
            ranker: Ranker::default(),
            dataset_dir: PathBuf::from("/nonexistent"),
        })
    }

    fn sample() -> Vec<(u64, u64, f64)> {
        vec![
            (1, 1, 5.0), (1, 2, 3.0), (1, 3, 4.5),
            (2, 1, 4.0), (2, 2, 4.0), (2, 3, 4.0),
            (3, 1, 2.0), (3, 2, 5.0), (3, 3, 2.5),
            (4, 1, 5.0),
        ]
    }

    #[actix_web::test]
    async fn test_index() {
        let app = test::init_service(App::new().app_data(state_with(&[])).configure(configure)).await;
        let resp: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp["name"], "webfilmz");
    }

    #[actix_web::test]
    async fn test_list_movies() {
        let state = state_with(&[]);
        state.storage.store().insert_movie(&Movie::new(1, "Toy story")).unwrap();
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/movies").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["result"][0]["title"], "Toy story");
    }

    #[actix_web::test]
    async fn test_build_then_recommend() {
        let app = test::init_service(App::new().app_data(state_with(&sample())).configure(configure)).await;

        let req = test::TestRequest::get().uri("/tools/build-comparison").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["result"]["ratings"], 10);
        assert_eq!(resp["result"]["failures"], 0);

        // User 4 only rated movie 1
        let req = test::TestRequest::get().uri("/recommendations/4").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let result = resp["result"].as_array().unwrap();
        assert!(!result.is_empty());
        assert!(result.iter().all(|entry| entry["movie_id"] != 1));
    }

    #[actix_web::test]
    async fn test_recommendation_limit() {
        let app = test::init_service(App::new().app_data(state_with(&sample())).configure(configure)).await;
        let req = test::TestRequest::get().uri("/tools/build-comparison").to_request();
        let _: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get().uri("/recommendations/4?limit=1").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["result"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_recommendations_without_similarities_are_empty() {
        let app = test::init_service(App::new().app_data(state_with(&sample())).configure(configure)).await;
        let req = test::TestRequest::get().uri("/recommendations/1").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["result"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn test_import_missing_dataset_is_server_error() {
        let app = test::init_service(App::new().app_data(state_with(&[])).configure(configure)).await;
        let req = test::TestRequest::get().uri("/tools/import-data").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
