use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use faultline_core::FaultlineError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<FaultlineError>() {
            match e {
                FaultlineError::NotInitialized => StatusCode::BAD_REQUEST,
                FaultlineError::ScenarioNotFound(_) | FaultlineError::ArtifactNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                FaultlineError::MissingScenario
                | FaultlineError::UnknownService(_)
                | FaultlineError::InvalidKey(_) => StatusCode::BAD_REQUEST,
                FaultlineError::DanglingTarget { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                FaultlineError::AwsCliNotFound => StatusCode::SERVICE_UNAVAILABLE,
                FaultlineError::Deploy { .. } | FaultlineError::DeployTimeout { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                FaultlineError::Io(_) | FaultlineError::Yaml(_) | FaultlineError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_not_found_maps_to_404() {
        let err = AppError(FaultlineError::ScenarioNotFound("x".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn artifact_not_found_maps_to_404() {
        let err = AppError(FaultlineError::ArtifactNotFound("generated/cdk/x.ts".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn not_initialized_maps_to_400() {
        let err = AppError(FaultlineError::NotInitialized.into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn dangling_target_maps_to_422() {
        let err = AppError(
            FaultlineError::DanglingTarget {
                action: "stop-instances".into(),
                target: "ec2-instances".into(),
            }
            .into(),
        );
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn deploy_error_maps_to_502() {
        let err = AppError(
            FaultlineError::Deploy {
                code: "ValidationError".into(),
                message: "bad template".into(),
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        let err = AppError(FaultlineError::Io(io_err).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_core_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_body_is_json_error_object() {
        let err = AppError(FaultlineError::ScenarioNotFound("my-scenario".into()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
