use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::jobs::handler::submit_job,
    ),
    components(
        schemas(
            crate::modules::jobs::dto::SubmitJobRequest,
            crate::common::response::MessageResponse,
            crate::common::response::ErrorResponse,
        )
    ),
    tags(
        (name = "Jobs", description = "Video processing job intake")
    )
)]
pub struct ApiDoc;
