use utoipa::OpenApi;
use video_browser_types::{HealthResponse, VideoFile};

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(api::list_videos, api::stream_video, api::health),
    components(schemas(VideoFile, HealthResponse)),
    tags(
        (name = "video-hub-server", description = "Video listing and streaming API")
    )
)]
pub struct ApiDoc;
