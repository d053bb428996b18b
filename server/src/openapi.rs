use utoipa::OpenApi;

use crate::{routes, schema};

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::image::post_upload,
        routes::image::get_images,
        routes::image::get_image,
        routes::image::delete_image,
        routes::video::post_upload_video,
        routes::video::get_videos,
        routes::contact::post_contact,
    ),
    components(schemas(
        schema::UploadedImage,
        schema::Image,
        schema::ImageDetails,
        schema::DeletedImage,
        schema::UploadedVideo,
        schema::Video,
        schema::ContactRequest,
        schema::ContactResponse,
        schema::ErrorBody,
    )),
    tags((name = "folio"))
)]
pub struct ApiDoc;
