use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::proximity::check,
        api::place::list_places,
        api::place::get_place,
        api::place::check_place_proximity,
        api::post::create_post,
    ),
    tags(
        (name = "mandrivka", description = "Mandrivka travel journal API")
    )
)]
pub struct ApiDoc;
