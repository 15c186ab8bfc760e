use movies_core::MovieService;

use crate::antiforgery::Antiforgery;

#[derive(Clone)]
pub struct AppState {
    pub service: MovieService,
    pub antiforgery: Antiforgery,
}
