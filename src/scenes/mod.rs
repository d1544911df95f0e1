pub mod holo;
pub mod landing;
pub mod portal;
pub mod stellar;

pub use holo::HoloScene;
pub use landing::LandingScene;
pub use portal::PortalScene;
pub use stellar::StellarScene;
